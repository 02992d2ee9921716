use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::catalog::Catalog;
use crate::services::ingest::IngestService;
use crate::services::storage::DiskStorage;

// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<DiskStorage>,
    pub catalog: Arc<Catalog>,
    pub ingest: Arc<IngestService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let storage = Arc::new(DiskStorage::new(config.storage.data_dir.clone()).await?);
        let catalog = Arc::new(Catalog::new());
        let ingest = Arc::new(IngestService::new(
            storage.clone(),
            catalog.clone(),
            config.upload.max_file_size,
        ));

        Ok(Self {
            config,
            storage,
            catalog,
            ingest,
        })
    }
}
