use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::info;

use crate::error::ShareError;
use crate::models::{format_size, FileRecord, NewFileRecord};
use crate::services::catalog::Catalog;
use crate::services::storage::DiskStorage;

/// Turns one incoming named byte stream into a committed catalog entry.
///
/// Each file in a multi-file upload goes through its own `ingest_file` call,
/// so a failed transfer never disturbs siblings that already landed.
pub struct IngestService {
    storage: Arc<DiskStorage>,
    catalog: Arc<Catalog>,
    max_file_size: u64,
}

impl IngestService {
    pub fn new(storage: Arc<DiskStorage>, catalog: Arc<Catalog>, max_file_size: u64) -> Self {
        Self {
            storage,
            catalog,
            max_file_size,
        }
    }

    /// Stream one file into storage and register it on success.
    ///
    /// The stream is capped at `max_file_size`; crossing the ceiling aborts
    /// the transfer mid-stream and the partial blob is discarded by storage.
    /// Registration is an in-memory insert ordered strictly after the bytes
    /// are durable, so the file becomes listable only once fully stored.
    pub async fn ingest_file<S>(
        &self,
        name: &str,
        content_type: Option<&str>,
        uploader: Option<String>,
        stream: S,
    ) -> Result<FileRecord, ShareError>
    where
        S: Stream<Item = Result<Bytes, ShareError>>,
    {
        let safe_name = sanitize_name(name);

        let limit = self.max_file_size;
        let mut received: u64 = 0;
        let capped = stream.map(move |chunk| {
            let chunk = chunk?;
            received += chunk.len() as u64;
            if received > limit {
                return Err(ShareError::TooLarge { limit });
            }
            Ok(chunk)
        });

        let (handle, raw_size) = self.storage.put(capped).await?;

        let content_type = match content_type {
            Some(declared) if !declared.is_empty() => declared.to_string(),
            _ => mime_guess::from_path(&safe_name)
                .first_or_octet_stream()
                .to_string(),
        };

        let record = self
            .catalog
            .register(NewFileRecord {
                name: safe_name,
                raw_size,
                content_type,
                uploader,
                handle,
            })
            .await;

        info!(
            "File uploaded: {} ({}), from: {}",
            record.name,
            format_size(record.raw_size),
            record.uploader.as_deref().unwrap_or("unknown")
        );

        Ok(record)
    }
}

fn sanitize_name(name: &str) -> String {
    let safe = sanitize_filename::sanitize(name);
    if safe.is_empty() {
        "file".to_string()
    } else {
        safe
    }
}
