use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{FileRecord, NewFileRecord};

/// In-memory registry of shared files, the single source of truth for
/// listings. Empty at startup, discarded at process exit.
///
/// Locks are held only for the map access itself, never across I/O.
pub struct Catalog {
    files: RwLock<HashMap<Uuid, FileRecord>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Commit a stored file into the catalog. The id and upload timestamp are
    /// assigned here, under the write lock, so concurrent registrations can
    /// neither collide nor observe each other half-written.
    pub async fn register(&self, new_file: NewFileRecord) -> FileRecord {
        let record = FileRecord {
            id: Uuid::new_v4(),
            name: new_file.name,
            raw_size: new_file.raw_size,
            content_type: new_file.content_type,
            uploaded_at: Utc::now(),
            uploader: new_file.uploader,
            handle: new_file.handle,
        };

        let mut files = self.files.write().await;
        files.insert(record.id, record.clone());
        record
    }

    /// Point-in-time snapshot of every registered file, newest first.
    pub async fn list(&self) -> Vec<FileRecord> {
        let files = self.files.read().await;
        let mut snapshot: Vec<FileRecord> = files.values().cloned().collect();
        snapshot.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        snapshot
    }

    pub async fn resolve(&self, id: Uuid) -> Option<FileRecord> {
        let files = self.files.read().await;
        files.get(&id).cloned()
    }

    /// Drop an entry whose blob has gone missing so listings never advertise
    /// a download that cannot succeed.
    pub async fn remove(&self, id: Uuid) -> Option<FileRecord> {
        let mut files = self.files.write().await;
        files.remove(&id)
    }
}
