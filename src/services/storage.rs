use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ShareError;

/// Opaque reference to a stored blob. Only the catalog holds these; the
/// submitted filename never touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageHandle(String);

impl StorageHandle {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Disk-backed blob store rooted at a single directory.
///
/// Blobs are immutable once written: `put` stages everything into a
/// `<handle>.part` file and only renames it into place after a successful
/// flush and fsync, so a resolvable handle always refers to a complete blob.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, ShareError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, handle: &StorageHandle) -> PathBuf {
        self.root.join(handle.as_str())
    }

    /// Drain `stream` into a fresh blob and return its handle plus the exact
    /// byte count written. Any chunk or write error discards the partial file
    /// and propagates the error, leaving nothing retrievable behind.
    pub async fn put<S>(&self, stream: S) -> Result<(StorageHandle, u64), ShareError>
    where
        S: Stream<Item = Result<Bytes, ShareError>>,
    {
        let handle = StorageHandle::generate();
        let tmp_path = self.root.join(format!("{}.part", handle.as_str()));

        let mut file = fs::File::create(&tmp_path).await?;
        let mut written: u64 = 0;

        tokio::pin!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    self.discard_partial(&tmp_path).await;
                    return Err(err);
                }
            };
            if let Err(err) = file.write_all(&chunk).await {
                self.discard_partial(&tmp_path).await;
                return Err(err.into());
            }
            written += chunk.len() as u64;
        }

        // Durability before visibility: flush, fsync, then rename into place.
        if let Err(err) = async {
            file.flush().await?;
            file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        }
        .await
        {
            self.discard_partial(&tmp_path).await;
            return Err(err.into());
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, self.blob_path(&handle)).await {
            self.discard_partial(&tmp_path).await;
            return Err(err.into());
        }

        debug!("stored blob {} ({} bytes)", handle.as_str(), written);
        Ok((handle, written))
    }

    /// Open a blob for reading. Each call gets an independent cursor, so
    /// concurrent downloads of the same handle never interfere.
    pub async fn get(&self, handle: &StorageHandle) -> Result<fs::File, ShareError> {
        fs::File::open(self.blob_path(handle))
            .await
            .map_err(|e| Self::map_open_error(e, handle))
    }

    pub async fn size(&self, handle: &StorageHandle) -> Result<u64, ShareError> {
        let metadata = fs::metadata(self.blob_path(handle))
            .await
            .map_err(|e| Self::map_open_error(e, handle))?;
        Ok(metadata.len())
    }

    fn map_open_error(err: std::io::Error, handle: &StorageHandle) -> ShareError {
        if err.kind() == std::io::ErrorKind::NotFound {
            debug!("blob {} not found on disk", handle.as_str());
            ShareError::NotFound
        } else {
            err.into()
        }
    }

    async fn discard_partial(&self, tmp_path: &Path) {
        if let Err(err) = fs::remove_file(tmp_path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove partial upload {:?}: {}", tmp_path, err);
            }
        }
    }
}
