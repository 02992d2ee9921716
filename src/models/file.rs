use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::storage::StorageHandle;

/// One catalog entry describing a fully ingested file.
///
/// The `handle` is the storage-internal blob reference and never leaves the
/// process; everything else is what listings are rendered from.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub raw_size: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploader: Option<String>,
    pub handle: StorageHandle,
}

/// Metadata for a file whose bytes are already stored, awaiting registration.
/// The catalog assigns `id` and `uploaded_at` itself.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub name: String,
    pub raw_size: u64,
    pub content_type: String,
    pub uploader: Option<String>,
    pub handle: StorageHandle,
}

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable rendering of a byte count, e.g. "12.40 MB".
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_zero() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(13 * 1024 * 1024), "13.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_format_size_caps_at_largest_unit() {
        // Anything past TB stays expressed in TB
        let two_pb = 2 * 1024u64.pow(5);
        assert_eq!(format_size(two_pb), "2048.00 TB");
    }
}
