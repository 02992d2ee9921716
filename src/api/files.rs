use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ShareError;
use crate::models::{format_size, FileRecord};
use crate::state::AppState;

/// Wire shape of one catalog entry, exactly as the frontend expects it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
    pub size: String,
    pub raw_size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

impl From<&FileRecord> for FileResponse {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            size: format_size(record.raw_size),
            raw_size: record.raw_size,
            content_type: record.content_type.clone(),
            uploaded_at: record.uploaded_at,
            uploader: record.uploader.clone(),
        }
    }
}

pub async fn list_files(State(state): State<AppState>) -> Json<Vec<FileResponse>> {
    let records = state.catalog.list().await;
    Json(records.iter().map(FileResponse::from).collect())
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ShareError> {
    // Anything that is not a server-assigned id is simply unknown.
    let id = Uuid::parse_str(&id).map_err(|_| ShareError::NotFound)?;

    let record = state.catalog.resolve(id).await.ok_or(ShareError::NotFound)?;
    debug!("Download request for {} ({})", id, record.name);

    let file = match state.storage.get(&record.handle).await {
        Ok(file) => file,
        Err(ShareError::NotFound) => {
            // Blob vanished out from under the catalog; drop the stale entry.
            warn!(
                "blob for {} ({}) missing on disk, removing catalog entry",
                id, record.name
            );
            state.catalog.remove(id).await;
            return Err(ShareError::NotFound);
        }
        Err(err) => return Err(err),
    };

    let content_type = HeaderValue::from_str(&record.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", record.name))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(record.raw_size)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
