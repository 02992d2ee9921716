use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        ConnectInfo, FromRequestParts, State,
    },
    http::request::Parts,
    response::Json,
};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::warn;

use crate::api::files::FileResponse;
use crate::error::ShareError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<FileResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedFile>,
}

#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub error: String,
}

/// Peer address of the uploading client, when the transport provides one.
pub struct Uploader(Option<String>);

impl<S> FromRequestParts<S> for Uploader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uploader = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(Uploader(uploader))
    }
}

/// Accept a multipart batch of files (parts named `files`), ingesting each one
/// independently. One bad file never blocks its siblings; the response reports
/// both outcomes. Only an empty or fully failed batch is an error.
pub async fn upload_files(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ShareError> {
    let mut multipart = multipart
        .map_err(|err| ShareError::BadRequest(format!("expected multipart form data: {}", err)))?;

    let mut accepted: Vec<FileResponse> = Vec::new();
    let mut rejected: Vec<RejectedFile> = Vec::new();
    let mut saw_file_part = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ShareError::BadRequest(format!("invalid multipart request: {}", err)))?
    {
        if field.name() != Some("files") {
            continue;
        }
        saw_file_part = true;

        let file_name = match field.file_name().map(str::to_owned).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                rejected.push(RejectedFile {
                    name: "(unnamed)".to_string(),
                    error: "no filename provided".to_string(),
                });
                continue;
            }
        };
        let content_type = field.content_type().map(str::to_owned);

        let stream = futures::stream::try_unfold(field, |mut field| async move {
            let chunk = field.chunk().await.map_err(|err| {
                ShareError::BadRequest(format!("error reading upload stream: {}", err))
            })?;
            Ok(chunk.map(|bytes| (bytes, field)))
        });

        match state
            .ingest
            .ingest_file(&file_name, content_type.as_deref(), uploader.clone(), stream)
            .await
        {
            Ok(record) => accepted.push(FileResponse::from(&record)),
            Err(err) => {
                warn!("upload of {} rejected: {}", file_name, err);
                rejected.push(RejectedFile {
                    name: file_name,
                    error: err.to_string(),
                });
            }
        }
    }

    if !saw_file_part {
        return Err(ShareError::BadRequest("No file part in the request".to_string()));
    }
    if accepted.is_empty() {
        let detail = rejected
            .iter()
            .map(|r| format!("{}: {}", r.name, r.error))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ShareError::BadRequest(format!(
            "No files were uploaded ({})",
            detail
        )));
    }

    Ok(Json(UploadResponse {
        message: format!("{} file(s) uploaded successfully", accepted.len()),
        files: accepted,
        rejected,
    }))
}
