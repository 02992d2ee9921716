use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Crate-wide error type covering every failure a request can hit.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("File not found")]
    NotFound,
    #[error("file exceeds the maximum allowed size ({limit} bytes)")]
    TooLarge { limit: u64 },
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ShareError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ShareError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ShareError::Io(err) => {
                tracing::error!("request failed with I/O error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ShareError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        // The frontend parses this exact shape; keep it to the single field.
        let body = Json(json!({ "error": error_message }));

        (status, body).into_response()
    }
}
