pub mod files;
pub mod upload;

use anyhow::Result;
use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::state::AppState;

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/hello", get(hello_handler))
        .route("/files", get(files::list_files))
        .route("/upload", post(upload::upload_files))
        .route("/download/{id}", get(files::download_file));

    Ok(router)
}

async fn hello_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello from LANShare Backend!" }))
}
