use anyhow::Result;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use lanshare_rs::{api, AppConfig, AppState};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanshare_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::new()?;
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting LANShare backend server on {}", bind_address);

    // Initialize shared state (storage directory, catalog, ingestion pipeline)
    let state = match AppState::new(config).await {
        Ok(state) => {
            info!("Serving files from {:?}", state.storage.root());
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Build application router
    let app = create_app(state).await?;

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);

    // Start server; connect info supplies the uploader's peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn create_app(state: AppState) -> Result<Router> {
    let max_body_size = state.config.upload.max_file_size as usize;

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api", api::create_router().await?)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn root_handler() -> &'static str {
    "LANShare: local network file sharing"
}
