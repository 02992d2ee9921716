pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use error::ShareError;
pub use state::AppState;
