// csv-chat - Ask natural-language questions about uploaded CSV tables

pub mod agent;
pub mod config;
pub mod models;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod table;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
// Note: Import specific items from types module instead of glob to avoid name conflicts
// e.g., use csv_chat::types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
