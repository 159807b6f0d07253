//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/session` - Session lifecycle, credential, and state view
//! - `/api/session/{id}/files` - CSV upload handling
//! - `/api/session/{id}/ask` - Question submission (invokes the agent)
//! - `/api/health` - Health checks
//! - `/` - Embedded single-page UI

pub mod ask;
pub mod files;
pub mod health;
pub mod session;
pub mod ui;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .merge(session::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(ask::router(state))
        .merge(health::router());

    Router::new()
        .merge(api_router)
        .merge(ui::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
