//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/resolve", post(handlers::resolve))
        .route("/reels/:username", post(handlers::list_reels))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
