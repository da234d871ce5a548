//! HTTP API over the reel service.
//!
//! - `GET /` health check
//! - `POST /resolve` resolve a reel's direct media URL
//! - `POST /reels/:username` list an account's reels

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::service::ReelService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReelService>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(ReelService::from_settings(settings)?),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
