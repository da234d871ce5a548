//! Error types for fetching, browser automation and the public operations.

use thiserror::Error;

/// Failure of the plain document fetch.
///
/// Both variants are absorbed by the resolver and only trigger the
/// rendered-page fallback.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream status={status} for {url}")]
    Upstream { status: u16, url: String },
}

impl FetchError {
    /// Machine-readable kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport_error",
            FetchError::Upstream { .. } => "upstream_error",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Failure of the browser engine while loading or driving a page.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("navigation timed out after {secs}s for {url}")]
    Timeout { url: String, secs: u64 },
    #[error("page script failed: {0}")]
    Script(String),
    #[error("browser session already closed")]
    Closed,
}

/// Errors surfaced to callers of [`crate::ReelService`].
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("could not resolve mp4_url from reel page: {0}")]
    Resolution(String),
    #[error("failed to collect reels: {0}")]
    Collection(String),
    #[error("invalid reel URL: {0}")]
    InvalidUrl(String),
}

impl ReelError {
    /// Stable, machine-distinguishable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ReelError::Resolution(_) => "resolution_error",
            ReelError::Collection(_) => "collection_error",
            ReelError::InvalidUrl(_) => "validation_error",
        }
    }
}

pub type Result<T, E = ReelError> = std::result::Result<T, E>;
