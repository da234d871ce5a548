//! Media URL resolution for a single reel.
//!
//! Resolution walks an ordered list of strategies, each producing a page
//! document. The first document carrying an `og:video` tag wins. Failures of
//! all but the last strategy are logged and skipped; the last failure, or a
//! final document without the tag, is reported as a resolution error.

mod fast_path;
mod rendered;

pub use fast_path::FastPathResolver;
pub use rendered::{RenderOptions, RenderedPageResolver};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::BrowserEngine;
use crate::error::{BrowserError, FetchError, ReelError, Result};
use crate::extract::{extract_og_video, suggest_filename};
use crate::http_client::DocumentFetcher;

/// Outcome of resolving one reel. `mp4_url` is always set on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub reel_url: String,
    pub mp4_url: Option<String>,
    pub filename: Option<String>,
    /// Not extracted; kept for the response shape.
    pub title: Option<String>,
}

impl ResolutionResult {
    fn new(reel_url: &str, mp4_url: String) -> Self {
        Self {
            reel_url: reel_url.to_string(),
            filename: suggest_filename(&mp4_url),
            mp4_url: Some(mp4_url),
            title: None,
        }
    }
}

/// Accept only absolute http(s) URLs. Returns the normalized URL.
pub fn validate_reel_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| ReelError::InvalidUrl(format!("{:?}: {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed.to_string()),
        _ => Err(ReelError::InvalidUrl(format!(
            "{:?}: must be an http(s) URL",
            raw
        ))),
    }
}

/// Why a strategy produced no document.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl StrategyError {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyError::Fetch(e) => e.kind(),
            StrategyError::Browser(_) => "navigation_error",
        }
    }
}

/// One way of obtaining the HTML of a reel page.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_html(
        &self,
        url: &str,
        cookie_header: Option<&str>,
    ) -> std::result::Result<String, StrategyError>;
}

/// Runs resolution strategies in order until one yields a media URL.
pub struct Resolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl Resolver {
    pub fn with_strategies(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Fast path first, rendered page as the fallback.
    pub fn standard(
        fetcher: Arc<dyn DocumentFetcher>,
        engine: Arc<dyn BrowserEngine>,
        render: RenderOptions,
    ) -> Self {
        Self::with_strategies(vec![
            Box::new(FastPathResolver::new(fetcher)),
            Box::new(RenderedPageResolver::new(engine, render)),
        ])
    }

    pub async fn resolve(
        &self,
        reel_url: &str,
        cookie_header: Option<&str>,
    ) -> Result<ResolutionResult> {
        let reel_url = validate_reel_url(reel_url)?;
        let reel_url = reel_url.as_str();
        let mut last_failure = String::from("no resolution strategies configured");

        for strategy in &self.strategies {
            match strategy.fetch_html(reel_url, cookie_header).await {
                Ok(html) => match extract_og_video(&html) {
                    Some(mp4_url) => {
                        info!("Resolved {} via {}", reel_url, strategy.name());
                        return Ok(ResolutionResult::new(reel_url, mp4_url));
                    }
                    None => {
                        debug!("No og:video in {} document for {}", strategy.name(), reel_url);
                        last_failure = "media URL not found".to_string();
                    }
                },
                Err(e) => {
                    warn!(
                        "{} failed for {} ({}): {}",
                        strategy.name(),
                        reel_url,
                        e.kind(),
                        e
                    );
                    last_failure = e.to_string();
                }
            }
        }

        Err(ReelError::Resolution(last_failure))
    }
}
