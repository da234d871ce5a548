//! Rendered path: load the page in a headless browser and read the DOM
//! after client-side scripts have had time to run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ResolutionStrategy, StrategyError};
use crate::browser::{BrowserEngine, ScopedSession, SessionOptions};
use crate::config::{DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_RENDER_SETTLE_MS};
use crate::cookies::parse_cookie_header;
use crate::error::BrowserError;
use crate::http_client::DEFAULT_USER_AGENT;

/// Settings for rendering a reel page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    /// Wait after DOM-content-loaded for meta tags to be filled in.
    pub settle: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            settle: Duration::from_millis(DEFAULT_RENDER_SETTLE_MS),
        }
    }
}

pub struct RenderedPageResolver {
    engine: Arc<dyn BrowserEngine>,
    options: RenderOptions,
}

impl RenderedPageResolver {
    pub fn new(engine: Arc<dyn BrowserEngine>, options: RenderOptions) -> Self {
        Self { engine, options }
    }

    /// Render `url` in a fresh session and return the resulting HTML.
    ///
    /// The session is closed before returning, whatever the outcome.
    pub async fn render(
        &self,
        url: &str,
        cookie_header: Option<&str>,
    ) -> Result<String, BrowserError> {
        let session_options = SessionOptions {
            user_agent: self.options.user_agent.clone(),
            cookies: parse_cookie_header(cookie_header),
        };

        let mut session = ScopedSession::open(self.engine.as_ref(), &session_options).await?;
        let result = self.render_inner(&mut session, url).await;
        session.close().await;
        result
    }

    async fn render_inner(
        &self,
        session: &mut ScopedSession,
        url: &str,
    ) -> Result<String, BrowserError> {
        session.navigate(url, self.options.navigation_timeout).await?;
        session.wait(self.options.settle).await?;
        let html = session.content().await?;
        debug!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }
}

#[async_trait]
impl ResolutionStrategy for RenderedPageResolver {
    fn name(&self) -> &'static str {
        "rendered"
    }

    async fn fetch_html(
        &self,
        url: &str,
        cookie_header: Option<&str>,
    ) -> Result<String, StrategyError> {
        Ok(self.render(url, cookie_header).await?)
    }
}
