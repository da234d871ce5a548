//! Headless browser capability used by the rendered-page resolver and the
//! reel collector.
//!
//! The engine is reached through two traits so that the resolution and
//! collection logic can run against chromiumoxide in production and a
//! scripted page in tests. Each call opens its own session and owns it
//! exclusively until it is closed.

mod config;
mod session;

#[cfg(feature = "browser")]
mod chromium;
#[cfg(not(feature = "browser"))]
mod disabled;
#[cfg(test)]
pub(crate) mod fake;

pub use config::{default_headless, BrowserEngineConfig};
pub use session::ScopedSession;

#[cfg(feature = "browser")]
pub use chromium::ChromiumEngine;
#[cfg(not(feature = "browser"))]
pub use disabled::ChromiumEngine;

use std::time::Duration;

use async_trait::async_trait;

use crate::cookies::CookieRecord;
use crate::error::BrowserError;

/// Per-session settings applied before the first navigation.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub user_agent: String,
    pub cookies: Vec<CookieRecord>,
}

/// Launches isolated browser sessions.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launch (or connect to) a browser and open a fresh page with the
    /// user agent and cookies from `options` installed.
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// One open page plus whatever browser resources back it.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate and wait until the DOM content has loaded.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Let client-side scripts run for `duration`.
    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Resolved `href` of every anchor matching `selector`.
    async fn query_links(&mut self, selector: &str) -> Result<Vec<String>, BrowserError>;

    /// Scroll to the current document height.
    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, BrowserError>;

    /// Release the page and the browser behind it.
    async fn close(&mut self) -> Result<(), BrowserError>;
}
