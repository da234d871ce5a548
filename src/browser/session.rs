//! Scoped ownership of a browser session.

use std::time::Duration;

use tracing::{debug, warn};

use super::{BrowserEngine, BrowserSession, SessionOptions};
use crate::error::BrowserError;

/// A browser session that is closed exactly once.
///
/// Callers close it explicitly with [`ScopedSession::close`] on every normal
/// and error path. If the owning future is dropped instead (deadline or the
/// caller walking away), `Drop` hands the session to the Tokio runtime to be
/// closed there.
pub struct ScopedSession {
    inner: Option<Box<dyn BrowserSession>>,
}

impl ScopedSession {
    /// Open a new session on `engine`.
    pub async fn open(
        engine: &dyn BrowserEngine,
        options: &SessionOptions,
    ) -> Result<Self, BrowserError> {
        let inner = engine.open_session(options).await?;
        Ok(Self { inner: Some(inner) })
    }

    fn live(&mut self) -> Result<&mut Box<dyn BrowserSession>, BrowserError> {
        self.inner.as_mut().ok_or(BrowserError::Closed)
    }

    pub async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.live()?.navigate(url, timeout).await
    }

    pub async fn wait(&mut self, duration: Duration) -> Result<(), BrowserError> {
        self.live()?.wait(duration).await;
        Ok(())
    }

    pub async fn query_links(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        self.live()?.query_links(selector).await
    }

    pub async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.live()?.scroll_to_bottom().await
    }

    pub async fn content(&mut self) -> Result<String, BrowserError> {
        self.live()?.content().await
    }

    /// Close the session. Close failures are logged, not returned, so they
    /// never mask the outcome of the work done with the session.
    pub async fn close(mut self) {
        if let Some(mut session) = self.inner.take() {
            match session.close().await {
                Ok(()) => debug!("Browser session closed"),
                Err(e) => warn!("Failed to close browser session: {}", e),
            }
        }
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        let Some(mut session) = self.inner.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Browser session dropped while open, closing in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Failed to close abandoned browser session: {}", e);
                    }
                });
            }
            Err(_) => warn!("Browser session dropped outside a runtime; it could not be closed"),
        }
    }
}
