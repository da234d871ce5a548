//! Fast path: plain document fetch, no script execution.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ResolutionStrategy, StrategyError};
use crate::error::FetchError;
use crate::http_client::DocumentFetcher;

/// Fetches the reel page as served, relying on the server-side meta tags.
pub struct FastPathResolver {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl FastPathResolver {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the raw page body.
    pub async fn fetch(&self, url: &str, cookie_header: Option<&str>) -> Result<String, FetchError> {
        self.fetcher.fetch(url, cookie_header).await
    }
}

#[async_trait]
impl ResolutionStrategy for FastPathResolver {
    fn name(&self) -> &'static str {
        "fast_path"
    }

    async fn fetch_html(
        &self,
        url: &str,
        cookie_header: Option<&str>,
    ) -> Result<String, StrategyError> {
        Ok(self.fetch(url, cookie_header).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::fake::FakeFetcher;

    #[tokio::test]
    async fn test_passes_cookie_header_through() {
        let fetcher = FakeFetcher::body("<html></html>");
        let resolver = FastPathResolver::new(Arc::new(fetcher.clone()));

        let html = resolver
            .fetch_html("https://www.instagram.com/reel/abc/", Some("a=1; b=2=x"))
            .await
            .unwrap();

        assert_eq!(html, "<html></html>");
        assert_eq!(fetcher.cookies(), vec![Some("a=1; b=2=x".to_string())]);
    }

    #[tokio::test]
    async fn test_upstream_status_is_tagged() {
        let resolver = FastPathResolver::new(Arc::new(FakeFetcher::status(429)));
        let err = resolver
            .fetch_html("https://www.instagram.com/reel/abc/", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
    }
}
