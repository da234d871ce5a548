//! Plain HTTP document fetch used by the fast path.
//!
//! Requests follow redirects, carry a browser user agent and pass the
//! caller's `Cookie` header through untouched.

mod user_agent;

#[cfg(test)]
pub(crate) mod fake;

pub use user_agent::{resolve_user_agent, DEFAULT_USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{redirect, Client};
use tracing::debug;

use crate::error::FetchError;

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Capability to fetch a document body over HTTP.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch `url`, returning the body text.
    ///
    /// Statuses >= 400 are reported as [`FetchError::Upstream`].
    async fn fetch(&self, url: &str, cookie_header: Option<&str>) -> Result<String, FetchError>;
}

/// reqwest-backed [`DocumentFetcher`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

/// Builder for constructing `HttpClient`.
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    /// Override the user agent. Blank falls back to [`DEFAULT_USER_AGENT`].
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Build the `HttpClient`.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let user_agent = resolve_user_agent(self.user_agent.as_deref());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpClient { client })
    }
}

impl HttpClient {
    /// Create a builder with the request timeout.
    pub fn builder(timeout: Duration) -> HttpClientBuilder {
        HttpClientBuilder {
            timeout,
            user_agent: None,
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpClient {
    async fn fetch(&self, url: &str, cookie_header: Option<&str>) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(cookies) = cookie_header.filter(|c| !c.trim().is_empty()) {
            request = request.header(COOKIE, cookies);
        }

        debug!("Fetching {}", url);
        let response = request.send().await?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Upstream {
                status,
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!("Fetched {} ({} bytes, status {})", final_url, body.len(), status);
        Ok(body)
    }
}
