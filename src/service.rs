//! Entry point tying resolution and collection to one configuration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserEngine, ChromiumEngine};
use crate::collector::{CollectionResult, ReelCollector};
use crate::config::Settings;
use crate::error::{ReelError, Result};
use crate::http_client::{DocumentFetcher, HttpClient};
use crate::resolver::{ResolutionResult, Resolver};

/// Resolves reels and lists an account's reels.
///
/// Calls are independent: each one opens and closes its own browser
/// session, and nothing is cached between them.
pub struct ReelService {
    resolver: Resolver,
    collector: ReelCollector,
    deadline: Option<Duration>,
}

impl ReelService {
    /// Build a service from explicit collaborators.
    pub fn new(
        settings: &Settings,
        fetcher: Arc<dyn DocumentFetcher>,
        engine: Arc<dyn BrowserEngine>,
    ) -> Self {
        Self {
            resolver: Resolver::standard(fetcher, Arc::clone(&engine), settings.render_options()),
            collector: ReelCollector::new(engine, settings.collector_options()),
            deadline: settings.invocation_timeout(),
        }
    }

    /// Build a service backed by reqwest and chromiumoxide.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = HttpClient::builder(settings.fetch_timeout())
            .user_agent(&settings.user_agent)
            .build()?;
        let engine = ChromiumEngine::new(settings.browser.clone());
        Ok(Self::new(settings, Arc::new(fetcher), Arc::new(engine)))
    }

    /// Override the per-invocation deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Resolve the direct media URL of a reel.
    pub async fn resolve(
        &self,
        reel_url: &str,
        cookie_header: Option<&str>,
    ) -> Result<ResolutionResult> {
        self.bounded(
            self.resolver.resolve(reel_url, cookie_header),
            ReelError::Resolution,
        )
        .await
    }

    /// List the reels published by `account`, at most `max` if set.
    pub async fn list_reels(
        &self,
        account: &str,
        max: Option<usize>,
        cookie_header: Option<&str>,
    ) -> Result<CollectionResult> {
        self.bounded(
            self.collector.collect(account, max, cookie_header),
            ReelError::Collection,
        )
        .await
    }

    /// Apply the invocation deadline. A timed-out future is dropped, which
    /// closes any browser session it still holds.
    async fn bounded<T, F>(&self, work: F, on_timeout: fn(String) -> ReelError) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, work).await.map_err(|_| {
                on_timeout(format!("deadline of {}ms exceeded", deadline.as_millis()))
            })?,
            None => work.await,
        }
    }
}
