//! Reel collection from an account's reels grid.
//!
//! The grid loads lazily as the page scrolls and gives no end-of-list
//! signal, so the collector scrolls until either the requested number of
//! reels has been seen or a run of consecutive rounds turns up nothing new.

mod harvest;

pub use harvest::{
    canonicalize_account, canonicalize_link, harvest_new_links, listing_url, StopReason,
    TerminationPolicy, REEL_PATH_MARKER,
};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::{BrowserEngine, ScopedSession, SessionOptions};
use crate::config::{
    DEFAULT_COLLECT_SETTLE_MS, DEFAULT_IDLE_LIMIT, DEFAULT_NAVIGATION_TIMEOUT_SECS,
};
use crate::cookies::parse_cookie_header;
use crate::error::{BrowserError, ReelError, Result};
use crate::http_client::DEFAULT_USER_AGENT;

/// Anchors pointing at individual reels.
pub const REEL_LINK_SELECTOR: &str = "a[href*='/reel/']";

/// Reels found for one account, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionResult {
    #[serde(rename = "username")]
    pub account: String,
    pub count: usize,
    pub reels: Vec<String>,
}

impl CollectionResult {
    fn from_seen(account: String, seen: BTreeSet<String>) -> Self {
        let reels: Vec<String> = seen.into_iter().collect();
        Self {
            account,
            count: reels.len(),
            reels,
        }
    }
}

/// Timing and termination settings for the collector.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    /// Wait after navigation and after every scroll.
    pub settle: Duration,
    pub idle_limit: u32,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            settle: Duration::from_millis(DEFAULT_COLLECT_SETTLE_MS),
            idle_limit: DEFAULT_IDLE_LIMIT,
        }
    }
}

/// Scrolls an account's reels grid and gathers reel links.
pub struct ReelCollector {
    engine: Arc<dyn BrowserEngine>,
    options: CollectorOptions,
}

impl ReelCollector {
    pub fn new(engine: Arc<dyn BrowserEngine>, options: CollectorOptions) -> Self {
        Self { engine, options }
    }

    /// Collect reel links for `account`, at most `max` of them if set.
    ///
    /// Every call uses a fresh browser session and a fresh dedup set.
    pub async fn collect(
        &self,
        account: &str,
        max: Option<usize>,
        cookie_header: Option<&str>,
    ) -> Result<CollectionResult> {
        let account = canonicalize_account(account).ok_or_else(|| {
            ReelError::Collection(format!("invalid account identifier: {:?}", account))
        })?;
        let url = listing_url(&account);
        let policy = TerminationPolicy::new(max, self.options.idle_limit);

        let session_options = SessionOptions {
            user_agent: self.options.user_agent.clone(),
            cookies: parse_cookie_header(cookie_header),
        };

        let mut session = ScopedSession::open(self.engine.as_ref(), &session_options)
            .await
            .map_err(collection_error)?;
        let outcome = self.scroll_and_harvest(&mut session, &url, &policy).await;
        session.close().await;

        let (seen, reason, rounds) = outcome.map_err(collection_error)?;
        info!(
            "Collected {} reels for {} in {} rounds ({:?})",
            seen.len(),
            account,
            rounds,
            reason
        );
        Ok(CollectionResult::from_seen(account, seen))
    }

    /// The scroll-and-harvest loop. Session cleanup is handled by the caller.
    async fn scroll_and_harvest(
        &self,
        session: &mut ScopedSession,
        url: &str,
        policy: &TerminationPolicy,
    ) -> std::result::Result<(BTreeSet<String>, StopReason, usize), BrowserError> {
        session.navigate(url, self.options.navigation_timeout).await?;
        session.wait(self.options.settle).await?;

        let mut seen = BTreeSet::new();
        let mut idle_rounds = 0u32;
        let mut rounds = 0usize;

        let reason = loop {
            rounds += 1;
            let links = session.query_links(REEL_LINK_SELECTOR).await?;
            let new = harvest_new_links(&mut seen, &links, policy.max());
            debug!(
                "Round {}: {} links on page, {} new, {} total",
                rounds,
                links.len(),
                new,
                seen.len()
            );

            idle_rounds = if new == 0 { idle_rounds + 1 } else { 0 };
            if let Some(reason) = policy.decide(seen.len(), idle_rounds) {
                break reason;
            }

            session.scroll_to_bottom().await?;
            session.wait(self.options.settle).await?;
        };

        Ok((seen, reason, rounds))
    }
}

fn collection_error(e: BrowserError) -> ReelError {
    ReelError::Collection(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeEngine;

    fn reel(id: &str) -> String {
        format!("https://www.instagram.com/reel/{}", id)
    }

    fn batch(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| reel(id)).collect()
    }

    fn collector(engine: &FakeEngine) -> ReelCollector {
        ReelCollector::new(
            Arc::new(engine.clone()),
            CollectorOptions {
                settle: Duration::from_millis(1200),
                ..CollectorOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn test_collect_sorted_and_deduplicated() {
        let engine = FakeEngine::new().with_rounds(vec![
            batch(&["c", "a"]),
            batch(&["c", "a", "b/", "a/"]),
            batch(&["c", "a", "b", "d"]),
        ]);

        let result = collector(&engine)
            .collect("@someone", None, None)
            .await
            .unwrap();

        assert_eq!(result.account, "someone");
        assert_eq!(result.count, 4);
        assert_eq!(
            result.reels,
            vec![
                "https://www.instagram.com/reel/a/",
                "https://www.instagram.com/reel/b/",
                "https://www.instagram.com/reel/c/",
                "https://www.instagram.com/reel/d/",
            ]
        );

        let stats = engine.stats();
        assert_eq!(
            stats.visited(),
            vec!["https://www.instagram.com/someone/reels/"]
        );
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn test_idle_termination() {
        let engine = FakeEngine::new().with_rounds(vec![batch(&["a", "b"])]);

        let result = collector(&engine)
            .collect("someone", Some(100), None)
            .await
            .unwrap();

        assert_eq!(result.count, 2);
        let stats = engine.stats();
        // One productive round followed by 15 idle ones
        assert_eq!(stats.queries(), 16);
        assert_eq!(stats.scrolls(), 15);
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn test_idle_termination_on_empty_page() {
        let engine = FakeEngine::new();

        let result = collector(&engine).collect("someone", None, None).await.unwrap();

        assert_eq!(result.count, 0);
        assert!(result.reels.is_empty());
        assert_eq!(engine.stats().queries(), 15);
        assert_eq!(engine.stats().scrolls(), 14);
    }

    #[tokio::test]
    async fn test_idle_counter_resets_on_new_links() {
        let mut rounds = vec![batch(&["a"]); 10];
        rounds.push(batch(&["a", "b"]));
        let engine = FakeEngine::new().with_rounds(rounds);

        let result = collector(&engine).collect("someone", None, None).await.unwrap();

        assert_eq!(result.count, 2);
        // Round 1 new, rounds 2-10 idle, round 11 new, then 15 idle rounds
        assert_eq!(engine.stats().queries(), 26);
    }

    #[tokio::test]
    async fn test_cap_termination_without_further_scrolling() {
        let engine = FakeEngine::new().with_rounds(vec![
            batch(&["1", "2", "3"]),
            batch(&["1", "2", "3", "4", "5", "6", "7"]),
            batch(&["8", "9"]),
        ]);

        let result = collector(&engine)
            .collect("someone", Some(5), None)
            .await
            .unwrap();

        assert_eq!(result.count, 5);
        assert_eq!(result.reels.len(), 5);
        assert!(!result.reels.contains(&format!("{}/", reel("6"))));
        let stats = engine.stats();
        assert_eq!(stats.queries(), 2);
        assert_eq!(stats.scrolls(), 1);
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn test_settle_waits() {
        let engine = FakeEngine::new().with_rounds(vec![batch(&["1", "2"])]);

        collector(&engine)
            .collect("someone", Some(2), None)
            .await
            .unwrap();

        // Only the post-navigation wait; the cap stops the loop before any scroll
        assert_eq!(engine.stats().waits(), vec![Duration::from_millis(1200)]);
    }

    #[tokio::test]
    async fn test_cookies_and_user_agent_installed() {
        let engine = FakeEngine::new();
        let collector = ReelCollector::new(
            Arc::new(engine.clone()),
            CollectorOptions {
                user_agent: "TestAgent/1.0".to_string(),
                idle_limit: 1,
                ..CollectorOptions::default()
            },
        );

        collector
            .collect("someone", None, Some("sessionid=abc; junk; csrftoken=x=y"))
            .await
            .unwrap();

        let options = engine.stats().options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].user_agent, "TestAgent/1.0");
        let names: Vec<_> = options[0].cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sessionid", "csrftoken"]);
        assert_eq!(options[0].cookies[1].value, "x=y");
    }

    #[tokio::test]
    async fn test_navigation_failure_closes_session() {
        let engine = FakeEngine::new().failing_navigation();

        let err = collector(&engine)
            .collect("someone", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "collection_error");
        assert!(err.to_string().contains("timed out"));
        assert_eq!(engine.stats().launches(), 1);
        assert_eq!(engine.stats().closes(), 1);
    }

    #[tokio::test]
    async fn test_query_failure_closes_session() {
        let engine = FakeEngine::new()
            .with_rounds(vec![batch(&["a"]), batch(&["a", "b"])])
            .failing_query_at(1);

        let err = collector(&engine)
            .collect("someone", None, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("page crashed"));
        assert_eq!(engine.stats().closes(), 1);
    }

    #[tokio::test]
    async fn test_scroll_failure_closes_session() {
        let engine = FakeEngine::new()
            .with_rounds(vec![batch(&["a"])])
            .failing_scroll();

        let err = collector(&engine)
            .collect("someone", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "collection_error");
        assert_eq!(engine.stats().scrolls(), 1);
        assert_eq!(engine.stats().closes(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_collection_error() {
        let engine = FakeEngine::new().failing_launch();

        let err = collector(&engine)
            .collect("someone", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "collection_error");
        assert_eq!(engine.stats().closes(), 0);
    }

    #[tokio::test]
    async fn test_invalid_account_never_launches() {
        let engine = FakeEngine::new();

        let err = collector(&engine).collect(" @ ", None, None).await.unwrap_err();

        assert_eq!(err.kind(), "collection_error");
        assert_eq!(engine.stats().launches(), 0);
    }

    #[test]
    fn test_collection_result_wire_shape() {
        let result = CollectionResult::from_seen(
            "someone".to_string(),
            [reel("b/"), reel("a/")].into_iter().collect(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["username"], "someone");
        assert_eq!(json["count"], 2);
        assert_eq!(json["reels"][0], "https://www.instagram.com/reel/a/");
    }
}
