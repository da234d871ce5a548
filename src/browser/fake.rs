//! Scripted in-memory browser for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserEngine, BrowserSession, SessionOptions};
use crate::error::BrowserError;

/// Counters shared between a [`FakeEngine`] and the sessions it opens.
#[derive(Default)]
pub(crate) struct FakeStats {
    launches: AtomicUsize,
    closes: AtomicUsize,
    navigations: AtomicUsize,
    queries: AtomicUsize,
    scrolls: AtomicUsize,
    waits: Mutex<Vec<Duration>>,
    options: Mutex<Vec<SessionOptions>>,
    visited: Mutex<Vec<String>>,
}

impl FakeStats {
    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }

    pub(crate) fn options(&self) -> Vec<SessionOptions> {
        self.options.lock().unwrap().clone()
    }

    pub(crate) fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[derive(Default, Clone)]
struct Script {
    fail_launch: bool,
    fail_navigate: bool,
    navigate_delay: Option<Duration>,
    html: String,
    /// Links visible on the page at each harvest round; the last entry
    /// repeats once the list is exhausted.
    rounds: Vec<Vec<String>>,
    fail_query_at: Option<usize>,
    fail_scroll: bool,
}

/// Browser engine whose pages follow a fixed script.
#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    script: Script,
    stats: Arc<FakeStats>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_html(mut self, html: &str) -> Self {
        self.script.html = html.to_string();
        self
    }

    pub(crate) fn with_rounds(mut self, rounds: Vec<Vec<String>>) -> Self {
        self.script.rounds = rounds;
        self
    }

    pub(crate) fn failing_launch(mut self) -> Self {
        self.script.fail_launch = true;
        self
    }

    pub(crate) fn failing_navigation(mut self) -> Self {
        self.script.fail_navigate = true;
        self
    }

    pub(crate) fn failing_query_at(mut self, round: usize) -> Self {
        self.script.fail_query_at = Some(round);
        self
    }

    pub(crate) fn failing_scroll(mut self) -> Self {
        self.script.fail_scroll = true;
        self
    }

    pub(crate) fn with_navigate_delay(mut self, delay: Duration) -> Self {
        self.script.navigate_delay = Some(delay);
        self
    }

    pub(crate) fn stats(&self) -> Arc<FakeStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.script.fail_launch {
            return Err(BrowserError::Launch("no chrome in test".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        self.stats.options.lock().unwrap().push(options.clone());
        Ok(Box::new(FakeSession {
            script: self.script.clone(),
            stats: Arc::clone(&self.stats),
            round: 0,
        }))
    }
}

struct FakeSession {
    script: Script,
    stats: Arc<FakeStats>,
    round: usize,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.stats.navigations.fetch_add(1, Ordering::SeqCst);
        self.stats.visited.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.script.navigate_delay {
            tokio::time::sleep(delay).await;
        }
        if self.script.fail_navigate {
            return Err(BrowserError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        self.stats.waits.lock().unwrap().push(duration);
    }

    async fn query_links(&mut self, _selector: &str) -> Result<Vec<String>, BrowserError> {
        let round = self.round;
        self.round += 1;
        self.stats.queries.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_query_at == Some(round) {
            return Err(BrowserError::Script("page crashed".to_string()));
        }
        let links = self
            .script
            .rounds
            .get(round)
            .or_else(|| self.script.rounds.last())
            .cloned()
            .unwrap_or_default();
        Ok(links)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.stats.scrolls.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_scroll {
            return Err(BrowserError::Script("scroll failed".to_string()));
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        Ok(self.script.html.clone())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Yield until background closes have been observed (or give up).
pub(crate) async fn settle_closes(stats: &FakeStats, expected: usize) {
    for _ in 0..50 {
        if stats.closes() >= expected {
            return;
        }
        tokio::task::yield_now().await;
    }
}
