//! Configuration management for reelgrab.
//!
//! Settings come from built-in defaults, an optional TOML file, and then
//! environment overrides. The environment is only read here, at process
//! start; everything downstream receives explicit values.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::browser::BrowserEngineConfig;
use crate::collector::CollectorOptions;
use crate::http_client::DEFAULT_USER_AGENT;
use crate::resolver::RenderOptions;

/// Default fast-path fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Default page navigation timeout in seconds.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;
/// Default settle interval after rendering a reel page.
pub const DEFAULT_RENDER_SETTLE_MS: u64 = 1500;
/// Default settle interval after navigating or scrolling the reels grid.
pub const DEFAULT_COLLECT_SETTLE_MS: u64 = 1200;
/// Default number of consecutive idle rounds before collection stops.
pub const DEFAULT_IDLE_LIMIT: u32 = 15;

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// User agent sent by both the fast path and the browser.
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub navigation_timeout_secs: u64,
    pub render_settle_ms: u64,
    pub collect_settle_ms: u64,
    /// Consecutive scroll rounds without new reels before giving up.
    pub idle_limit: u32,
    /// Optional deadline for a whole resolve or collect invocation.
    pub invocation_timeout_secs: Option<u64>,
    pub browser: BrowserEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            render_settle_ms: DEFAULT_RENDER_SETTLE_MS,
            collect_settle_ms: DEFAULT_COLLECT_SETTLE_MS,
            idle_limit: DEFAULT_IDLE_LIMIT,
            invocation_timeout_secs: None,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_env_overrides())
    }

    /// Parse settings from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    ///
    /// - `IG_UA` - user agent string
    /// - `REELGRAB_BROWSER_URL`, `REELGRAB_CHROME` - see [`BrowserEngineConfig`]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ua) = lookup("IG_UA").filter(|v| !v.trim().is_empty()) {
            self.user_agent = ua;
        }
        self.browser = self.browser.apply_overrides(&lookup);
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_secs.map(Duration::from_secs)
    }

    /// Options for the rendered-page resolver.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            user_agent: self.user_agent.clone(),
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            settle: Duration::from_millis(self.render_settle_ms),
        }
    }

    /// Options for the reel collector.
    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            user_agent: self.user_agent.clone(),
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            settle: Duration::from_millis(self.collect_settle_ms),
            idle_limit: self.idle_limit,
        }
    }
}
