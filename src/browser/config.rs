//! Browser engine configuration types.
//!
//! These types live outside `#[cfg(feature = "browser")]` so that config
//! parsing works without the browser feature.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable. Auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_path: None,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    /// Apply overrides from a variable lookup.
    ///
    /// - `REELGRAB_BROWSER_URL` - Remote Chrome DevTools URL
    /// - `REELGRAB_CHROME` - Chrome executable path
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("REELGRAB_BROWSER_URL").filter(|v| !v.is_empty()) {
            self.remote_url = Some(val);
        }
        if let Some(val) = lookup("REELGRAB_CHROME").filter(|v| !v.is_empty()) {
            self.chrome_path = Some(PathBuf::from(val));
        }
        self
    }
}

pub fn default_headless() -> bool {
    true
}
