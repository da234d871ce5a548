//! Stand-in engine for builds without the `browser` feature.

use async_trait::async_trait;

use super::{BrowserEngine, BrowserEngineConfig, BrowserSession, SessionOptions};
use crate::error::BrowserError;

pub struct ChromiumEngine {
    _config: BrowserEngineConfig,
}

impl ChromiumEngine {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { _config: config }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_session(
        &self,
        _options: &SessionOptions,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        Err(BrowserError::Launch(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}
