//! Canned document fetcher for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::DocumentFetcher;
use crate::error::FetchError;

#[derive(Clone)]
enum Reply {
    Body(String),
    Status(u16),
    Transport,
}

/// Fetcher that always gives the same reply and records its calls.
#[derive(Clone)]
pub(crate) struct FakeFetcher {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    cookies: Arc<Mutex<Vec<Option<String>>>>,
}

impl FakeFetcher {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            cookies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn body(html: &str) -> Self {
        Self::with_reply(Reply::Body(html.to_string()))
    }

    pub(crate) fn status(status: u16) -> Self {
        Self::with_reply(Reply::Status(status))
    }

    pub(crate) fn transport_error() -> Self {
        Self::with_reply(Reply::Transport)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cookies(&self) -> Vec<Option<String>> {
        self.cookies.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, cookie_header: Option<&str>) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cookies
            .lock()
            .unwrap()
            .push(cookie_header.map(str::to_string));
        match &self.reply {
            Reply::Body(html) => Ok(html.clone()),
            Reply::Status(status) => Err(FetchError::Upstream {
                status: *status,
                url: url.to_string(),
            }),
            Reply::Transport => Err(FetchError::Transport("connection refused".to_string())),
        }
    }
}
