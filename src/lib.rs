//! reelgrab - resolve reel media URLs and list an account's reels.
//!
//! Resolution tries a plain document fetch first and falls back to a
//! headless browser render. Collection scrolls an account's reels grid in a
//! browser until a cap is reached or the page stops yielding new links.

pub mod browser;
pub mod cli;
pub mod collector;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod resolver;
pub mod server;
pub mod service;

pub use collector::{CollectionResult, CollectorOptions, ReelCollector};
pub use config::Settings;
pub use error::{BrowserError, FetchError, ReelError};
pub use resolver::{ResolutionResult, Resolver};
pub use service::ReelService;
