//! reelgrab command line entry point.

use reelgrab::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any settings
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "reelgrab=info"
    } else {
        "reelgrab=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
