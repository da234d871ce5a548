//! Account reel listing command.

use console::style;

use crate::config::Settings;
use crate::service::ReelService;

pub async fn cmd_reels(
    settings: &Settings,
    account: &str,
    max: Option<usize>,
    cookie: Option<&str>,
) -> anyhow::Result<()> {
    let service = ReelService::from_settings(settings)?;

    eprintln!("{} Collecting reels for {}", style("→").cyan(), account);
    match service.list_reels(account, max, cookie).await {
        Ok(result) => {
            eprintln!(
                "  {} {} reels",
                style("✓").green(),
                style(result.count).bold()
            );
            super::print_json(&result)
        }
        Err(e) => {
            eprintln!("  {} {}", style("✗").red(), e);
            Err(e.into())
        }
    }
}
