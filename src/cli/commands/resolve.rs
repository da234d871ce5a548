//! Single reel resolution command.

use console::style;

use crate::config::Settings;
use crate::service::ReelService;

pub async fn cmd_resolve(
    settings: &Settings,
    url: &str,
    cookie: Option<&str>,
) -> anyhow::Result<()> {
    let service = ReelService::from_settings(settings)?;

    eprintln!("{} Resolving {}", style("→").cyan(), url);
    match service.resolve(url, cookie).await {
        Ok(result) => {
            eprintln!("  {} Found media URL", style("✓").green());
            super::print_json(&result)
        }
        Err(e) => {
            eprintln!("  {} {}", style("✗").red(), e);
            Err(e.into())
        }
    }
}
