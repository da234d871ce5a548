//! Command line interface.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "reelgrab")]
#[command(about = "Resolve reel media URLs and list an account's reels")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 0.0.0.0:$PORT or 0.0.0.0:8000)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Resolve the direct media URL of a reel
    Resolve {
        /// Reel page URL
        url: String,
        /// Raw Cookie header to send with the request
        #[arg(long)]
        cookie: Option<String>,
    },

    /// List the reels published by an account
    Reels {
        /// Account name, with or without a leading @
        account: String,
        /// Stop after this many reels (0 = no limit)
        #[arg(short, long)]
        max: Option<usize>,
        /// Raw Cookie header to send with the request
        #[arg(long)]
        cookie: Option<String>,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => commands::serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Resolve { url, cookie } => {
            commands::resolve::cmd_resolve(&settings, &url, cookie.as_deref()).await
        }
        Commands::Reels {
            account,
            max,
            cookie,
        } => commands::reels::cmd_reels(&settings, &account, max, cookie.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reels_command() {
        let cli = Cli::parse_from(["reelgrab", "-v", "reels", "@someone", "--max", "10"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Reels { account, max, cookie } => {
                assert_eq!(account, "@someone");
                assert_eq!(max, Some(10));
                assert!(cookie.is_none());
            }
            _ => panic!("expected reels command"),
        }
    }

    #[test]
    fn test_parse_resolve_with_global_config() {
        let cli = Cli::parse_from([
            "reelgrab",
            "resolve",
            "https://www.instagram.com/reel/abc/",
            "--cookie",
            "sessionid=abc",
            "--config",
            "reelgrab.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("reelgrab.toml")));
        match cli.command {
            Commands::Resolve { url, cookie } => {
                assert_eq!(url, "https://www.instagram.com/reel/abc/");
                assert_eq!(cookie.as_deref(), Some("sessionid=abc"));
            }
            _ => panic!("expected resolve command"),
        }
    }
}
