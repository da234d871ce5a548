//! Web server command.

use console::style;

use crate::config::Settings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let default_port = port_from_env(std::env::var("PORT").ok().as_deref());
    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, default_port)?,
        None => (DEFAULT_HOST.to_string(), default_port),
    };

    eprintln!(
        "{} Starting reelgrab server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    eprintln!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

fn port_from_env(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> 0.0.0.0:8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1:<default port>
/// - Host and port: "127.0.0.1:8080"
fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("empty bind address");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok((DEFAULT_HOST.to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), default_port))
}
