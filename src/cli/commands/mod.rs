//! Command implementations.

pub mod reels;
pub mod resolve;
pub mod serve;

use serde::Serialize;

/// Print a result as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
