//! Diagnostics go to stderr through `tracing`; stdout carries only the
//! final report.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Maps `-q` / `-v` counts to a level. Warnings (unreadable directories,
/// skipped files) are shown unless quiet.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// `RUST_LOG` wins over the command-line level when set.
pub fn init(level: Level) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dircount={}", level.as_str().to_ascii_lowercase())));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("{error}"))
        .context("failed to initialize tracing subscriber")
}
