//! SRTP self-test - boot-time round-trip check of the SRTP engine
//!
//! Simulates the device on the host: the test task runs once, reports a
//! verdict, waits and restarts the process.

mod boot;
mod config;
#[cfg(test)]
mod log_capture;
mod platform;
mod selftest;
mod srtp;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::HostPlatform;

#[derive(Parser)]
#[command(name = "srtp-selftest")]
#[command(about = "Boot-time SRTP round-trip self-test", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    boot::app_main(&HostPlatform, &config).context("Failed to start the test task")?;

    // The test task owns the rest of this boot; it restarts the process itself.
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Interrupted");
    Ok(())
}
