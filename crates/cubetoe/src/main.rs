//! Cubetoe - unified CLI.

use anyhow::Result;
use clap::Parser;
use cubetoe::cli::{Cli, Command};
use cubetoe::{AppConfig, Handle, deep_link};
use std::path::Path;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            offline,
            seed,
        } => {
            let config = AppConfig::load(&config)?;
            cubetoe::tui::run_tui(config, seed, offline).await
        }
        Command::Relay { config, port } => run_relay(&config, port).await,
        Command::Link { handle, config } => print_link(&handle, &config),
    }
}

/// Run the relay, logging to stderr.
#[instrument(skip_all)]
async fn run_relay(config_path: &Path, port: Option<u16>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port {
        config = config.with_relay_port(port);
    }
    info!(port = config.relay_port(), "Starting cubetoe relay");
    cubetoe::relay::run_relay(&config).await
}

/// Print the deep link for a handle.
fn print_link(raw: &str, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let handle = Handle::parse(raw)?;
    println!("{}", deep_link(config.bot_username(), &handle));
    Ok(())
}
