//! Command-line interface for cubetoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cubetoe - tic-tac-toe on a cube with Telegram promo codes
#[derive(Parser, Debug)]
#[command(name = "cubetoe")]
#[command(about = "Beat the (not very clever) cube and win a promo code", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Path to the config file
        #[arg(short, long, default_value = "cubetoe.toml")]
        config: PathBuf,

        /// Skip Telegram entirely
        #[arg(long)]
        offline: bool,

        /// Seed the opponent for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the local relay that holds the bot token
    Relay {
        /// Path to the config file
        #[arg(short, long, default_value = "cubetoe.toml")]
        config: PathBuf,

        /// Port to bind to (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the Telegram deep link for a username
    Link {
        /// Telegram username, with or without @
        handle: String,

        /// Path to the config file
        #[arg(short, long, default_value = "cubetoe.toml")]
        config: PathBuf,
    },
}
