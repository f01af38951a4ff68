//! Cubetoe - tic-tac-toe on a spinning cube, in the terminal.
//!
//! The game logic lives in [`cubetoe_core`]. This crate adds everything
//! around it:
//!
//! - **TUI**: ratatui front end with a projected 3D cube
//! - **Telegram**: promo-code delivery and handle linking via the Bot API
//! - **Relay**: a small HTTP service that holds the bot token for the game
//! - **Scheduler**: generation-keyed timers for the opponent and animations
//!
//! # Example
//!
//! ```
//! use cubetoe::{Handle, deep_link};
//!
//! let handle = Handle::parse("@alice").unwrap();
//! assert_eq!(
//!     deep_link("promo_for_user_bot", &handle),
//!     "https://t.me/promo_for_user_bot?start=alice"
//! );
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod effects;
pub mod relay;
mod scheduler;
mod telegram;
pub mod tui;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - Effect dispatch
pub use effects::{EffectDispatcher, compose};

// Crate-level exports - Scheduling
pub use scheduler::{Scheduler, Tagged};

// Crate-level exports - Telegram collaborators
pub use telegram::{
    ApiResponse, Chat, DestinationId, DestinationResolver, Handle, HandleError, Message, Notifier,
    NotifyError, Resolution, ResolveError, TelegramClient, Update, User, deep_link, scan_updates,
};
