//! Telegram collaborators: message delivery and handle resolution.

mod client;
mod handle;
mod notifier;
mod resolver;
mod types;

pub use client::TelegramClient;
pub use handle::{Handle, HandleError, deep_link};
pub use notifier::{Notifier, NotifyError};
pub use resolver::{DestinationResolver, Resolution, ResolveError, scan_updates};
pub use types::{ApiResponse, Chat, DestinationId, Message, Update, User};
