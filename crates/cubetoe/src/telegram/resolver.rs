//! Mapping a typed handle to a chat id.
//!
//! The bot's inbound feed is scanned for `/start <handle>`. A match is only
//! accepted when the sender's own username agrees with the handle; otherwise
//! the result is [`Resolution::HandleMismatch`], which the link screen shows
//! as an explicit rejection. This trusts Telegram's self-reported username
//! and is not an identity proof.

use super::handle::Handle;
use super::types::{DestinationId, Update};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The handle was claimed by this chat.
    Found(DestinationId),
    /// No matching `/start` yet; poll again later.
    NotYetFound,
    /// Someone sent `/start <handle>` from a differently named account.
    HandleMismatch {
        /// Handle the player typed.
        expected: String,
        /// Username Telegram reported for the sender (empty if unset).
        actual: String,
    },
}

/// Something that can resolve handles, directly or through the relay.
#[async_trait]
pub trait DestinationResolver: Send + Sync {
    /// Performs a single, idempotent resolution attempt.
    async fn resolve(&self, handle: &Handle) -> Result<Resolution, ResolveError>;
}

/// Scans a batch of updates, newest first.
///
/// Returns the resolution together with the update id that must be
/// acknowledged so the same message is never matched twice. `None` means
/// nothing in the batch concerns `handle`.
pub fn scan_updates(updates: &[Update], handle: &Handle) -> Option<(i64, Resolution)> {
    for update in updates.iter().rev() {
        let Some(message) = &update.message else {
            continue;
        };
        let Some(text) = message.text.as_deref() else {
            continue;
        };
        if !text.starts_with("/start") {
            continue;
        }
        let mut parts = text.split_whitespace();
        let _command = parts.next();
        match parts.next() {
            Some(argument) if handle.matches(argument) => {}
            _ => continue,
        }

        let sender = message
            .from
            .as_ref()
            .and_then(|user| user.username.clone())
            .unwrap_or_default();
        let resolution = if !sender.is_empty() && handle.matches(&sender) {
            Resolution::Found(DestinationId(message.chat.id))
        } else {
            debug!(expected = %handle, actual = %sender, "Sender username does not match handle");
            Resolution::HandleMismatch {
                expected: handle.to_string(),
                actual: sender,
            }
        };
        return Some((update.update_id, resolution));
    }
    None
}

/// Destination resolution failed before an answer was obtained.
#[derive(Debug, Clone, Display, Error)]
#[display("Resolve error: {} at {}:{}", message, file, line)]
pub struct ResolveError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ResolveError {
    /// Creates a new resolve error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP request failed: {}", err))
    }
}
