//! User handles typed on the link screen.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A Telegram username as typed by the player, without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Shortest handle accepted.
    pub const MIN_LEN: usize = 2;

    /// Normalizes raw input: trims whitespace and one leading `@`.
    ///
    /// # Errors
    ///
    /// [`HandleError`] when fewer than [`Handle::MIN_LEN`] characters remain
    /// or the handle contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let trimmed = raw.trim();
        let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if handle.chars().count() < Self::MIN_LEN {
            return Err(HandleError::new(format!(
                "handle must have at least {} characters",
                Self::MIN_LEN
            )));
        }
        if handle.chars().any(char::is_whitespace) {
            return Err(HandleError::new("handle must not contain spaces"));
        }
        Ok(Self(handle.to_string()))
    }

    /// The handle text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, the way Telegram treats usernames.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim_start_matches('@'))
    }
}

/// Link that opens the bot with `/start <handle>` prefilled.
pub fn deep_link(bot_username: &str, handle: &Handle) -> String {
    format!(
        "https://t.me/{}?start={}",
        bot_username.trim_start_matches('@'),
        handle
    )
}

/// Rejected handle input.
#[derive(Debug, Clone, Display, Error)]
#[display("Handle error: {} at {}:{}", message, file, line)]
pub struct HandleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HandleError {
    /// Creates a new handle error.
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
