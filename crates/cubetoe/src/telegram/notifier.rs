//! Outbound chat messages.

use super::types::DestinationId;
use async_trait::async_trait;
use derive_more::{Display, Error};

/// One-way, best-effort message delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to `destination`. Not retried.
    async fn send(&self, text: &str, destination: DestinationId) -> Result<(), NotifyError>;
}

/// Delivery failed.
#[derive(Debug, Clone, Display, Error)]
#[display("Notify error: {} at {}:{}", message, file, line)]
pub struct NotifyError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NotifyError {
    /// Creates a new notify error.
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

impl From<reqwest::Error> for NotifyError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP request failed: {}", err))
    }
}
