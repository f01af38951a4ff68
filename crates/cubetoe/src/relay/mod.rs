//! Local HTTP relay standing in for the hosted bot endpoint.
//!
//! The relay holds the bot token so the game does not have to. It exposes
//! `POST /send`, `GET /check` and `GET /health`; [`RelayClient`] speaks the
//! same API from the game side.

mod client;
mod server;

pub use client::RelayClient;
pub use server::{RelayState, router, run_relay};

use serde::{Deserialize, Serialize};

/// Body of `POST /send`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Destination chat.
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Message text, HTML formatted.
    #[serde(default)]
    pub text: Option<String>,
}

/// Query of `GET /check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckQuery {
    /// Handle to look for.
    #[serde(default, alias = "username")]
    pub handle: Option<String>,
}

/// Body answered by `GET /check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Resolved chat, `null` while waiting.
    pub chat_id: Option<i64>,
    /// Error tag, `username_mismatch` for a rejected match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Handle that was asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Username the sender actually has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Error tag for a sender whose username differs from the handle.
pub const USERNAME_MISMATCH: &str = "username_mismatch";
