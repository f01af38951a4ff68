//! Bot API wire types.
//!
//! Only the fields the game reads are modelled; everything else in a Telegram
//! payload is ignored by serde.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Chat identifier a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub i64);

/// Envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Payload on success.
    pub result: Option<T>,
    /// Human-readable reason on failure.
    pub description: Option<String>,
}

/// One entry of the `getUpdates` feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic feed position.
    pub update_id: i64,
    /// Present for plain message updates.
    #[serde(default)]
    pub message: Option<Message>,
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Chat the message was sent in.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Message text, absent for stickers and media.
    #[serde(default)]
    pub text: Option<String>,
}

/// Chat a message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat id, used as the destination.
    pub id: i64,
}

/// Sender of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric user id.
    pub id: i64,
    /// Self-reported username, if the user set one.
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: DestinationId,
    pub text: &'a str,
    pub parse_mode: &'static str,
}

/// Body of a `getUpdates` call.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}
