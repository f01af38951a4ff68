//! Direct Bot API client.

use super::handle::Handle;
use super::notifier::{Notifier, NotifyError};
use super::resolver::{DestinationResolver, Resolution, ResolveError, scan_updates};
use super::types::{ApiResponse, DestinationId, GetUpdates, SendMessage, Update};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const ALLOWED_UPDATES: &[&str] = &["message"];

/// Talks to `https://api.telegram.org/bot<token>/...`.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a client whose every request is bounded by `timeout`.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }

    /// Calls `sendMessage` with HTML formatting.
    #[instrument(skip(self, text), fields(chat_id = %chat_id))]
    pub async fn send_message(&self, chat_id: DestinationId, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };
        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            let reason = response.description.unwrap_or_else(|| "unknown".to_string());
            warn!(%reason, "sendMessage rejected");
            return Err(NotifyError::new(format!("sendMessage rejected: {}", reason)));
        }
        info!("Message delivered");
        Ok(())
    }

    /// Calls `getUpdates`, optionally confirming everything before `offset`.
    #[instrument(skip(self))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ResolveError> {
        let body = GetUpdates {
            offset,
            timeout: 1,
            allowed_updates: ALLOWED_UPDATES,
        };
        let response: ApiResponse<Vec<Update>> = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            let reason = response.description.unwrap_or_else(|| "unknown".to_string());
            return Err(ResolveError::new(format!("getUpdates rejected: {}", reason)));
        }
        let updates = response.result.unwrap_or_default();
        debug!(count = updates.len(), "Fetched updates");
        Ok(updates)
    }

    /// Marks `update_id` and everything before it as consumed.
    #[instrument(skip(self))]
    pub async fn acknowledge(&self, update_id: i64) -> Result<(), ResolveError> {
        self.get_updates(Some(update_id + 1)).await.map(|_| ())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str, destination: DestinationId) -> Result<(), NotifyError> {
        self.send_message(destination, text).await
    }
}

#[async_trait]
impl DestinationResolver for TelegramClient {
    #[instrument(skip(self), fields(handle = %handle))]
    async fn resolve(&self, handle: &Handle) -> Result<Resolution, ResolveError> {
        let updates = self.get_updates(None).await?;
        let Some((update_id, resolution)) = scan_updates(&updates, handle) else {
            debug!("Handle not seen yet");
            return Ok(Resolution::NotYetFound);
        };

        if let Err(e) = self.acknowledge(update_id).await {
            warn!(error = %e, update_id, "Failed to acknowledge update");
        }
        info!(?resolution, "Handle resolved");
        Ok(resolution)
    }
}
