//! Game-side client for the relay.

use super::{CheckResponse, SendRequest, USERNAME_MISMATCH};
use crate::telegram::{
    DestinationId, DestinationResolver, Handle, Notifier, NotifyError, Resolution, ResolveError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sends and resolves through a running relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Creates a client for the relay at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for RelayClient {
    #[instrument(skip(self, text), fields(destination = %destination))]
    async fn send(&self, text: &str, destination: DestinationId) -> Result<(), NotifyError> {
        let body = SendRequest {
            chat_id: Some(destination.0),
            text: Some(text.to_string()),
        };
        let response = self
            .client
            .post(format!("{}/send", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::new(format!("relay answered {}: {}", status, detail)));
        }
        debug!("Relay accepted message");
        Ok(())
    }
}

#[async_trait]
impl DestinationResolver for RelayClient {
    #[instrument(skip(self), fields(handle = %handle))]
    async fn resolve(&self, handle: &Handle) -> Result<Resolution, ResolveError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/check", self.base_url),
            &[("handle", handle.as_str())],
        )
        .map_err(|e| ResolveError::new(format!("invalid relay url: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: CheckResponse = response.json().await?;

        if status == StatusCode::BAD_REQUEST && body.error.as_deref() == Some(USERNAME_MISMATCH) {
            return Ok(Resolution::HandleMismatch {
                expected: body.expected.unwrap_or_else(|| handle.to_string()),
                actual: body.actual.unwrap_or_default(),
            });
        }
        if !status.is_success() {
            return Err(ResolveError::new(format!(
                "relay answered {}: {}",
                status,
                body.error.unwrap_or_default()
            )));
        }
        Ok(match body.chat_id {
            Some(chat_id) => Resolution::Found(DestinationId(chat_id)),
            None => Resolution::NotYetFound,
        })
    }
}
