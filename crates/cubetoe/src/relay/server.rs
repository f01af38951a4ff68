//! Relay HTTP server.

use super::{CheckQuery, CheckResponse, SendRequest, USERNAME_MISMATCH};
use crate::config::AppConfig;
use crate::telegram::{
    DestinationId, DestinationResolver, Handle, Notifier, Resolution, TelegramClient,
};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Collaborators the relay forwards to.
#[derive(Clone)]
pub struct RelayState {
    notifier: Arc<dyn Notifier>,
    resolver: Arc<dyn DestinationResolver>,
}

impl RelayState {
    /// Creates relay state from its two collaborators.
    pub fn new(notifier: Arc<dyn Notifier>, resolver: Arc<dyn DestinationResolver>) -> Self {
        Self { notifier, resolver }
    }
}

type ApiError = (StatusCode, Json<Value>);

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

#[instrument(skip_all)]
async fn send(
    State(state): State<RelayState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(chat_id), Some(text)) = (req.chat_id, req.text.filter(|t| !t.is_empty())) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing chat_id or text"})),
        ));
    };

    match state.notifier.send(&text, DestinationId(chat_id)).await {
        Ok(()) => {
            info!(chat_id, "Relayed message");
            Ok(Json(json!({"ok": true})))
        }
        Err(e) => {
            warn!(chat_id, error = %e, "Relay delivery failed");
            Err((StatusCode::BAD_GATEWAY, Json(json!({"error": e.message}))))
        }
    }
}

#[instrument(skip_all)]
async fn check(
    State(state): State<RelayState>,
    Query(query): Query<CheckQuery>,
) -> (StatusCode, Json<CheckResponse>) {
    let handle = match query.handle.as_deref().map(Handle::parse) {
        Some(Ok(handle)) => handle,
        Some(Err(e)) => return bad_request(e.message),
        None => return bad_request("Missing handle".to_string()),
    };

    match state.resolver.resolve(&handle).await {
        Ok(Resolution::Found(DestinationId(chat_id))) => {
            info!(%handle, chat_id, "Handle found");
            (
                StatusCode::OK,
                Json(CheckResponse {
                    chat_id: Some(chat_id),
                    ..CheckResponse::default()
                }),
            )
        }
        Ok(Resolution::NotYetFound) => (StatusCode::OK, Json(CheckResponse::default())),
        Ok(Resolution::HandleMismatch { expected, actual }) => {
            warn!(%expected, %actual, "Username mismatch");
            (
                StatusCode::BAD_REQUEST,
                Json(CheckResponse {
                    chat_id: None,
                    error: Some(USERNAME_MISMATCH.to_string()),
                    expected: Some(expected),
                    actual: Some(actual),
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "Resolution failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckResponse {
                    error: Some(e.message),
                    ..CheckResponse::default()
                }),
            )
        }
    }
}

fn bad_request(message: String) -> (StatusCode, Json<CheckResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(CheckResponse {
            error: Some(message),
            ..CheckResponse::default()
        }),
    )
}

/// Builds the relay router.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/send", post(send))
        .route("/check", get(check))
        .with_state(state)
}

/// Serves the relay on `127.0.0.1:<relay_port>` until the process exits.
#[instrument(skip(config), fields(port = config.relay_port()))]
pub async fn run_relay(config: &AppConfig) -> Result<()> {
    let token = config
        .bot_token()
        .clone()
        .context("BOT_TOKEN is not configured")?;
    let client = Arc::new(TelegramClient::new(
        config.api_base(),
        token,
        config.request_timeout(),
    )?);
    let state = RelayState::new(client.clone(), client);

    let addr = format!("127.0.0.1:{}", config.relay_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Relay listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
