//! Delivery of terminal side effects.
//!
//! The controller decides *that* a game produced an effect; this module
//! decides what the message says and sends it off the UI thread. Delivery is
//! fire-and-forget: a failure is logged and the game never hears about it.

use crate::telegram::{DestinationId, Notifier};
use cubetoe_core::TerminalEffect;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Message text for an effect. Draws send nothing.
pub fn compose(effect: &TerminalEffect) -> Option<String> {
    match effect {
        TerminalEffect::PlayerWin { promo } => Some(format!(
            "🏆 <b>Congratulations on your win!</b>\n\n\
             🎁 Your promo code: <code>{}</code>\n\n\
             Thanks for playing! 🎮",
            promo
        )),
        TerminalEffect::OpponentWin => Some(
            "😔 <b>No luck this time...</b>\n\n\
             Try again, luck is bound to smile on you! 🍀"
                .to_string(),
        ),
        TerminalEffect::Draw => None,
    }
}

/// Sends composed messages in background tasks.
#[derive(Clone)]
pub struct EffectDispatcher {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl EffectDispatcher {
    /// Creates a dispatcher; every delivery is cut off after `timeout`.
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Spawns delivery of `effect` to `destination`.
    ///
    /// Returns the task handle, or `None` when there is nothing to send or
    /// nowhere to send it. Must be called inside a Tokio runtime.
    #[instrument(skip(self, effect), fields(destination = ?destination))]
    pub fn dispatch(
        &self,
        effect: &TerminalEffect,
        destination: Option<DestinationId>,
    ) -> Option<JoinHandle<()>> {
        let Some(text) = compose(effect) else {
            debug!("Draw, nothing to send");
            return None;
        };
        let Some(destination) = destination else {
            info!("No linked chat, skipping notification");
            return None;
        };

        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;
        Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, notifier.send(&text, destination)).await {
                Ok(Ok(())) => info!(%destination, "Notification delivered"),
                Ok(Err(e)) => warn!(%destination, error = %e, "Notification failed"),
                Err(_) => warn!(%destination, ?timeout, "Notification timed out"),
            }
        }))
    }
}
