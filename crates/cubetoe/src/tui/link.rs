//! Handle entry and the wait for `/start`.

use crate::telegram::{Handle, deep_link};
use crossterm::event::KeyCode;
use tracing::debug;

/// What the link screen is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Typing a handle.
    Editing,
    /// Input was rejected.
    Invalid(String),
    /// Polling for `/start <handle>`.
    Waiting {
        /// Handle being waited for.
        handle: Handle,
        /// Deep link shown to the player.
        link: String,
    },
    /// Someone else's account sent the `/start`.
    Mismatch {
        /// Handle the player typed.
        expected: String,
        /// Username Telegram reported.
        actual: String,
    },
}

/// Result of a key press on the link screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Nothing for the app to do.
    None,
    /// Start polling for this handle.
    Submit(Handle),
    /// Input changed while polling; stop.
    Cancel,
    /// Play without a linked chat.
    Skip,
}

/// State of the link screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkScreen {
    input: String,
    status: LinkStatus,
    dots: usize,
    bot_username: String,
}

impl LinkScreen {
    /// Longest accepted input.
    pub const MAX_INPUT: usize = 32;

    /// Empty screen for `bot_username`.
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            input: String::new(),
            status: LinkStatus::Editing,
            dots: 0,
            bot_username: bot_username.into(),
        }
    }

    /// Text typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current status.
    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    /// Bot the deep link points at.
    pub fn bot_username(&self) -> &str {
        &self.bot_username
    }

    /// Waiting indicator, cycling through zero to three dots.
    pub fn dots(&self) -> usize {
        self.dots
    }

    /// Advances the waiting indicator.
    pub fn tick_dots(&mut self) {
        self.dots = (self.dots + 1) % 4;
    }

    /// True while polling.
    pub fn is_waiting(&self) -> bool {
        matches!(self.status, LinkStatus::Waiting { .. })
    }

    /// Handle being waited for.
    pub fn waiting_for(&self) -> Option<&Handle> {
        match &self.status {
            LinkStatus::Waiting { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Shows a mismatch rejection; the player may edit and retry.
    pub fn reject(&mut self, expected: String, actual: String) {
        self.status = LinkStatus::Mismatch { expected, actual };
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, code: KeyCode) -> LinkAction {
        match code {
            KeyCode::Esc => LinkAction::Skip,
            KeyCode::Enter => match Handle::parse(&self.input) {
                Ok(handle) => {
                    let link = deep_link(&self.bot_username, &handle);
                    debug!(%handle, %link, "Waiting for /start");
                    self.status = LinkStatus::Waiting {
                        handle: handle.clone(),
                        link,
                    };
                    self.dots = 0;
                    LinkAction::Submit(handle)
                }
                Err(e) => {
                    self.status = LinkStatus::Invalid(e.message);
                    LinkAction::None
                }
            },
            KeyCode::Backspace => {
                self.input.pop();
                self.edited()
            }
            KeyCode::Char(c) if !c.is_control() && self.input.chars().count() < Self::MAX_INPUT => {
                self.input.push(c);
                self.edited()
            }
            _ => LinkAction::None,
        }
    }

    fn edited(&mut self) -> LinkAction {
        let was_waiting = self.is_waiting();
        self.status = LinkStatus::Editing;
        if was_waiting {
            LinkAction::Cancel
        } else {
            LinkAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(screen: &mut LinkScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_submit_shows_deep_link() {
        let mut screen = LinkScreen::new("promo_for_user_bot");
        type_text(&mut screen, "@dave");
        let action = screen.handle_key(KeyCode::Enter);
        assert_eq!(action, LinkAction::Submit(Handle::parse("dave").unwrap()));
        match screen.status() {
            LinkStatus::Waiting { link, .. } => {
                assert_eq!(link, "https://t.me/promo_for_user_bot?start=dave")
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn test_short_handle_is_invalid() {
        let mut screen = LinkScreen::new("bot");
        type_text(&mut screen, "@x");
        assert_eq!(screen.handle_key(KeyCode::Enter), LinkAction::None);
        assert!(matches!(screen.status(), LinkStatus::Invalid(_)));
    }

    #[test]
    fn test_editing_while_waiting_cancels() {
        let mut screen = LinkScreen::new("bot");
        type_text(&mut screen, "erin");
        screen.handle_key(KeyCode::Enter);
        assert_eq!(screen.handle_key(KeyCode::Backspace), LinkAction::Cancel);
        assert_eq!(screen.input(), "eri");
        assert_eq!(screen.status(), &LinkStatus::Editing);
    }

    #[test]
    fn test_escape_skips() {
        let mut screen = LinkScreen::new("bot");
        assert_eq!(screen.handle_key(KeyCode::Esc), LinkAction::Skip);
    }
}
