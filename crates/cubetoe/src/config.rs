//! Application configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime configuration for the game and the relay.
///
/// Loaded from TOML, then overridden from the environment. Every field has a
/// default so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Telegram bot token. Without one (and without a relay) the game runs
    /// unlinked.
    bot_token: Option<String>,

    /// Bot username, without `@`, used to build the deep link.
    bot_username: String,

    /// Base URL of the Bot API.
    api_base: String,

    /// Relay to use instead of calling the Bot API directly.
    relay_url: Option<String>,

    /// Timeout for each outbound request, in seconds.
    request_timeout_secs: u64,

    /// Interval between destination polls, in milliseconds.
    poll_interval_ms: u64,

    /// Cosmetic pause before the opponent moves, in milliseconds.
    opponent_delay_ms: u64,

    /// Port the relay listens on.
    relay_port: u16,

    /// File the terminal UI writes its log to.
    log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            bot_username: "promo_for_user_bot".to_string(),
            api_base: "https://api.telegram.org".to_string(),
            relay_url: None,
            request_timeout_secs: 5,
            poll_interval_ms: 2000,
            opponent_delay_ms: 450,
            relay_port: 8081,
            log_file: "cubetoe.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, falls back to defaults otherwise, then
    /// applies environment overrides.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `BOT_TOKEN`, `BOT_USERNAME` and `CUBETOE_RELAY_URL`.
    ///
    /// `lookup` stands in for the process environment so overrides can be
    /// exercised without touching it.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty()) {
            debug!("BOT_TOKEN taken from environment");
            self.bot_token = Some(token);
        }
        if let Some(username) = lookup("BOT_USERNAME").filter(|u| !u.trim().is_empty()) {
            self.bot_username = username;
        }
        if let Some(url) = lookup("CUBETOE_RELAY_URL").filter(|u| !u.trim().is_empty()) {
            self.relay_url = Some(url);
        }
        self
    }

    /// Returns a copy with the relay port replaced.
    pub fn with_relay_port(mut self, port: u16) -> Self {
        self.relay_port = port;
        self
    }

    /// Returns a copy with every external collaborator switched off.
    pub fn offline(mut self) -> Self {
        self.bot_token = None;
        self.relay_url = None;
        self
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Opponent delay as a duration.
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    /// True when either the Bot API or a relay is reachable in principle.
    pub fn has_collaborators(&self) -> bool {
        self.relay_url.is_some() || self.bot_token.is_some()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::new("request_timeout_secs must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::new("poll_interval_ms must be positive"));
        }
        if self.bot_username.trim().is_empty() {
            return Err(ConfigError::new("bot_username must not be empty"));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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
