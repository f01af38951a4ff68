//! Tests for configuration loading.

use cubetoe::AppConfig;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.bot_username(), "promo_for_user_bot");
    assert_eq!(config.api_base(), "https://api.telegram.org");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.poll_interval(), Duration::from_millis(2000));
    assert_eq!(config.opponent_delay(), Duration::from_millis(450));
    assert_eq!(*config.relay_port(), 8081);
    assert!(config.bot_token().is_none());
    assert!(!config.has_collaborators());
}

#[test]
fn test_from_file_overrides_some_fields() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bot_username = "my_bot"
relay_url = "http://localhost:9000"
poll_interval_ms = 1000
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.bot_username(), "my_bot");
    assert_eq!(config.relay_url().as_deref(), Some("http://localhost:9000"));
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.opponent_delay(), Duration::from_millis(450));
    assert!(config.has_collaborators());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.bot_username(), "promo_for_user_bot");
}

#[test]
fn test_invalid_toml_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "poll_interval_ms = \"soon\"").unwrap();
    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
    assert!(err.to_string().starts_with("Config error:"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let err = AppConfig::from_toml("request_timeout_secs = 0").unwrap_err();
    assert!(err.message.contains("request_timeout_secs"));
}

#[test]
fn test_env_overrides() {
    let config = AppConfig::default().with_env_overrides(|key| match key {
        "BOT_TOKEN" => Some("123:abc".to_string()),
        "BOT_USERNAME" => Some("other_bot".to_string()),
        "CUBETOE_RELAY_URL" => Some("  ".to_string()),
        _ => None,
    });
    assert_eq!(config.bot_token().as_deref(), Some("123:abc"));
    assert_eq!(config.bot_username(), "other_bot");
    assert!(config.relay_url().is_none());
}

#[test]
fn test_offline_drops_collaborators() {
    let config = AppConfig::from_toml("bot_token = \"t\"\nrelay_url = \"http://x\"")
        .unwrap()
        .offline();
    assert!(!config.has_collaborators());
}
