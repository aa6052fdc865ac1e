//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and validates
//! them into an immutable [`BotConfig`].

use crate::error::BotError;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use teloxide::types::{ChatId, Recipient};
use tracing::warn;

/// Homework statuses endpoint of the review API
pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
/// Delay between poll cycles in seconds
pub const RETRY_PERIOD_SECS: u64 = 600;
/// Timeout of a single API request in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the review API token
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the target chat identifier
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Raw settings as loaded from files and the environment
///
/// Secrets are optional here; [`Settings::check_tokens`] reports which ones
/// are absent and [`Settings::into_bot_config`] turns a complete set into a
/// [`BotConfig`].
#[derive(Deserialize, Clone, Default)]
pub struct Settings {
    /// Review API OAuth token
    pub practicum_token: Option<String>,
    /// Telegram Bot API token
    pub telegram_token: Option<String>,
    /// Numeric chat id or `@channel` username
    pub telegram_chat_id: Option<String>,

    /// Homework statuses endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Delay between poll cycles in seconds
    #[serde(default = "default_retry_period_secs")]
    pub retry_period_secs: u64,
    /// Timeout of a single API request in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    ENDPOINT.to_string()
}

const fn default_retry_period_secs() -> u64 {
    RETRY_PERIOD_SECS
}

const fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Settings {
    /// Create new settings by loading from config files and the process environment
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a config file is malformed or a value has the wrong type.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // UPPER_SNAKE_CASE is mapped to snake_case keys; empty vars count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback for environments where the automatic key mapping misses a variable
        for (var, slot) in [
            (PRACTICUM_TOKEN_VAR, &mut settings.practicum_token),
            (TELEGRAM_TOKEN_VAR, &mut settings.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &mut settings.telegram_chat_id),
        ] {
            if slot.is_none() {
                if let Ok(val) = std::env::var(var) {
                    if !val.is_empty() {
                        *slot = Some(val);
                    }
                }
            }
        }

        Ok(settings)
    }

    /// Load settings from an explicit set of environment variables only
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value has the wrong type.
    pub fn from_env_map(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::default().ignore_empty(true).source(Some(vars)))
            .build()?
            .try_deserialize()
    }

    /// Names of required environment variables that are absent or empty
    #[must_use]
    pub fn missing_tokens(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    /// Returns true when every required secret is present
    ///
    /// Logs a warning naming the missing variables otherwise.
    #[must_use]
    pub fn check_tokens(&self) -> bool {
        let missing = self.missing_tokens();
        if missing.is_empty() {
            return true;
        }
        warn!(missing = %missing.join(", "), "Required environment variables are missing");
        false
    }

    /// Validate the settings into an immutable [`BotConfig`]
    ///
    /// This is the startup gate: the poll loop must not start unless it succeeds.
    ///
    /// # Errors
    ///
    /// - [`BotError::ConfigMissing`] listing every absent secret
    /// - [`BotError::InvalidConfig`] if the chat identifier is unusable
    pub fn into_bot_config(self) -> Result<BotConfig, BotError> {
        if !self.check_tokens() {
            return Err(BotError::ConfigMissing(self.missing_tokens()));
        }
        match (self.practicum_token, self.telegram_token, self.telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(chat_id)) => Ok(BotConfig {
                practicum_token,
                telegram_token,
                chat: parse_chat_id(&chat_id)?,
                endpoint: self.endpoint,
                retry_period: Duration::from_secs(self.retry_period_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            }),
            _ => Err(BotError::ConfigMissing(Vec::new())),
        }
    }
}

/// Validated configuration, built once at startup and shared read-only
#[derive(Clone)]
pub struct BotConfig {
    /// Review API OAuth token
    pub practicum_token: String,
    /// Telegram Bot API token
    pub telegram_token: String,
    /// Chat receiving every notification
    pub chat: Recipient,
    /// Homework statuses endpoint
    pub endpoint: String,
    /// Delay between poll cycles
    pub retry_period: Duration,
    /// Timeout of a single API request
    pub request_timeout: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("practicum_token", &"[MASKED]")
            .field("telegram_token", &"[MASKED]")
            .field("chat", &self.chat)
            .field("endpoint", &self.endpoint)
            .field("retry_period", &self.retry_period)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Parses a chat identifier: numeric ids become [`ChatId`], `@name` a channel username.
///
/// # Errors
///
/// Returns [`BotError::InvalidConfig`] for anything else, since Telegram would
/// reject every message sent to it.
pub fn parse_chat_id(raw: &str) -> Result<Recipient, BotError> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    match raw.strip_prefix('@') {
        Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
            Ok(Recipient::ChannelUsername(raw.to_string()))
        }
        _ => Err(BotError::InvalidConfig(format!(
            "{TELEGRAM_CHAT_ID_VAR} должен быть числовым id или @username, получено: {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_only_chat_id_reports_two_missing() -> Result<(), ConfigError> {
        let settings = Settings::from_env_map(env(&[("TELEGRAM_CHAT_ID", "12345")]))?;

        assert_eq!(
            settings.missing_tokens(),
            vec![PRACTICUM_TOKEN_VAR, TELEGRAM_TOKEN_VAR]
        );
        assert!(!settings.check_tokens());
        Ok(())
    }

    #[test]
    fn test_all_tokens_present() -> Result<(), Box<dyn std::error::Error>> {
        let settings = Settings::from_env_map(env(&[
            ("PRACTICUM_TOKEN", "p-token"),
            ("TELEGRAM_TOKEN", "123456789:abc"),
            ("TELEGRAM_CHAT_ID", "-100500"),
        ]))?;

        assert!(settings.check_tokens());
        let config = settings.into_bot_config()?;
        assert_eq!(config.chat, Recipient::Id(ChatId(-100_500)));
        assert_eq!(config.endpoint, ENDPOINT);
        assert_eq!(config.retry_period, Duration::from_secs(RETRY_PERIOD_SECS));
        assert_eq!(config.request_timeout, Duration::from_secs(REQUEST_TIMEOUT_SECS));
        Ok(())
    }

    #[test]
    fn test_empty_value_counts_as_missing() -> Result<(), ConfigError> {
        let settings = Settings::from_env_map(env(&[
            ("PRACTICUM_TOKEN", ""),
            ("TELEGRAM_TOKEN", "123456789:abc"),
            ("TELEGRAM_CHAT_ID", "1"),
        ]))?;

        assert_eq!(settings.missing_tokens(), vec![PRACTICUM_TOKEN_VAR]);
        Ok(())
    }

    #[test]
    fn test_overrides_are_read() -> Result<(), ConfigError> {
        let settings = Settings::from_env_map(env(&[
            ("RETRY_PERIOD_SECS", "5"),
            ("ENDPOINT", "http://localhost:8080/hw/"),
        ]))?;

        assert_eq!(settings.retry_period_secs, 5);
        assert_eq!(settings.endpoint, "http://localhost:8080/hw/");
        Ok(())
    }

    #[test]
    fn test_into_bot_config_reports_missing() {
        let settings = Settings {
            telegram_token: Some("123456789:abc".to_string()),
            ..Settings::default()
        };

        match settings.into_bot_config() {
            Err(BotError::ConfigMissing(names)) => {
                assert_eq!(names, vec![PRACTICUM_TOKEN_VAR, TELEGRAM_CHAT_ID_VAR]);
            }
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_chat_id() -> Result<(), BotError> {
        assert_eq!(parse_chat_id(" 42 ")?, Recipient::Id(ChatId(42)));
        assert_eq!(
            parse_chat_id("@homework_channel")?,
            Recipient::ChannelUsername("@homework_channel".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_chat_username_without_at_is_rejected() {
        for raw in ["homework_channel", "@", "@two words"] {
            assert!(
                matches!(parse_chat_id(raw), Err(BotError::InvalidConfig(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_into_bot_config_rejects_bad_chat_id() -> Result<(), ConfigError> {
        let settings = Settings::from_env_map(env(&[
            ("PRACTICUM_TOKEN", "p-token"),
            ("TELEGRAM_TOKEN", "123456789:abc"),
            ("TELEGRAM_CHAT_ID", "homework_channel"),
        ]))?;

        assert!(matches!(
            settings.into_bot_config(),
            Err(BotError::InvalidConfig(_))
        ));
        Ok(())
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = BotConfig {
            practicum_token: "secret-practicum".to_string(),
            telegram_token: "secret-telegram".to_string(),
            chat: Recipient::Id(ChatId(1)),
            endpoint: ENDPOINT.to_string(),
            retry_period: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-practicum"));
        assert!(!rendered.contains("secret-telegram"));
    }
}
