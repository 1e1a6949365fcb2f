//! Telegram transport settings.

use autoforward_core::config::RelaySettings;
use config::{Config, ConfigError};
use serde::Deserialize;
use std::sync::Arc;

/// Initial delay before retrying a failed Telegram API call
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for a single retry delay
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Retries after the first attempt
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

/// Telegram credentials loaded from environment variables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramSettings {
    /// Bot API token.
    pub bot_token: String,
    /// MTProto application id.
    pub api_id: i32,
    /// MTProto application hash.
    pub api_hash: String,
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a credential is missing.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(autoforward_core::config::build_config()?)
    }

    /// Deserialize and validate credentials from an already built [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for missing keys, an empty token or hash, or a
    /// non-positive `api_id`.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.bot_token.trim().is_empty() {
            return Err(ConfigError::Message("BOT_TOKEN must not be empty".into()));
        }
        if settings.api_hash.trim().is_empty() {
            return Err(ConfigError::Message("API_HASH must not be empty".into()));
        }
        if settings.api_id <= 0 {
            return Err(ConfigError::Message(
                "API_ID must be a positive integer".into(),
            ));
        }
        Ok(settings)
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Relay tuning shared with the job executor.
    pub relay: Arc<RelaySettings>,
    /// Telegram credentials.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(relay: RelaySettings, telegram: TelegramSettings) -> Self {
        Self {
            relay: Arc::new(relay),
            telegram: Arc::new(telegram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(entries: &[(&str, &str)]) -> Config {
        let mut builder = Config::builder();
        for (key, value) in entries {
            builder = builder
                .set_override(*key, *value)
                .expect("override accepted");
        }
        builder.build().expect("config builds")
    }

    #[test]
    fn loads_all_credentials() {
        let settings = TelegramSettings::from_config(config_with(&[
            ("bot_token", "123:abc"),
            ("api_id", "42"),
            ("api_hash", "deadbeef"),
        ]))
        .expect("valid settings");

        assert_eq!(settings.bot_token, "123:abc");
        assert_eq!(settings.api_id, 42);
        assert_eq!(settings.api_hash, "deadbeef");
    }

    #[test]
    fn missing_hash_is_rejected() {
        let result = TelegramSettings::from_config(config_with(&[
            ("bot_token", "123:abc"),
            ("api_id", "42"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn empty_token_is_rejected() {
        let result = TelegramSettings::from_config(config_with(&[
            ("bot_token", "  "),
            ("api_id", "42"),
            ("api_hash", "deadbeef"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_api_id_is_rejected() {
        let result = TelegramSettings::from_config(config_with(&[
            ("bot_token", "123:abc"),
            ("api_id", "0"),
            ("api_hash", "deadbeef"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn non_numeric_api_id_is_rejected() {
        let result = TelegramSettings::from_config(config_with(&[
            ("bot_token", "123:abc"),
            ("api_id", "abc"),
            ("api_hash", "deadbeef"),
        ]));
        assert!(result.is_err());
    }
}
