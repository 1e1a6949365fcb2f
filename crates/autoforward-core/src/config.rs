//! Configuration and settings management
//!
//! Loads relay tunables from config files and environment variables and
//! defines their defaults.

use crate::job::ExecutorConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay (milliseconds) after every relayed message to stay under platform rate limits.
pub const RELAY_DELAY_MS: u64 = 300;
/// Number of processed messages between progress edits.
pub const PROGRESS_EVERY: usize = 20;

/// Relay tunables loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Per-message delay in milliseconds
    #[serde(default = "default_relay_delay_ms")]
    pub relay_delay_ms: u64,
    /// Progress edit interval in processed messages
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

const fn default_relay_delay_ms() -> u64 {
    RELAY_DELAY_MS
}

const fn default_progress_every() -> usize {
    PROGRESS_EVERY
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            relay_delay_ms: RELAY_DELAY_MS,
            progress_every: PROGRESS_EVERY,
        }
    }
}

impl RelaySettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a value is out of range.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(build_config()?)
    }

    /// Deserialize and validate settings from an already built [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if deserialization fails or a value is out of range.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_every == 0 {
            return Err(ConfigError::Message(
                "PROGRESS_EVERY must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Executor parameters derived from these settings.
    #[must_use]
    pub const fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            relay_delay: Duration::from_millis(self.relay_delay_ms),
            progress_every: self.progress_every,
        }
    }
}

/// Build the layered configuration shared by every settings struct.
///
/// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__`-prefixed variables, then plain environment
/// variables (empty values are treated as unset).
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // This file shouldn't be checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .add_source(Environment::default().ignore_empty(true))
        .build()
}
