//! Hub Configuration Settings
//!
//! Configuration for the live hub, loaded from environment variables.

use std::time::Duration;

use crate::domain::speech::SpeechLanguage;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse.
    #[error("invalid value for {variable}: {value}")]
    InvalidValue {
        /// Variable name.
        variable: String,
        /// Offending value.
        value: String,
    },
}

/// Complete hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Interval between update ticks.
    pub tick_interval: Duration,
    /// Recognition language applied to speech sessions.
    pub language: SpeechLanguage,
    /// Optional seed for the simulated feed; `None` means OS randomness.
    pub feed_seed: Option<u64>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            language: SpeechLanguage::default(),
            feed_seed: None,
        }
    }
}

impl HubConfig {
    /// Create configuration from environment variables.
    ///
    /// - `LIVE_UPDATE_INTERVAL_SECS`: tick interval (default: 30)
    /// - `SPEECH_LANGUAGE`: en | hi | pa (default: en)
    /// - `FEED_SEED`: deterministic feed seed (default: unset)
    ///
    /// # Errors
    ///
    /// Returns an error when a set variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tick_interval = match std::env::var("LIVE_UPDATE_INTERVAL_SECS") {
            Ok(value) => parse_duration_secs("LIVE_UPDATE_INTERVAL_SECS", &value)?,
            Err(_) => defaults.tick_interval,
        };

        let language = std::env::var("SPEECH_LANGUAGE")
            .map(|s| SpeechLanguage::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let feed_seed = match std::env::var("FEED_SEED") {
            Ok(value) => Some(parse_u64("FEED_SEED", &value)?),
            Err(_) => None,
        };

        Ok(Self {
            tick_interval,
            language,
            feed_seed,
        })
    }
}

/// Parse a whole-seconds duration value.
fn parse_duration_secs(variable: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue {
            variable: variable.to_string(),
            value: value.to_string(),
        })
}

/// Parse a u64 value.
fn parse_u64(variable: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        variable: variable.to_string(),
        value: value.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
