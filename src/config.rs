//! Client configuration from the environment

use crate::language::{Language, ParseLanguageError};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONSULT_LANGUAGE: {0}")]
    Language(#[from] ParseLanguageError),
    #[error("CONSULT_TIMEOUT_SECS must be a positive number of seconds, got '{0}'")]
    Timeout(String),
}

/// Settings for talking to the consultation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Address the service endpoints hang off
    pub base_url: String,
    /// Language the session starts in
    pub language: Language,
    /// Per-request transport timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: Language::default(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// # Errors
    ///
    /// Fails when `CONSULT_LANGUAGE` or `CONSULT_TIMEOUT_SECS` hold values that
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(base_url) = get("CONSULT_BASE_URL") {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(language) = get("CONSULT_LANGUAGE") {
            config.language = language.parse()?;
        }

        if let Some(timeout) = get("CONSULT_TIMEOUT_SECS") {
            let secs: u64 = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::Timeout(timeout.clone()))?;
            if secs == 0 {
                return Err(ConfigError::Timeout(timeout));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
