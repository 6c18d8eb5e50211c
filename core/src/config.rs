//! Client configuration.
//!
//! The only runtime setting is the API origin, read from
//! `TODO_API_BASE_URL`. Store timings live in `SyncConfig` and are fixed at
//! compile time.

use std::time::Duration;

use thiserror::Error;

pub const BASE_URL_ENV: &str = "TODO_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,
    #[error("base URL `{0}` must start with http:// or https://")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(base_url));
        }
        Ok(Self { base_url })
    }

    /// Reads `TODO_API_BASE_URL`, falling back to `http://localhost:3000`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Timing knobs for the synchronization store and toast layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet interval a search string must stay unchanged before it is fetched.
    pub search_debounce: Duration,
    /// How long a toast stays visible.
    pub toast_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            toast_ttl: Duration::from_secs(4),
        }
    }
}
