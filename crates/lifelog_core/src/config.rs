//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Read API, storage, fetch and logging settings from environment variables.
//! - Reject a missing credential before any network or storage work starts.
//!
//! # Invariants
//! - The API key never appears in `Debug` output.

use crate::api::DEFAULT_BASE_URL;
use crate::db::StorageLocation;
use crate::service::lifelog_service::{FetchOptions, DEFAULT_MAX_ITEMS};
use std::fmt::{Debug, Formatter};

pub const ENV_API_KEY: &str = "LIMITLESS_API_KEY";
pub const ENV_API_BASE_URL: &str = "LIMITLESS_API_BASE_URL";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
pub const ENV_FETCH_LIMIT: &str = "LIFELOG_FETCH_LIMIT";
pub const ENV_STARRED_ONLY: &str = "LIFELOG_STARRED_ONLY";
pub const ENV_TIMEZONE: &str = "LIFELOG_TIMEZONE";
pub const ENV_LOG_LEVEL: &str = "LIFELOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LIFELOG_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("LIMITLESS_API_KEY is required")]
    MissingApiKey,
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Fully resolved runtime settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub storage: StorageLocation,
    pub fetch: FetchOptions,
    /// `None` selects the build-mode default.
    pub log_level: Option<String>,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = read(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let base_url = read(ENV_API_BASE_URL)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let storage = read(ENV_DATABASE_PATH)
            .map(|value| StorageLocation::parse(&value))
            .unwrap_or_default();

        let max_items = match read(ENV_FETCH_LIMIT) {
            Some(value) => value.parse::<usize>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_FETCH_LIMIT,
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => DEFAULT_MAX_ITEMS,
        };
        let is_starred = read(ENV_STARRED_ONLY)
            .map(|value| parse_bool(ENV_STARRED_ONLY, &value))
            .transpose()?
            .filter(|starred| *starred);

        let fetch = FetchOptions {
            timezone: read(ENV_TIMEZONE),
            is_starred,
            max_items,
            ..FetchOptions::default()
        };

        Ok(Self {
            api_key,
            base_url,
            storage,
            fetch,
            log_level: read(ENV_LOG_LEVEL),
            log_dir: read(ENV_LOG_DIR),
        })
    }
}

impl Debug for AppConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("storage", &self.storage)
            .field("fetch", &self.fetch)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true|false".to_string(),
        }),
    }
}
