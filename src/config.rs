// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API root used for local development.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the ordering API (no trailing slash)
    pub api_base_url: String,
    /// Timeout for ordinary calls
    pub request_timeout: Duration,
    /// Timeout for payload-heavy calls
    pub upload_timeout: Duration,
    /// Where the file-backed key-value store lives
    pub storage_path: PathBuf,
    /// Human-readable device name sent at registration
    pub device_name: String,
    /// Push token to report, if the platform provisioned one
    pub push_token: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
            storage_path: PathBuf::from("client_store.json"),
            device_name: "Mobile Device".to_string(),
            push_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            request_timeout: secs_var("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            upload_timeout: secs_var("UPLOAD_TIMEOUT_SECS")?.unwrap_or(defaults.upload_timeout),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            device_name: env::var("DEVICE_NAME").unwrap_or(defaults.device_name),
            push_token: env::var("PUSH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn secs_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("API_BASE_URL", "https://api.example.com/api/");
        env::set_var("REQUEST_TIMEOUT_SECS", "12");
        env::remove_var("UPLOAD_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
        assert_eq!(config.upload_timeout, Duration::from_secs(60));

        env::set_var("REQUEST_TIMEOUT_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("REQUEST_TIMEOUT_SECS", _)));

        env::remove_var("REQUEST_TIMEOUT_SECS");
        env::remove_var("API_BASE_URL");
    }
}
