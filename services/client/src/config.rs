//! services/client/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Selects which backend serves a call: the in-memory stand-in or the real
/// remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Mock,
    Real,
}

impl FromStr for ApiMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(ApiMode::Mock),
            "real" => Ok(ApiMode::Real),
            other => Err(ConfigError::InvalidValue(
                "API_MODE".to_string(),
                format!("'{}' is not one of 'mock' or 'real'", other),
            )),
        }
    }
}

impl std::fmt::Display for ApiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiMode::Mock => write!(f, "mock"),
            ApiMode::Real => write!(f, "real"),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: ApiMode,
    pub base_url: String,
    pub enable_api_logs: bool,
    pub log_level: Level,
    pub session_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Backend Selection ---
        let mode = std::env::var("API_MODE")
            .map(|raw| raw.parse::<ApiMode>())
            .unwrap_or(Ok(ApiMode::Mock))?;

        let base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "https://candidate-assignment.neversitup.com".to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidValue("API_BASE_URL".to_string(), e.to_string())
        })?;

        // --- Load Logging Settings ---
        let enable_api_logs = match std::env::var("API_CLIENT_LOGS") {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "API_CLIENT_LOGS".to_string(),
                    format!("'{}' is not a valid boolean", raw),
                )
            })?,
            Err(_) => false,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Session Storage Location ---
        let session_path = std::env::var("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_path());

        Ok(Self {
            mode,
            base_url,
            enable_api_logs,
            log_level,
            session_path,
        })
    }
}

/// `$HOME/.todo-client/session.json`, or a path relative to the working
/// directory when `HOME` is unset.
fn default_session_path() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".todo-client").join("session.json")
}
