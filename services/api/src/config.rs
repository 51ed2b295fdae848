//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use course_calendar_core::CalendarZone;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Origin of the content backend, e.g. `https://lms.example.com`.
    /// Relative file paths are resolved against it too.
    pub content_api_origin: String,
    pub calendar_zone: CalendarZone,
    pub cors_origin: String,
    pub log_level: Level,
    pub upstream_timeout: Duration,
    /// Most viewers whose toggles are held in memory at once.
    pub max_viewers: usize,
    pub viewer_idle_timeout: Duration,
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
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Load Upstream Settings ---
        let content_api_origin = lookup("CONTENT_API_ORIGIN")
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("CONTENT_API_ORIGIN".to_string()))?;
        if !content_api_origin.starts_with("http://") && !content_api_origin.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "CONTENT_API_ORIGIN".to_string(),
                format!("'{}' must start with http:// or https://", content_api_origin),
            ));
        }

        let timeout_str = lookup("UPSTREAM_TIMEOUT_SECS").unwrap_or_else(|| "15".to_string());
        let upstream_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "UPSTREAM_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        // --- Load View State Settings ---
        let max_viewers_str = lookup("VIEW_STATE_MAX_VIEWERS").unwrap_or_else(|| "10000".to_string());
        let max_viewers = max_viewers_str
            .parse::<usize>()
            .ok()
            .filter(|max| *max > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "VIEW_STATE_MAX_VIEWERS".to_string(),
                    format!("'{}' is not a positive number", max_viewers_str),
                )
            })?;

        let idle_str = lookup("VIEW_STATE_IDLE_SECS").unwrap_or_else(|| "3600".to_string());
        let viewer_idle_timeout = idle_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "VIEW_STATE_IDLE_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", idle_str),
                )
            })?;

        // --- Load Calendar Settings ---
        let calendar_zone = lookup("CALENDAR_UTC_OFFSET")
            .unwrap_or_else(|| "+00:00".to_string())
            .parse::<CalendarZone>()
            .map_err(|e| ConfigError::InvalidValue("CALENDAR_UTC_OFFSET".to_string(), e.to_string()))?;

        Ok(Self {
            bind_address,
            content_api_origin,
            calendar_zone,
            cors_origin,
            log_level,
            upstream_timeout,
            max_viewers,
            viewer_idle_timeout,
        })
    }
}
