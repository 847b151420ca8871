//! Service configuration for the platform clients.
//!
//! Provides centralized configuration for the directory, asset and file
//! service endpoints, the service credential and timeout/retry settings.
//! Configuration is loaded from environment variables with sensible
//! defaults for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Service configuration for all platform services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Identity directory API configuration.
    pub directory: ServiceEndpoint,

    /// Asset hierarchy API configuration.
    pub assets: ServiceEndpoint,

    /// File store API configuration.
    pub files: ServiceEndpoint,

    /// Default request timeout in seconds.
    pub default_timeout_secs: u64,

    /// Maximum retry attempts after the first failed request.
    pub max_retries: u32,
}

impl Default for ServiceConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            directory: ServiceEndpoint::local("http://localhost:4001"),
            assets: ServiceEndpoint::local("http://localhost:4002"),
            files: ServiceEndpoint::local("http://localhost:4003"),
            default_timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DIRECTORY_API_URL`: identity directory URL (default: http://localhost:4001)
    /// - `ASSET_API_URL`: asset hierarchy URL (default: http://localhost:4002)
    /// - `FILE_API_URL`: file store URL (default: http://localhost:4003)
    /// - `PLATFORM_API_TOKEN`: service credential sent to all three services
    /// - `SERVICE_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `SERVICE_MAX_RETRIES`: retries after a transient failure (default: 2)
    pub fn from_env() -> Self {
        let default = Self::default();
        let api_key = std::env::var("PLATFORM_API_TOKEN").ok();

        Self {
            directory: ServiceEndpoint {
                base_url: std::env::var("DIRECTORY_API_URL").unwrap_or(default.directory.base_url),
                api_key: api_key.clone(),
            },
            assets: ServiceEndpoint {
                base_url: std::env::var("ASSET_API_URL").unwrap_or(default.assets.base_url),
                api_key: api_key.clone(),
            },
            files: ServiceEndpoint {
                base_url: std::env::var("FILE_API_URL").unwrap_or(default.files.base_url),
                api_key,
            },
            default_timeout_secs: std::env::var("SERVICE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.default_timeout_secs),
            max_retries: std::env::var("SERVICE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }

    /// Get the default request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Retry policy derived from `max_retries`.
    pub fn retry(&self) -> RetryConfig {
        if self.max_retries == 0 {
            return RetryConfig::no_retry();
        }
        RetryConfig {
            max_attempts: self.max_retries + 1,
            ..RetryConfig::standard()
        }
    }

    /// Validate that all required configuration is present for production.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if !(self.directory.has_auth() && self.assets.has_auth() && self.files.has_auth()) {
            return Err(ConfigError::MissingEnvVar("PLATFORM_API_TOKEN".to_string()));
        }
        Ok(())
    }
}

/// Configuration for a single service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL for the service (e.g., "https://gateway.eu1.platform.io").
    pub base_url: String,

    /// Service credential sent as a bearer token.
    pub api_key: Option<String>,
}

impl ServiceEndpoint {
    fn local(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check if API key authentication is available.
    pub fn has_auth(&self) -> bool {
        self.api_key.is_some()
    }
}
