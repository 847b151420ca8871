//! Server configuration

use gateway_auth::{AuthError, JwtConfig};
use std::net::SocketAddr;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value. Anything other than `json` is text.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `HTTP_ADDR` is not a socket address
    #[error("Invalid HTTP_ADDR '{0}'")]
    InvalidAddr(String),

    /// Token verification settings are incomplete
    #[error(transparent)]
    Jwt(#[from] AuthError),
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub http_addr: SocketAddr,
    /// Token verification
    pub jwt: JwtConfig,
    /// Log output format
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HTTP_ADDR`: listen address (default: 0.0.0.0:3000)
    /// - `LOG_FORMAT`: `json` or `text` (default: text)
    /// - `JWT_*`: see [`JwtConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(http_addr.clone()))?;

        let log_format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            http_addr,
            jwt: JwtConfig::from_env()?,
            log_format,
        })
    }
}
