//! Error types for token handling
//!
//! Every failure in this crate is an authentication failure and surfaces to
//! callers as a 401 with a fixed message.

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// JWT token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// JWT token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Rejected tokens are routine and are not logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingToken | AuthError::TokenExpired | AuthError::InvalidToken(_) => 401,
            AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Fixed message returned to the caller.
    ///
    /// Token details never leak into responses.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Access denied. No token provided!",
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                "Access denied. Invalid token provided!"
            }
            AuthError::ConfigError(_) | AuthError::Internal(_) => "Ups.. Something fails..",
        }
    }
}
