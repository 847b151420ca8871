//! Error types shared by all platform service clients.

use thiserror::Error;

/// Platform client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication with the platform failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Service could not be reached or refused to serve.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Base URL cannot carry path segments.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Check whether retrying the same request may succeed.
    ///
    /// Transport failures and 5xx responses are retryable; everything else
    /// is returned immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::ApiError { status, .. } => *status >= 500,
            ClientError::Unavailable(_) => true,
            ClientError::InvalidResponse(_)
            | ClientError::InvalidUrl(_)
            | ClientError::NotFound(_)
            | ClientError::AuthenticationFailed => false,
        }
    }
}
