//! HTTP error mapping
//!
//! Every failure leaves the server as `{ "code": <status>, "message": <text> }`
//! with the fixed caller-facing message of the underlying error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_auth::AuthError;
use gateway_core::GatewayError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token missing or rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authorization, validation or internal failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// HTTP status code
    pub code: u16,
    /// Caller-facing message
    pub message: String,
}

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String, bool) {
        match self {
            ApiError::Auth(e) => (
                e.status_code(),
                e.error_code(),
                e.public_message().to_string(),
                e.is_server_error(),
            ),
            ApiError::Gateway(e) => (
                e.status_code(),
                e.error_code(),
                e.message(),
                e.is_server_error(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error_code, message, server_error) = self.parts();

        if server_error {
            tracing::error!(code, error_code, error = %self, "Request failed");
        } else {
            tracing::debug!(code, error_code, "Request rejected");
        }

        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::PlantSection;

    fn parts(error: ApiError) -> (u16, String) {
        let (code, _, message, _) = error.parts();
        (code, message)
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        assert_eq!(
            parts(AuthError::MissingToken.into()),
            (401, "Access denied. No token provided!".to_string())
        );
        assert_eq!(
            parts(AuthError::TokenExpired.into()),
            (401, "Access denied. Invalid token provided!".to_string())
        );
    }

    #[test]
    fn test_gateway_errors_keep_their_status() {
        assert_eq!(
            parts(GatewayError::NoScope.into()),
            (403, "Forbidden access. No scope found to access this app!".to_string())
        );
        assert_eq!(
            parts(GatewayError::PlantIdMismatch(PlantSection::Config).into()),
            (400, "Plant ids in config and permissions do not match!".to_string())
        );
    }

    #[test]
    fn test_internal_errors_are_generic() {
        assert_eq!(
            parts(GatewayError::Internal("store down".into()).into()),
            (500, "Ups.. Something fails..".to_string())
        );
        assert_eq!(
            parts(AuthError::ConfigError("no key".into()).into()),
            (500, "Ups.. Something fails..".to_string())
        );
    }
}
