//! Bearer token extraction
//!
//! Handlers take [`Authenticated`] to require a verified token. Extraction
//! runs before the body is read, so a bad token wins over a bad payload.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use gateway_auth::{bearer_token, AuthError, GatewayClaims};

use crate::error::ApiError;
use crate::state::AppState;

/// Verified claims of the calling token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub GatewayClaims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| AuthError::InvalidToken("Non-ASCII authorization header".into()))
            })
            .transpose()?;

        let token = bearer_token(header)?;
        let claims = state.tokens().validate_token(token)?;

        tracing::debug!(user = %claims.user_name, "Token verified");
        Ok(Authenticated(claims))
    }
}
