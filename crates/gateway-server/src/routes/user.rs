//! `/user/me`: decoded token claims

use axum::{extract::State, Json};
use gateway_auth::GatewayClaims;

use crate::error::ApiResult;
use crate::extract::Authenticated;
use crate::state::AppState;

/// Echo the caller's claims once the app and scope checks pass.
pub async fn get_me(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> ApiResult<Json<GatewayClaims>> {
    state.engine().authorize_app(&claims).await?;
    Ok(Json(claims))
}
