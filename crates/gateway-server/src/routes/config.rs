//! `/config/user/me`: the caller's own config document

use axum::{body::Bytes, extract::State, Json};
use gateway_tenancy::UserConfigView;

use crate::error::ApiResult;
use crate::extract::Authenticated;
use crate::state::AppState;

/// Return the caller's config with its app and user ids.
pub async fn get_user_config(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> ApiResult<Json<UserConfigView>> {
    let view = state.engine().get_me(&claims).await?;
    Ok(Json(view))
}

/// Replace the caller's config.
///
/// The body is taken raw; the engine decides whether it is valid once the
/// caller is authorized.
pub async fn put_user_config(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    body: Bytes,
) -> ApiResult<Json<UserConfigView>> {
    let view = state.engine().put_me(&claims, &body).await?;
    Ok(Json(view))
}
