//! # Gateway Server
//!
//! HTTP surface of the plant configuration gateway.
//!
//! | Route                  | Handler                                   |
//! |------------------------|-------------------------------------------|
//! | `GET /config/user/me`  | [`routes::config::get_user_config`]       |
//! | `PUT /config/user/me`  | [`routes::config::put_user_config`]       |
//! | `GET /user/me`         | [`routes::user::get_me`]                  |
//! | `GET /health`          | [`routes::health::health`]                |
//!
//! Failures are returned as `{ "code": <status>, "message": <text> }`.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use extract::Authenticated;
pub use state::AppState;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Build the router with every route and the request trace layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/config/user/me",
            get(routes::config::get_user_config).put(routes::config::put_user_config),
        )
        .route("/user/me", get(routes::user::get_me))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
