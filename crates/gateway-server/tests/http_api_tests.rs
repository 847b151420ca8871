//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use gateway_auth::{GatewayClaims, TokenService};
use gateway_clients::{
    AssetRecord, MemoryAssetTree, MemoryDirectory, MemoryFileStore, UserRecord,
};
use gateway_core::{AccessConfig, AppRegistry, AuthorizationEngine};
use gateway_server::{build_router, AppState};
use gateway_tenancy::MAIN_CONFIG_FILE;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret-with-at-least-32-chars";
const APP_ASSET: &str = "asset-t-s2";

struct TestApp {
    router: Router,
    tokens: TokenService,
    files: MemoryFileStore,
    host: String,
}

fn u1_document() -> Value {
    json!({
        "data": {"P1": {"line": "A"}},
        "config": {"P1": {"alarmThreshold": 80}},
        "permissions": {"role": 3, "plants": {"P1": 1}},
        "userName": "u1@t.io"
    })
}

async fn test_app() -> TestApp {
    let config = AccessConfig::default();
    let host = config.host_tenant.clone();
    let assets = MemoryAssetTree::new();
    let files = MemoryFileStore::new();
    let directory = MemoryDirectory::new();

    assets
        .add_asset(
            &host,
            AssetRecord::new(
                APP_ASSET,
                "ten-T-sub-S2",
                &config.app_asset_type,
                &config.app_container_asset_id,
            ),
        )
        .await;
    files
        .put_file(
            &host,
            APP_ASSET,
            MAIN_CONFIG_FILE,
            json!({"data": {}, "config": {}, "maxNumberOfUsers": 5}),
        )
        .await;
    files
        .put_file(&host, APP_ASSET, "U1.user.config.json", u1_document())
        .await;
    directory
        .add_user("T", UserRecord::new("U1", "u1@t.io").in_subtenant("S2"))
        .await;

    let registry = Arc::new(AppRegistry::new(
        config,
        Arc::new(assets),
        Arc::new(files.clone()),
    ));
    registry.initialize().await.unwrap();

    let engine = AuthorizationEngine::new(registry, Arc::new(directory));
    let router = build_router(AppState::new(
        engine,
        TokenService::with_secret(SECRET).unwrap(),
    ));

    TestApp {
        router,
        tokens: TokenService::with_secret(SECRET).unwrap(),
        files,
        host,
    }
}

fn u1_claims() -> GatewayClaims {
    GatewayClaims::new("T", "u1@t.io", chrono::Duration::hours(1))
        .with_subtenant("S2")
        .with_scopes(["plantcfg.admin"])
}

impl TestApp {
    fn token(&self, claims: &GatewayClaims) -> String {
        self.tokens.encode_claims(claims).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: impl Into<Body>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(body.into()).unwrap()).await
    }
}

fn error(code: u16, message: &str) -> Value {
    json!({"code": code, "message": message})
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = test_app().await;

    let (status, body) = app.get("/config/user/me", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. No token provided!"));
}

#[tokio::test]
async fn test_invalid_token_is_401() {
    let app = test_app().await;

    let (status, body) = app.get("/config/user/me", Some("not.a.jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. Invalid token provided!"));
}

#[tokio::test]
async fn test_token_signed_with_other_key_is_401() {
    let app = test_app().await;
    let foreign = TokenService::with_secret("another-secret-that-is-also-long-enough")
        .unwrap()
        .encode_claims(&u1_claims())
        .unwrap();

    let (status, body) = app.get("/user/me", Some(&foreign)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. Invalid token provided!"));
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = test_app().await;
    let claims = GatewayClaims::new("T", "u1@t.io", chrono::Duration::hours(-2))
        .with_subtenant("S2")
        .with_scopes(["plantcfg.admin"]);
    let token = app.token(&claims);

    let (status, body) = app.get("/config/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. Invalid token provided!"));
}

#[tokio::test]
async fn test_non_bearer_scheme_is_missing_token() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/config/user/me")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. No token provided!"));
}

// ============================================================================
// GET /config/user/me
// ============================================================================

#[tokio::test]
async fn test_get_config_returns_document_with_ids() {
    let app = test_app().await;
    let token = app.token(&u1_claims());

    let (status, body) = app.get("/config/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let mut expected = u1_document();
    expected["appId"] = json!("ten-T-sub-S2");
    expected["userId"] = json!("U1");
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_get_config_without_accepted_scope_is_403() {
    let app = test_app().await;
    let token = app.token(&u1_claims().with_scopes(["other.scope"]));

    let (status, body) = app.get("/config/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        error(403, "Forbidden access. No scope found to access this app!")
    );
}

#[tokio::test]
async fn test_get_config_without_tenant_is_403() {
    let app = test_app().await;
    let token = app.token(&u1_claims().without_tenant());

    let (status, body) = app.get("/config/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, error(403, "Access denied. Invalid application id!"));
}

#[tokio::test]
async fn test_get_config_for_unknown_user_is_403() {
    let app = test_app().await;
    let token = app.token(
        &GatewayClaims::new("T", "ghost@t.io", chrono::Duration::hours(1))
            .with_subtenant("S2")
            .with_scopes(["plantcfg.user"]),
    );

    let (status, body) = app.get("/config/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        error(403, "Access denied. User does not exist in the tenant!")
    );
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let app = test_app().await;
    app.files.set_failing_writes(true);
    let token = app.token(&u1_claims());
    let mut update = u1_document();
    update["data"]["P1"] = json!({"line": "B"});

    let (status, body) = app
        .put("/config/user/me", Some(&token), serde_json::to_vec(&update).unwrap())
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, error(500, "Ups.. Something fails.."));
}

// ============================================================================
// PUT /config/user/me
// ============================================================================

#[tokio::test]
async fn test_put_config_stores_and_echoes() {
    let app = test_app().await;
    let token = app.token(&u1_claims());
    let mut update = u1_document();
    update["data"]["P1"] = json!({"line": "B", "shifts": 2});

    let (status, body) = app
        .put("/config/user/me", Some(&token), serde_json::to_vec(&update).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["P1"]["line"], "B");
    assert_eq!(body["appId"], "ten-T-sub-S2");
    assert_eq!(body["userId"], "U1");

    let stored = app
        .files
        .file(&app.host, APP_ASSET, "U1.user.config.json")
        .await
        .unwrap();
    assert_eq!(stored, update);

    let (_, read_back) = app.get("/config/user/me", Some(&token)).await;
    assert_eq!(read_back["data"]["P1"]["shifts"], 2);
}

#[tokio::test]
async fn test_put_config_rejects_role_change() {
    let app = test_app().await;
    let token = app.token(&u1_claims());
    let mut update = u1_document();
    update["permissions"]["role"] = json!(2);

    let (status, body) = app
        .put("/config/user/me", Some(&token), serde_json::to_vec(&update).unwrap())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error(400, "Users role cannot be modified!"));
}

#[tokio::test]
async fn test_put_config_rejects_non_json_body() {
    let app = test_app().await;
    let token = app.token(&u1_claims());

    let (status, body) = app.put("/config/user/me", Some(&token), "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error(400, "\"value\" must be valid JSON"));
}

#[tokio::test]
async fn test_put_config_checks_token_before_body() {
    let app = test_app().await;

    let (status, body) = app.put("/config/user/me", None, "{not json").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, error(401, "Access denied. No token provided!"));
}

// ============================================================================
// GET /user/me and /health
// ============================================================================

#[tokio::test]
async fn test_user_me_returns_raw_claims() {
    let app = test_app().await;
    let mut claims = u1_claims();
    claims.custom.insert("email".to_string(), json!("u1@t.io"));
    let token = app.token(&claims);

    let (status, body) = app.get("/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ten"], "T");
    assert_eq!(body["subtenant"], "S2");
    assert_eq!(body["email"], "u1@t.io");
    assert_eq!(body["scope"], json!(["plantcfg.admin"]));
}

#[tokio::test]
async fn test_user_me_requires_known_app() {
    let app = test_app().await;
    let token = app.token(&u1_claims().with_subtenant("S9"));

    let (status, body) = app.get("/user/me", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, error(403, "Access denied. Application of given id not found for the user!"));
}

#[tokio::test]
async fn test_health_reports_app_count() {
    let app = test_app().await;

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "apps": 1}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app().await;

    let (status, _) = app.get("/config/user/other", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
