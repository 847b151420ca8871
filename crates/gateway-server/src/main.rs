use anyhow::Result;
use gateway_auth::TokenService;
use gateway_clients::{AssetClient, DirectoryClient, FileStoreClient, ServiceConfig};
use gateway_core::{AccessConfig, AppRegistry, AuthorizationEngine};
use gateway_server::{build_router, telemetry, AppState, ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;
    telemetry::init(config.log_format);

    info!("Starting plant configuration gateway");

    let services = ServiceConfig::from_env();
    if let Err(e) = services.validate_for_production() {
        warn!(error = %e, "Platform service configuration incomplete");
    }
    let timeout = services.timeout();
    let retry = services.retry();

    let directory = DirectoryClient::new(services.directory.clone(), timeout, retry.clone())?;
    let assets = AssetClient::new(services.assets.clone(), timeout, retry.clone())?;
    let files = FileStoreClient::new(services.files.clone(), timeout, retry)?;

    let registry = Arc::new(AppRegistry::new(
        AccessConfig::from_env(),
        Arc::new(assets),
        Arc::new(files),
    ));
    let apps = registry.initialize().await?;
    info!(apps, "App registry initialized");

    let engine = AuthorizationEngine::new(registry, Arc::new(directory));
    let tokens = TokenService::new(config.jwt.clone())?;
    let app = build_router(AppState::new(engine, tokens));

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
