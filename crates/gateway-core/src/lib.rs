//! # Gateway Core
//!
//! Application resolution and authorization for the plant configuration
//! gateway.
//!
//! ## Overview
//!
//! - [`AppRegistry`]: every known app (tenant or tenant/subtenant pair),
//!   built from the asset hierarchy at startup and extended on demand
//! - [`UserConfigCache`]: per-app write-through cache of user config documents
//! - [`AuthorizationEngine`]: resolves a token into an app and a user, then
//!   serves or validates and stores that user's config
//! - [`validation`]: payload rules for config updates
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gateway_clients::{MemoryAssetTree, MemoryDirectory, MemoryFileStore};
//! use gateway_core::{AccessConfig, AppRegistry, AuthorizationEngine};
//! use std::sync::Arc;
//!
//! async fn build() -> Result<AuthorizationEngine, gateway_clients::ClientError> {
//!     let registry = Arc::new(AppRegistry::new(
//!         AccessConfig::from_env(),
//!         Arc::new(MemoryAssetTree::new()),
//!         Arc::new(MemoryFileStore::new()),
//!     ));
//!     registry.initialize().await?;
//!
//!     Ok(AuthorizationEngine::new(registry, Arc::new(MemoryDirectory::new())))
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod user_cache;
pub mod validation;

pub use config::AccessConfig;
pub use engine::{AuthorizationEngine, ResolvedIdentity};
pub use error::{GatewayError, GatewayResult, PlantSection, INTERNAL_MESSAGE};
pub use registry::{App, AppRegistry};
pub use user_cache::UserConfigCache;
