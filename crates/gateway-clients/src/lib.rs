//! # Gateway Clients
//!
//! Query façades over the three remote platform services the gateway
//! depends on.
//!
//! ## Overview
//!
//! - **Identity directory**: find users by tenant, subtenant, group and user name
//! - **Asset hierarchy**: list assets under a parent by type and name
//! - **Config file store**: list, check, read and write JSON files keyed by
//!   (tenant, asset id, file name)
//!
//! Each service is a trait ([`IdentityDirectory`], [`AssetHierarchy`],
//! [`ConfigFileStore`]) with two implementations:
//!
//! - an HTTP client built on `reqwest` that retries transient failures with
//!   exponential backoff ([`retry`])
//! - an in-memory implementation (feature `memory`, on by default) with call
//!   counters and failure injection, for tests and local development
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gateway_clients::{DirectoryClient, IdentityDirectory, ServiceConfig, UserQuery};
//!
//! async fn lookup() -> Result<(), gateway_clients::ClientError> {
//!     let config = ServiceConfig::from_env();
//!     let directory = DirectoryClient::new(config.directory.clone(), config.timeout(), config.retry())?;
//!
//!     let users = directory
//!         .find_users(&UserQuery::new("acme").with_user_name("jane@acme.io"))
//!         .await?;
//!     println!("found {} users", users.len());
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod retry;

// Re-export main types
pub use clients::assets::{AssetClient, AssetHierarchy, AssetQuery, AssetRecord};
pub use clients::config::{ServiceConfig, ServiceEndpoint};
pub use clients::directory::{DirectoryClient, IdentityDirectory, UserQuery, UserRecord};
pub use clients::files::{ConfigFileStore, FileStoreClient};
pub use error::{ClientError, ClientResult};
pub use retry::{with_retry, with_retry_if, RetryConfig};

#[cfg(feature = "memory")]
pub use memory::{MemoryAssetTree, MemoryDirectory, MemoryFileStore};
