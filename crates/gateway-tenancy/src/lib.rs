//! # Gateway Tenancy
//!
//! Multi-tenant app identities and the JSON documents the gateway serves.
//!
//! ## Overview
//!
//! - **Apps**: one logical app per tenant or tenant+subtenant combination,
//!   identified by a derived [`AppId`]
//! - **Main app config**: app-wide settings stored as `main.app.config.json`
//! - **User config documents**: per-user plant data, plant config and
//!   permissions stored as `<userId>.user.config.json`
//!
//! ## Architecture
//!
//! ```text
//! AppTarget (tenant, subtenant?)
//!   └─ AppId  "ten-<tenant>" | "ten-<tenant>-sub-<subtenant>"
//!        ├─ MainAppConfig
//!        └─ UserConfigDocument (one per user id)
//!              ├─ data    { plantId: any }
//!              ├─ config  { plantId: any }
//!              ├─ permissions { role, plants { plantId: 0|1 } }
//!              └─ userName
//! ```
//!
//! ## Usage
//!
//! ```
//! use gateway_tenancy::{AppId, AppTarget};
//!
//! let target = AppTarget::new("acme", Some("plant-east"));
//! assert_eq!(target.app_id().as_str(), "ten-acme-sub-plant-east");
//!
//! let parsed = AppId::from("ten-acme").target().unwrap();
//! assert_eq!(parsed.tenant, "acme");
//! assert!(parsed.subtenant.is_none());
//! ```

pub mod app;
pub mod app_config;
pub mod user_config;

// Re-export main types for convenience
pub use app::{AppId, AppTarget};
pub use app_config::{MainAppConfig, MAIN_CONFIG_FILE};
pub use user_config::{
    user_config_file_name, user_id_from_file_name, UserConfigDocument, UserConfigView,
    UserPermissions, USER_CONFIG_SUFFIX,
};
