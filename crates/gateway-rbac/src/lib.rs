//! # Gateway RBAC
//!
//! Coarse roles and fine-grained per-plant permissions for the plant
//! configuration gateway.
//!
//! ## Overview
//!
//! Every user of an app carries exactly one [`Role`] and a map of
//! plant id → [`PlantPermission`]:
//!
//! ```text
//! Role (two axes encoded as one ordinal)
//!   LocalUser(0) < LocalAdmin(1) < GlobalUser(2) < GlobalAdmin(3)
//!
//! PlantPermission
//!   User(0) | Admin(1)
//! ```
//!
//! Both travel on the wire as JSON integers. A stored role is kept as a raw
//! [`RoleCode`] so that an unknown or malformed role in a persisted document
//! can be detected at request time instead of failing the whole load.
//!
//! ## Usage
//!
//! ```
//! use gateway_rbac::{PlantPermission, PlantPermissions, Role};
//!
//! let mut plants = PlantPermissions::new();
//! plants.insert("plant-1", PlantPermission::Admin);
//!
//! assert!(plants.requires_admin_role());
//! assert!(Role::GlobalAdmin.is_admin());
//! assert!(!Role::GlobalUser.is_admin());
//! ```

pub mod plants;
pub mod roles;

// Re-export main types for convenience
pub use plants::{PlantPermission, PlantPermissions};
pub use roles::{Role, RoleCode};
