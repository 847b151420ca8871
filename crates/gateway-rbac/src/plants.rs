//! # Plant permissions
//!
//! Per-plant access levels and the map that assigns them to plant ids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::roles::Role;

/// Access level a user holds on a single plant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum PlantPermission {
    /// Read and edit own plant data
    User = 0,

    /// Administer the plant
    Admin = 1,
}

impl PlantPermission {
    /// Check if this permission grants plant administration.
    pub fn is_admin(&self) -> bool {
        matches!(self, PlantPermission::Admin)
    }

    /// Get the wire ordinal.
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }

    /// Parse from the wire ordinal.
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::User),
            1 => Some(Self::Admin),
            _ => None,
        }
    }
}

impl TryFrom<i64> for PlantPermission {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_ordinal(value)
            .ok_or_else(|| format!("invalid plant permission ordinal: {}", value))
    }
}

impl From<PlantPermission> for i64 {
    fn from(permission: PlantPermission) -> Self {
        permission.ordinal()
    }
}

/// Plant id → permission map of a single user.
///
/// Ordered by plant id so that serialization is stable.
///
/// # Example
///
/// ```
/// use gateway_rbac::{PlantPermission, PlantPermissions, Role};
///
/// let mut plants = PlantPermissions::new();
/// plants.insert("p1", PlantPermission::User);
/// plants.insert("p2", PlantPermission::Admin);
///
/// assert_eq!(plants.len(), 2);
/// assert!(plants.allows_role(Role::LocalAdmin));
/// assert!(!plants.allows_role(Role::GlobalUser));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PlantPermissions {
    plants: BTreeMap<String, PlantPermission>,
}

impl PlantPermissions {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            plants: BTreeMap::new(),
        }
    }

    /// Assign a permission to a plant, replacing any previous one.
    pub fn insert(&mut self, plant_id: impl Into<String>, permission: PlantPermission) {
        self.plants.insert(plant_id.into(), permission);
    }

    /// Builder variant of [`insert`](Self::insert).
    pub fn with(mut self, plant_id: impl Into<String>, permission: PlantPermission) -> Self {
        self.insert(plant_id, permission);
        self
    }

    /// Permission for one plant.
    pub fn get(&self, plant_id: &str) -> Option<PlantPermission> {
        self.plants.get(plant_id).copied()
    }

    /// Sorted set of plant ids.
    pub fn plant_ids(&self) -> BTreeSet<&str> {
        self.plants.keys().map(String::as_str).collect()
    }

    /// Check whether any plant grants `Admin`.
    pub fn requires_admin_role(&self) -> bool {
        self.plants.values().any(PlantPermission::is_admin)
    }

    /// Check the role/plant rule: an `Admin` plant permission needs an
    /// admin role.
    pub fn allows_role(&self, role: Role) -> bool {
        !self.requires_admin_role() || role.is_admin()
    }

    /// Number of plants.
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Check if no plant is assigned.
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Iterate over (plant id, permission) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PlantPermission)> {
        self.plants.iter().map(|(id, p)| (id.as_str(), *p))
    }
}

impl FromIterator<(String, PlantPermission)> for PlantPermissions {
    fn from_iter<I: IntoIterator<Item = (String, PlantPermission)>>(iter: I) -> Self {
        Self {
            plants: iter.into_iter().collect(),
        }
    }
}
