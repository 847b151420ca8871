//! Per-user configuration documents
//!
//! Each user of an app owns one document holding plant-scoped data,
//! plant-scoped configuration and the user's permissions. The top-level keys
//! of `data`, `config` and `permissions.plants` are plant ids and must agree.

use gateway_rbac::{PlantPermission, PlantPermissions, Role, RoleCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::app::AppId;

/// Suffix of user config files inside an app's storage.
pub const USER_CONFIG_SUFFIX: &str = ".user.config.json";

/// Storage file name for a user's config document.
///
/// # Examples
///
/// ```
/// use gateway_tenancy::user_config_file_name;
///
/// assert_eq!(user_config_file_name("u-1"), "u-1.user.config.json");
/// ```
pub fn user_config_file_name(user_id: &str) -> String {
    format!("{user_id}{USER_CONFIG_SUFFIX}")
}

/// Extract the user id from a storage file name.
///
/// # Returns
///
/// `None` for files that are not user config files (including a bare
/// suffix with an empty user id).
pub fn user_id_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(USER_CONFIG_SUFFIX)
        .filter(|id| !id.is_empty())
}

/// Role and plant permissions of a user.
///
/// Decoding never fails on the role or on a plant level: whatever is stored
/// is kept, and [`role`](Self::role) reports `None` when it is unusable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "StoredPermissions")]
pub struct UserPermissions {
    /// Role as stored
    pub role: RoleCode,

    /// Plant id → permission
    pub plants: PlantPermissions,

    /// False when a stored plant level is not a known permission
    #[serde(skip)]
    plants_readable: bool,
}

impl UserPermissions {
    pub fn new(role: impl Into<RoleCode>, plants: PlantPermissions) -> Self {
        Self {
            role: role.into(),
            plants,
            plants_readable: true,
        }
    }

    /// Interpret the stored permissions.
    ///
    /// # Returns
    ///
    /// `None` when the stored role is not a known role, or when a stored
    /// plant level could not be read.
    pub fn role(&self) -> Option<Role> {
        if !self.plants_readable {
            return None;
        }
        self.role.role()
    }
}

impl Default for UserPermissions {
    fn default() -> Self {
        Self::new(RoleCode::default(), PlantPermissions::new())
    }
}

/// Wire shape of stored permissions, before interpretation.
#[derive(Deserialize)]
struct StoredPermissions {
    #[serde(default)]
    role: RoleCode,
    #[serde(default)]
    plants: Value,
}

impl From<StoredPermissions> for UserPermissions {
    fn from(stored: StoredPermissions) -> Self {
        let mut plants = PlantPermissions::new();
        let mut plants_readable = true;

        match stored.plants {
            Value::Null => {}
            Value::Object(levels) => {
                for (plant_id, level) in levels {
                    match level.as_i64().and_then(PlantPermission::from_ordinal) {
                        Some(permission) => plants.insert(plant_id, permission),
                        None => plants_readable = false,
                    }
                }
            }
            _ => plants_readable = false,
        }

        Self {
            role: stored.role,
            plants,
            plants_readable,
        }
    }
}

/// A user's configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigDocument {
    /// Plant id → arbitrary plant data
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Plant id → arbitrary plant configuration
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Role and plant permissions
    #[serde(default)]
    pub permissions: UserPermissions,

    /// Login name of the user (e-mail shaped)
    pub user_name: String,
}

impl UserConfigDocument {
    /// Create a document with empty data and config.
    pub fn new(user_name: impl Into<String>, role: Role, plants: PlantPermissions) -> Self {
        Self {
            data: Map::new(),
            config: Map::new(),
            permissions: UserPermissions::new(role, plants),
            user_name: user_name.into(),
        }
    }

    /// Builder: set the data entry for a plant.
    pub fn with_data(mut self, plant_id: impl Into<String>, value: Value) -> Self {
        self.data.insert(plant_id.into(), value);
        self
    }

    /// Builder: set the config entry for a plant.
    pub fn with_config(mut self, plant_id: impl Into<String>, value: Value) -> Self {
        self.config.insert(plant_id.into(), value);
        self
    }

    /// Interpret the stored role.
    ///
    /// # Returns
    ///
    /// `None` when the stored permissions are unusable.
    pub fn role(&self) -> Option<Role> {
        self.permissions.role()
    }

    /// Plant ids referenced by `data`.
    pub fn data_plant_ids(&self) -> BTreeSet<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    /// Plant ids referenced by `config`.
    pub fn config_plant_ids(&self) -> BTreeSet<&str> {
        self.config.keys().map(String::as_str).collect()
    }

    /// Plant ids referenced by `permissions.plants`.
    pub fn permission_plant_ids(&self) -> BTreeSet<&str> {
        self.permissions.plants.plant_ids()
    }
}

/// A user config document as returned to the caller, tagged with the app
/// and user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigView {
    /// The document itself
    #[serde(flatten)]
    pub document: UserConfigDocument,

    /// App the document belongs to
    pub app_id: AppId,

    /// Owner of the document
    pub user_id: String,
}

impl UserConfigView {
    /// Tag a document with its app and user.
    pub fn new(document: UserConfigDocument, app_id: AppId, user_id: impl Into<String>) -> Self {
        Self {
            document,
            app_id,
            user_id: user_id.into(),
        }
    }
}
