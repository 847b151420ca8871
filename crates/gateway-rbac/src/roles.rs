//! User roles
//!
//! A role combines two axes (local/global scope and user/admin privilege)
//! into a single ordinal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User role within an app.
///
/// The ordinal order is: LocalUser < LocalAdmin < GlobalUser < GlobalAdmin.
/// Note that admin privilege is not monotonic in the ordinal:
/// `GlobalUser` ranks above `LocalAdmin` but is not an admin.
///
/// # Examples
///
/// ```
/// use gateway_rbac::Role;
///
/// assert!(Role::LocalAdmin.is_admin());
/// assert!(!Role::GlobalUser.is_admin());
/// assert_eq!(Role::from_ordinal(3), Some(Role::GlobalAdmin));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    /// Plain user restricted to assigned plants
    LocalUser = 0,

    /// Administrator of assigned plants
    LocalAdmin = 1,

    /// User with visibility over every plant of the app
    GlobalUser = 2,

    /// Administrator of the whole app
    GlobalAdmin = 3,
}

impl Role {
    /// All roles in ordinal order.
    pub const ALL: [Role; 4] = [
        Role::LocalUser,
        Role::LocalAdmin,
        Role::GlobalUser,
        Role::GlobalAdmin,
    ];

    /// Check if this role carries admin privilege.
    ///
    /// # Returns
    ///
    /// `true` for LocalAdmin and GlobalAdmin
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::LocalAdmin | Role::GlobalAdmin)
    }

    /// Get the wire ordinal of the role.
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }

    /// Parse a role from its wire ordinal.
    ///
    /// # Returns
    ///
    /// `Some(Role)` for 0..=3, `None` otherwise
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::LocalUser),
            1 => Some(Self::LocalAdmin),
            2 => Some(Self::GlobalUser),
            3 => Some(Self::GlobalAdmin),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or_else(|| format!("invalid role ordinal: {}", value))
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.ordinal()
    }
}

/// Role as persisted in a user config document.
///
/// Stored documents are written by other tools too, so the stored value is
/// kept verbatim, whatever its JSON shape, and only interpreted when a
/// request needs it. A missing role is kept as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RoleCode(pub Value);

impl RoleCode {
    /// Interpret the stored value as a [`Role`].
    ///
    /// # Returns
    ///
    /// `None` unless the value is an integer ordinal of a known role.
    pub fn role(&self) -> Option<Role> {
        self.0.as_i64().and_then(Role::from_ordinal)
    }
}

impl From<Role> for RoleCode {
    fn from(role: Role) -> Self {
        RoleCode(Value::from(role.ordinal()))
    }
}
