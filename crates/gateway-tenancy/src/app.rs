//! App identities
//!
//! An app is the unit of tenancy: one per tenant, or one per tenant and
//! subtenant pair. Its id is derived, never assigned.

use serde::{Deserialize, Serialize};
use std::fmt;

const TENANT_PREFIX: &str = "ten-";
const SUBTENANT_SEPARATOR: &str = "-sub-";

/// Derived app identifier (`ten-<tenant>` or `ten-<tenant>-sub-<subtenant>`).
///
/// The same string names the app's node in the asset hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Derive the app id for a tenant and optional subtenant.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_tenancy::AppId;
    ///
    /// assert_eq!(AppId::derive("T", None).as_str(), "ten-T");
    /// assert_eq!(AppId::derive("T", Some("S2")).as_str(), "ten-T-sub-S2");
    /// ```
    pub fn derive(tenant: &str, subtenant: Option<&str>) -> Self {
        match subtenant {
            Some(sub) => Self(format!("{TENANT_PREFIX}{tenant}{SUBTENANT_SEPARATOR}{sub}")),
            None => Self(format!("{TENANT_PREFIX}{tenant}")),
        }
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the tenant/subtenant pair from the id.
    ///
    /// # Returns
    ///
    /// `None` when the id does not follow the `ten-…` naming scheme or has
    /// an empty tenant or subtenant part.
    pub fn target(&self) -> Option<AppTarget> {
        let rest = self.0.strip_prefix(TENANT_PREFIX)?;
        let (tenant, subtenant) = match rest.split_once(SUBTENANT_SEPARATOR) {
            Some((tenant, sub)) => {
                if sub.is_empty() {
                    return None;
                }
                (tenant, Some(sub.to_string()))
            }
            None => (rest, None),
        };

        if tenant.is_empty() {
            return None;
        }

        Some(AppTarget {
            tenant: tenant.to_string(),
            subtenant,
        })
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The tenant (and optional subtenant) a request is aimed at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AppTarget {
    /// Tenant name
    pub tenant: String,

    /// Subtenant id, if the app is subtenant-scoped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtenant: Option<String>,
}

impl AppTarget {
    /// Create a new target.
    pub fn new(tenant: impl Into<String>, subtenant: Option<&str>) -> Self {
        Self {
            tenant: tenant.into(),
            subtenant: subtenant.map(str::to_string),
        }
    }

    /// Derive the app id of this target.
    pub fn app_id(&self) -> AppId {
        AppId::derive(&self.tenant, self.subtenant.as_deref())
    }
}
