//! JWT claims carried by gateway bearer tokens
//!
//! Tokens are issued by the cloud platform's identity service. The gateway
//! reads the tenant (`ten`), optional subtenant, the user name and the
//! granted scopes; every other claim is preserved verbatim so it can be
//! echoed back by `GET /user/me`.

use chrono::Utc;
use gateway_tenancy::AppTarget;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Claims of a platform-issued bearer token.
///
/// # Example
///
/// ```rust
/// use gateway_auth::claims::GatewayClaims;
///
/// let claims = GatewayClaims::new("acme", "jane@acme.io", chrono::Duration::hours(1))
///     .with_scopes(["plantcfg.admin"]);
/// assert_eq!(claims.target().unwrap().app_id().as_str(), "ten-acme");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayClaims {
    /// Tenant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ten: Option<String>,

    /// Subtenant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtenant: Option<String>,

    /// Login name of the user
    pub user_name: String,

    /// Granted scopes
    #[serde(default)]
    pub scope: Vec<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Remaining claims, kept as issued
    #[serde(default, flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl GatewayClaims {
    /// Create claims for a tenant user.
    ///
    /// Used by tests and tooling; production tokens come from the platform.
    pub fn new(
        tenant: impl Into<String>,
        user_name: impl Into<String>,
        duration: chrono::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            ten: Some(tenant.into()),
            subtenant: None,
            user_name: user_name.into(),
            scope: Vec::new(),
            exp: (now + duration).timestamp(),
            iat: Some(now.timestamp()),
            iss: None,
            custom: HashMap::new(),
        }
    }

    /// Tenant claim, if present and non-empty.
    pub fn tenant(&self) -> Option<&str> {
        self.ten.as_deref().filter(|t| !t.is_empty())
    }

    /// Subtenant claim, if present and non-empty.
    pub fn subtenant(&self) -> Option<&str> {
        self.subtenant.as_deref().filter(|s| !s.is_empty())
    }

    /// The app this token targets.
    ///
    /// # Returns
    ///
    /// `None` when the token carries no tenant.
    pub fn target(&self) -> Option<AppTarget> {
        self.tenant()
            .map(|tenant| AppTarget::new(tenant, self.subtenant()))
    }

    /// Check whether any granted scope is in `accepted`.
    pub fn has_any_scope(&self, accepted: &HashSet<String>) -> bool {
        self.scope.iter().any(|s| accepted.contains(s))
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Set the subtenant.
    pub fn with_subtenant(mut self, subtenant: impl Into<String>) -> Self {
        self.subtenant = Some(subtenant.into());
        self
    }

    /// Replace the granted scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Drop the tenant claim.
    pub fn without_tenant(mut self) -> Self {
        self.ten = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_claims_target() {
        let claims = GatewayClaims::new("T", "u@t.io", Duration::hours(1)).with_subtenant("S2");
        let target = claims.target().unwrap();
        assert_eq!(target.app_id().as_str(), "ten-T-sub-S2");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_empty_tenant_has_no_target() {
        let mut claims = GatewayClaims::new("", "u@t.io", Duration::hours(1));
        assert!(claims.target().is_none());
        claims.ten = None;
        assert!(claims.target().is_none());
    }

    #[test]
    fn test_empty_subtenant_is_ignored() {
        let claims = GatewayClaims::new("T", "u@t.io", Duration::hours(1)).with_subtenant("");
        assert_eq!(claims.target().unwrap().app_id().as_str(), "ten-T");
    }

    #[test]
    fn test_scope_matching() {
        let claims =
            GatewayClaims::new("T", "u@t.io", Duration::hours(1)).with_scopes(["a.read", "b.user"]);
        let accepted: HashSet<String> = ["b.user".to_string()].into_iter().collect();
        assert!(claims.has_any_scope(&accepted));
        assert!(!claims.has_any_scope(&HashSet::new()));
    }

    #[test]
    fn test_unknown_claims_are_preserved() {
        let raw = json!({
            "ten": "T",
            "user_name": "u@t.io",
            "scope": ["x"],
            "exp": 4102444800i64,
            "zid": "T",
            "client_id": "core"
        });
        let claims: GatewayClaims = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(claims.custom.get("zid"), Some(&json!("T")));
        assert_eq!(serde_json::to_value(&claims).unwrap(), raw);
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = GatewayClaims::new("T", "u@t.io", Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 3600;
        assert!(claims.is_expired());
    }
}
