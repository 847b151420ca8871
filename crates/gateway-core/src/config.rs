//! Access configuration
//!
//! Where apps live in the asset hierarchy and which token scopes grant
//! access to them.

use gateway_tenancy::AppId;
use std::collections::{HashMap, HashSet};

/// Default scopes accepted by every app.
pub const DEFAULT_ACCEPTED_SCOPES: &[&str] = &["plantcfg.user", "plantcfg.admin"];

/// Access configuration for the registry and engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessConfig {
    /// Tenant hosting the app assets and their files
    pub host_tenant: String,

    /// Asset under which every app asset is created
    pub app_container_asset_id: String,

    /// Asset type of app assets
    pub app_asset_type: String,

    /// Scopes accepted by apps without an override
    pub accepted_scopes: HashSet<String>,

    /// Per-app accepted scopes, replacing the defaults
    pub scope_overrides: HashMap<AppId, HashSet<String>>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            host_tenant: "plantcfg".to_string(),
            app_container_asset_id: "plantcfg-apps".to_string(),
            app_asset_type: "plantcfg.PlantConfigApp".to_string(),
            accepted_scopes: DEFAULT_ACCEPTED_SCOPES.iter().map(|s| s.to_string()).collect(),
            scope_overrides: HashMap::new(),
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOST_TENANT`: tenant hosting the app assets (default: plantcfg)
    /// - `APP_CONTAINER_ASSET_ID`: parent asset of all apps (default: plantcfg-apps)
    /// - `APP_ASSET_TYPE`: asset type of apps (default: plantcfg.PlantConfigApp)
    /// - `ACCEPTED_SCOPES`: comma separated scope list
    ///   (default: plantcfg.user,plantcfg.admin)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            host_tenant: std::env::var("HOST_TENANT").unwrap_or(default.host_tenant),
            app_container_asset_id: std::env::var("APP_CONTAINER_ASSET_ID")
                .unwrap_or(default.app_container_asset_id),
            app_asset_type: std::env::var("APP_ASSET_TYPE").unwrap_or(default.app_asset_type),
            accepted_scopes: std::env::var("ACCEPTED_SCOPES")
                .ok()
                .map(|s| parse_scopes(&s))
                .filter(|scopes| !scopes.is_empty())
                .unwrap_or(default.accepted_scopes),
            scope_overrides: HashMap::new(),
        }
    }

    /// Builder: replace the accepted scopes of one app.
    pub fn with_app_scopes<I, S>(mut self, app_id: AppId, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope_overrides
            .insert(app_id, scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Accepted scopes for an app.
    pub fn scopes_for(&self, app_id: &AppId) -> HashSet<String> {
        self.scope_overrides
            .get(app_id)
            .cloned()
            .unwrap_or_else(|| self.accepted_scopes.clone())
    }
}

fn parse_scopes(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes() {
        let scopes = parse_scopes(" a.read, b.write ,,");
        assert_eq!(scopes.len(), 2);
        assert!(scopes.contains("a.read"));
        assert!(scopes.contains("b.write"));
    }

    #[test]
    fn test_scope_overrides() {
        let app = AppId::from("ten-acme");
        let config = AccessConfig::default().with_app_scopes(app.clone(), ["acme.only"]);

        assert_eq!(config.scopes_for(&app).len(), 1);
        assert!(config.scopes_for(&app).contains("acme.only"));
        assert!(config
            .scopes_for(&AppId::from("ten-other"))
            .contains("plantcfg.admin"));
    }
}
