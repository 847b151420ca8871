//! Main app configuration
//!
//! App-wide settings shared by every user of an app.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of the main app configuration inside an app's storage.
pub const MAIN_CONFIG_FILE: &str = "main.app.config.json";

/// App-wide settings.
///
/// `data` and `config` are opaque to the gateway; only `maxNumberOfUsers`
/// has a defined meaning.
///
/// # Examples
///
/// ```
/// use gateway_tenancy::MainAppConfig;
///
/// let config: MainAppConfig = serde_json::from_str(
///     r#"{"data": {"title": "East"}, "config": {}, "maxNumberOfUsers": 10}"#,
/// ).unwrap();
/// assert_eq!(config.max_number_of_users, Some(10));
/// assert!(config.allows_user_count(10));
/// assert!(!config.allows_user_count(11));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MainAppConfig {
    /// Arbitrary app data
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Arbitrary app configuration
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Upper bound on configured users (none = unlimited)
    #[serde(default)]
    pub max_number_of_users: Option<u64>,
}

impl MainAppConfig {
    /// Check whether `count` users fit within the configured limit.
    pub fn allows_user_count(&self, count: usize) -> bool {
        match self.max_number_of_users {
            Some(max) => (count as u64) <= max,
            None => true,
        }
    }
}
