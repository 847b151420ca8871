//! Identity directory client.
//!
//! The directory is the source of truth for which users exist in a tenant
//! and its subtenants. The gateway only ever looks a user up by name to turn
//! the token's `user_name` claim into the stable user id that keys the
//! configuration files.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::config::ServiceEndpoint;
use super::{HttpService, Page, PAGE_SIZE};
use crate::error::ClientResult;
use crate::retry::RetryConfig;

/// A user as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Stable user id.
    pub id: String,

    /// Login name, usually an e-mail address.
    pub user_name: String,

    /// Subtenant the user belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtenant: Option<String>,

    /// Group names the user is a member of.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserRecord {
    /// Create a record without subtenant or groups.
    pub fn new(id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            subtenant: None,
            groups: Vec::new(),
        }
    }

    /// Builder: set the subtenant.
    pub fn in_subtenant(mut self, subtenant: impl Into<String>) -> Self {
        self.subtenant = Some(subtenant.into());
        self
    }

    /// Builder: add a group membership.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Filter for [`IdentityDirectory::find_users`].
///
/// Absent filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// Tenant to search in.
    pub tenant: String,

    /// Restrict to one subtenant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtenant: Option<String>,

    /// Restrict to members of a group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Exact login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl UserQuery {
    /// Query all users of a tenant.
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            ..Default::default()
        }
    }

    /// Builder: restrict to a subtenant.
    pub fn with_subtenant(mut self, subtenant: impl Into<String>) -> Self {
        self.subtenant = Some(subtenant.into());
        self
    }

    /// Builder: restrict to a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder: restrict to one login name.
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Check whether a record of `tenant` satisfies the filter.
    pub fn matches(&self, tenant: &str, user: &UserRecord) -> bool {
        if tenant != self.tenant {
            return false;
        }
        if let Some(ref subtenant) = self.subtenant {
            if user.subtenant.as_deref() != Some(subtenant.as_str()) {
                return false;
            }
        }
        if let Some(ref group) = self.group {
            if !user.groups.iter().any(|g| g == group) {
                return false;
            }
        }
        if let Some(ref user_name) = self.user_name {
            if &user.user_name != user_name {
                return false;
            }
        }
        true
    }
}

/// Read access to the identity directory.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Find all users matching the query.
    async fn find_users(&self, query: &UserQuery) -> ClientResult<Vec<UserRecord>>;
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default)]
    resources: Vec<UserRecord>,
    page: Option<Page>,
}

/// HTTP client for the identity directory API.
#[derive(Clone)]
pub struct DirectoryClient {
    http: HttpService,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(
        endpoint: ServiceEndpoint,
        timeout: Duration,
        retry: RetryConfig,
    ) -> ClientResult<Self> {
        Ok(Self {
            http: HttpService::new("directory", endpoint, timeout, retry)?,
        })
    }
}

#[async_trait]
impl IdentityDirectory for DirectoryClient {
    #[instrument(skip(self), fields(tenant = %query.tenant))]
    async fn find_users(&self, query: &UserQuery) -> ClientResult<Vec<UserRecord>> {
        let url = self.http.url("/api/directory/v1/users");
        let mut users = Vec::new();
        let mut page_number = 0u32;

        loop {
            let page: UserListResponse = self
                .http
                .send_json(|client| {
                    client
                        .get(&url)
                        .query(query)
                        .query(&[("page", page_number), ("size", PAGE_SIZE)])
                })
                .await?;

            users.extend(page.resources);

            if !Page::has_next(page.page.as_ref()) {
                break;
            }
            page_number += 1;
        }

        debug!(count = users.len(), "Directory lookup complete");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_matches_filters() {
        let user = UserRecord::new("u1", "jane@acme.io")
            .in_subtenant("plant-a")
            .in_group("operators");

        assert!(UserQuery::new("acme").matches("acme", &user));
        assert!(!UserQuery::new("acme").matches("other", &user));
        assert!(UserQuery::new("acme")
            .with_subtenant("plant-a")
            .with_group("operators")
            .with_user_name("jane@acme.io")
            .matches("acme", &user));
        assert!(!UserQuery::new("acme")
            .with_subtenant("plant-b")
            .matches("acme", &user));
        assert!(!UserQuery::new("acme")
            .with_group("admins")
            .matches("acme", &user));
        assert!(!UserQuery::new("acme")
            .with_user_name("john@acme.io")
            .matches("acme", &user));
    }

    #[test]
    fn test_query_serializes_only_present_filters() {
        let query = UserQuery::new("acme").with_user_name("jane@acme.io");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tenant": "acme", "userName": "jane@acme.io"})
        );
    }

    #[test]
    fn test_user_record_defaults() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id":"u1","userName":"jane@acme.io"}"#).unwrap();
        assert_eq!(user, UserRecord::new("u1", "jane@acme.io"));
    }
}
