//! Asset hierarchy client.
//!
//! Every application is represented by one asset whose name is the app id,
//! living under a container asset of the hosting tenant. Configuration files
//! hang off that asset's id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::config::ServiceEndpoint;
use super::{HttpService, Page, PAGE_SIZE};
use crate::error::ClientResult;
use crate::retry::RetryConfig;

/// An asset node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Asset id, used to address attached files.
    pub asset_id: String,

    /// Asset name.
    pub name: String,

    /// Asset type id.
    pub type_id: String,

    /// Parent asset id; absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl AssetRecord {
    /// Create an asset under `parent_id`.
    pub fn new(
        asset_id: impl Into<String>,
        name: impl Into<String>,
        type_id: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            name: name.into(),
            type_id: type_id.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// Filter for [`AssetHierarchy::list_assets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    /// Tenant owning the hierarchy.
    pub tenant: String,

    /// Direct parent of the listed assets.
    pub parent_id: String,

    /// Asset type to list.
    pub type_id: String,

    /// Exact asset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AssetQuery {
    /// List children of `parent_id` with type `type_id`.
    pub fn new(
        tenant: impl Into<String>,
        parent_id: impl Into<String>,
        type_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            parent_id: parent_id.into(),
            type_id: type_id.into(),
            name: None,
        }
    }

    /// Builder: restrict to one name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check whether an asset of `tenant` satisfies the filter.
    pub fn matches(&self, tenant: &str, asset: &AssetRecord) -> bool {
        tenant == self.tenant
            && asset.parent_id.as_deref() == Some(self.parent_id.as_str())
            && asset.type_id == self.type_id
            && self.name.as_ref().map_or(true, |name| &asset.name == name)
    }
}

/// Read access to the asset hierarchy.
#[async_trait]
pub trait AssetHierarchy: Send + Sync {
    /// List all assets matching the query.
    async fn list_assets(&self, query: &AssetQuery) -> ClientResult<Vec<AssetRecord>>;
}

#[derive(Debug, Deserialize)]
struct AssetListResponse {
    #[serde(default)]
    assets: Vec<AssetRecord>,
    page: Option<Page>,
}

/// HTTP client for the asset hierarchy API.
#[derive(Clone)]
pub struct AssetClient {
    http: HttpService,
}

impl AssetClient {
    /// Create a new asset client.
    pub fn new(
        endpoint: ServiceEndpoint,
        timeout: Duration,
        retry: RetryConfig,
    ) -> ClientResult<Self> {
        Ok(Self {
            http: HttpService::new("assets", endpoint, timeout, retry)?,
        })
    }
}

#[async_trait]
impl AssetHierarchy for AssetClient {
    #[instrument(skip(self), fields(tenant = %query.tenant, parent = %query.parent_id))]
    async fn list_assets(&self, query: &AssetQuery) -> ClientResult<Vec<AssetRecord>> {
        let url = self.http.url("/api/assets/v1/assets");
        let mut assets = Vec::new();
        let mut page_number = 0u32;

        loop {
            let page: AssetListResponse = self
                .http
                .send_json(|client| {
                    client
                        .get(&url)
                        .query(query)
                        .query(&[("page", page_number), ("size", PAGE_SIZE)])
                })
                .await?;

            assets.extend(page.assets);

            if !Page::has_next(page.page.as_ref()) {
                break;
            }
            page_number += 1;
        }

        debug!(count = assets.len(), "Asset listing complete");
        Ok(assets)
    }
}
