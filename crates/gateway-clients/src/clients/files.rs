//! Config file store client.
//!
//! Files are JSON documents addressed by `(tenant, asset id, file name)`.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::config::ServiceEndpoint;
use super::HttpService;
use crate::error::{ClientError, ClientResult};
use crate::retry::RetryConfig;

/// Access to JSON files attached to assets.
#[async_trait]
pub trait ConfigFileStore: Send + Sync {
    /// Names of all files attached to an asset.
    async fn list_files(&self, tenant: &str, asset_id: &str) -> ClientResult<Vec<String>>;

    /// Whether a file exists.
    async fn exists(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<bool>;

    /// Read a file. A missing file is [`ClientError::NotFound`].
    async fn read(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<Value>;

    /// Create or replace a file.
    async fn write(
        &self,
        tenant: &str,
        asset_id: &str,
        file_name: &str,
        content: &Value,
    ) -> ClientResult<()>;
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    name: String,
}

const FILES_PATH: &str = "/api/files/v1/files";

/// HTTP client for the file store API.
#[derive(Clone)]
pub struct FileStoreClient {
    http: HttpService,
}

impl FileStoreClient {
    /// Create a new file store client.
    pub fn new(
        endpoint: ServiceEndpoint,
        timeout: Duration,
        retry: RetryConfig,
    ) -> ClientResult<Self> {
        Ok(Self {
            http: HttpService::new("files", endpoint, timeout, retry)?,
        })
    }

    fn file_url(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<Url> {
        self.http.segment_url(FILES_PATH, &[tenant, asset_id, file_name])
    }
}

#[async_trait]
impl ConfigFileStore for FileStoreClient {
    #[instrument(skip(self))]
    async fn list_files(&self, tenant: &str, asset_id: &str) -> ClientResult<Vec<String>> {
        let url = self.http.segment_url(FILES_PATH, &[tenant, asset_id])?;
        let entries: Vec<FileEntry> = self
            .http
            .send_json(|client| client.get(url.clone()))
            .await?;

        debug!(count = entries.len(), "Listed asset files");
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }

    #[instrument(skip(self))]
    async fn exists(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<bool> {
        let url = self.file_url(tenant, asset_id, file_name)?;
        match self.http.send(|client| client.head(url.clone())).await {
            Ok(_) => Ok(true),
            Err(ClientError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn read(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<Value> {
        let url = self.file_url(tenant, asset_id, file_name)?;
        self.http.send_json(|client| client.get(url.clone())).await
    }

    #[instrument(skip(self, content))]
    async fn write(
        &self,
        tenant: &str,
        asset_id: &str,
        file_name: &str,
        content: &Value,
    ) -> ClientResult<()> {
        let url = self.file_url(tenant, asset_id, file_name)?;
        self.http
            .send(|client| client.put(url.clone()).json(content))
            .await?;

        debug!("Stored file");
        Ok(())
    }
}
