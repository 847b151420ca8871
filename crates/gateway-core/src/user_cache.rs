//! Per-app cache of user config documents
//!
//! Each app owns one cache, filled eagerly when the app is constructed by
//! listing the app asset's files and reading every `<userId>.user.config.json`.
//! Reads are served from memory; writes go to the file store first and only
//! touch memory once the store accepted them.

use gateway_clients::{ClientResult, ConfigFileStore};
use gateway_tenancy::{user_config_file_name, user_id_from_file_name, UserConfigDocument};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, GatewayResult};

/// Write-through cache of the user config documents of one app.
pub struct UserConfigCache {
    /// Tenant owning the files
    tenant: String,
    /// Asset the files hang off
    asset_id: String,
    store: Arc<dyn ConfigFileStore>,
    entries: RwLock<HashMap<String, UserConfigDocument>>,
    /// Serializes store writes; never held by readers
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for UserConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfigCache")
            .field("tenant", &self.tenant)
            .field("asset_id", &self.asset_id)
            .finish()
    }
}

impl UserConfigCache {
    /// Create a cache and populate it from the store.
    ///
    /// Files whose content does not decode as a user config document are
    /// skipped with a warning. Any store failure aborts the load.
    pub async fn load(
        store: Arc<dyn ConfigFileStore>,
        tenant: impl Into<String>,
        asset_id: impl Into<String>,
    ) -> ClientResult<Self> {
        let cache = Self {
            tenant: tenant.into(),
            asset_id: asset_id.into(),
            store,
            entries: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        };

        let entries = cache.fetch_all().await?;
        *cache.entries.write().await = entries;
        Ok(cache)
    }

    async fn fetch_all(&self) -> ClientResult<HashMap<String, UserConfigDocument>> {
        let files = self.store.list_files(&self.tenant, &self.asset_id).await?;
        let mut entries = HashMap::new();

        for file_name in &files {
            let Some(user_id) = user_id_from_file_name(file_name) else {
                continue;
            };

            let content = self.store.read(&self.tenant, &self.asset_id, file_name).await?;
            match serde_json::from_value::<UserConfigDocument>(content) {
                Ok(document) => {
                    entries.insert(user_id.to_string(), document);
                }
                Err(e) => {
                    warn!(
                        asset_id = %self.asset_id,
                        file = %file_name,
                        error = %e,
                        "Skipping undecodable user config"
                    );
                }
            }
        }

        debug!(asset_id = %self.asset_id, users = entries.len(), "Loaded user configs");
        Ok(entries)
    }

    /// Cached document of a user.
    pub async fn get(&self, user_id: &str) -> Option<UserConfigDocument> {
        self.entries.read().await.get(user_id).cloned()
    }

    /// Snapshot of all cached documents.
    pub async fn list_all(&self) -> HashMap<String, UserConfigDocument> {
        self.entries.read().await.clone()
    }

    /// Number of cached users.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check whether no user is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Store a document, then cache it.
    ///
    /// A failed store write leaves the cached entry untouched and surfaces
    /// as [`GatewayError::Internal`].
    pub async fn set(&self, user_id: &str, document: UserConfigDocument) -> GatewayResult<()> {
        let _guard = self.write_lock.lock().await;

        let content = serde_json::to_value(&document).map_err(|e| {
            error!(user_id, error = %e, "Failed to encode user config");
            GatewayError::Internal(e.to_string())
        })?;

        self.store
            .write(
                &self.tenant,
                &self.asset_id,
                &user_config_file_name(user_id),
                &content,
            )
            .await
            .map_err(|e| {
                error!(asset_id = %self.asset_id, user_id, error = %e, "Failed to store user config");
                GatewayError::Internal(e.to_string())
            })?;

        self.entries
            .write()
            .await
            .insert(user_id.to_string(), document);
        debug!(asset_id = %self.asset_id, user_id, "Stored user config");
        Ok(())
    }

    /// Drop one cached entry.
    ///
    /// # Returns
    ///
    /// Whether an entry was present.
    pub async fn invalidate(&self, user_id: &str) -> bool {
        self.entries.write().await.remove(user_id).is_some()
    }

    /// Re-read every user config from the store and swap the whole map.
    ///
    /// On failure the current entries stay in place.
    pub async fn reload(&self) -> ClientResult<usize> {
        let _guard = self.write_lock.lock().await;
        let entries = self.fetch_all().await?;
        let count = entries.len();
        *self.entries.write().await = entries;
        info!(asset_id = %self.asset_id, users = count, "Reloaded user configs");
        Ok(count)
    }
}
