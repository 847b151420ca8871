//! In-memory implementations of the platform services.
//!
//! Used by tests and local development. Each keeps call counters so tests
//! can assert how often a service was contacted, and can be switched into a
//! failing mode that answers every call with [`ClientError::Unavailable`].
//! None of them retry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::assets::{AssetHierarchy, AssetQuery, AssetRecord};
use crate::clients::directory::{IdentityDirectory, UserQuery, UserRecord};
use crate::clients::files::ConfigFileStore;
use crate::error::{ClientError, ClientResult};

fn injected(service: &str) -> ClientError {
    ClientError::Unavailable(format!("{} failure injected", service))
}

/// In-memory identity directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: Arc<RwLock<Vec<(String, UserRecord)>>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in `tenant`.
    pub async fn add_user(&self, tenant: impl Into<String>, user: UserRecord) {
        self.users.write().await.push((tenant.into(), user));
    }

    /// Number of `find_users` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn find_users(&self, query: &UserQuery) -> ClientResult<Vec<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected("directory"));
        }

        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|(tenant, user)| query.matches(tenant, user))
            .map(|(_, user)| user.clone())
            .collect())
    }
}

/// In-memory asset hierarchy.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetTree {
    assets: Arc<RwLock<Vec<(String, AssetRecord)>>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryAssetTree {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset owned by `tenant`.
    pub async fn add_asset(&self, tenant: impl Into<String>, asset: AssetRecord) {
        self.assets.write().await.push((tenant.into(), asset));
    }

    /// Number of `list_assets` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetHierarchy for MemoryAssetTree {
    async fn list_assets(&self, query: &AssetQuery) -> ClientResult<Vec<AssetRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected("asset"));
        }

        let assets = self.assets.read().await;
        Ok(assets
            .iter()
            .filter(|(tenant, asset)| query.matches(tenant, asset))
            .map(|(_, asset)| asset.clone())
            .collect())
    }
}

type FileKey = (String, String, String);

/// In-memory config file store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<RwLock<BTreeMap<FileKey, Value>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    failing_reads: Arc<AtomicBool>,
    failing_writes: Arc<AtomicBool>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tenant: &str, asset_id: &str, file_name: &str) -> FileKey {
        (tenant.to_string(), asset_id.to_string(), file_name.to_string())
    }

    /// Seed a file without counting it as a write.
    pub async fn put_file(&self, tenant: &str, asset_id: &str, file_name: &str, content: Value) {
        self.files
            .write()
            .await
            .insert(Self::key(tenant, asset_id, file_name), content);
    }

    /// Inspect a stored file without counting it as a read.
    pub async fn file(&self, tenant: &str, asset_id: &str, file_name: &str) -> Option<Value> {
        self.files
            .read()
            .await
            .get(&Self::key(tenant, asset_id, file_name))
            .cloned()
    }

    /// Number of list, exists and read calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls so far, failed ones included.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make list, exists and read calls fail (or succeed again).
    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    /// Make write calls fail (or succeed again).
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    fn begin_read(&self) -> ClientResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(injected("file store"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigFileStore for MemoryFileStore {
    async fn list_files(&self, tenant: &str, asset_id: &str) -> ClientResult<Vec<String>> {
        self.begin_read()?;
        let files = self.files.read().await;
        Ok(files
            .keys()
            .filter(|(t, a, _)| t == tenant && a == asset_id)
            .map(|(_, _, name)| name.clone())
            .collect())
    }

    async fn exists(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<bool> {
        self.begin_read()?;
        Ok(self
            .files
            .read()
            .await
            .contains_key(&Self::key(tenant, asset_id, file_name)))
    }

    async fn read(&self, tenant: &str, asset_id: &str, file_name: &str) -> ClientResult<Value> {
        self.begin_read()?;
        self.files
            .read()
            .await
            .get(&Self::key(tenant, asset_id, file_name))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{}/{}/{}", tenant, asset_id, file_name)))
    }

    async fn write(
        &self,
        tenant: &str,
        asset_id: &str,
        file_name: &str,
        content: &Value,
    ) -> ClientResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(injected("file store"));
        }
        self.files
            .write()
            .await
            .insert(Self::key(tenant, asset_id, file_name), content.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_directory_filters_and_counts() {
        let directory = MemoryDirectory::new();
        directory
            .add_user("acme", UserRecord::new("u1", "jane@acme.io").in_subtenant("s1"))
            .await;
        directory
            .add_user("acme", UserRecord::new("u2", "john@acme.io"))
            .await;
        directory
            .add_user("other", UserRecord::new("u3", "jane@acme.io"))
            .await;

        let found = directory
            .find_users(&UserQuery::new("acme").with_user_name("jane@acme.io"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u1");

        let in_subtenant = directory
            .find_users(&UserQuery::new("acme").with_subtenant("s1"))
            .await
            .unwrap();
        assert_eq!(in_subtenant.len(), 1);

        let all = directory.find_users(&UserQuery::new("acme")).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(directory.calls(), 3);
    }

    #[tokio::test]
    async fn test_memory_directory_failure_injection() {
        let directory = MemoryDirectory::new();
        directory.set_failing(true);

        let result = directory.find_users(&UserQuery::new("acme")).await;
        assert!(matches!(result, Err(ClientError::Unavailable(_))));

        directory.set_failing(false);
        assert!(directory.find_users(&UserQuery::new("acme")).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_asset_tree() {
        let tree = MemoryAssetTree::new();
        tree.add_asset("host", AssetRecord::new("a1", "ten-acme", "app", "root"))
            .await;
        tree.add_asset("host", AssetRecord::new("a2", "ten-beta", "app", "root"))
            .await;
        tree.add_asset("host", AssetRecord::new("f1", "folder", "folder", "root"))
            .await;

        let apps = tree
            .list_assets(&AssetQuery::new("host", "root", "app"))
            .await
            .unwrap();
        assert_eq!(apps.len(), 2);

        let named = tree
            .list_assets(&AssetQuery::new("host", "root", "app").with_name("ten-beta"))
            .await
            .unwrap();
        assert_eq!(named, vec![AssetRecord::new("a2", "ten-beta", "app", "root")]);
        assert_eq!(tree.calls(), 2);
    }

    #[tokio::test]
    async fn test_memory_file_store_round_trip() {
        let store = MemoryFileStore::new();
        store
            .put_file("host", "a1", "main.app.config.json", json!({"data": {}}))
            .await;

        assert!(store.exists("host", "a1", "main.app.config.json").await.unwrap());
        assert!(!store.exists("host", "a1", "missing.json").await.unwrap());

        store
            .write("host", "a1", "u1.user.config.json", &json!({"userName": "x"}))
            .await
            .unwrap();

        let names = store.list_files("host", "a1").await.unwrap();
        assert_eq!(names, vec!["main.app.config.json", "u1.user.config.json"]);
        assert_eq!(
            store.read("host", "a1", "u1.user.config.json").await.unwrap(),
            json!({"userName": "x"})
        );
        assert!(matches!(
            store.read("host", "a1", "missing.json").await,
            Err(ClientError::NotFound(_))
        ));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_memory_file_store_failed_write_keeps_content() {
        let store = MemoryFileStore::new();
        store
            .put_file("host", "a1", "u1.user.config.json", json!({"v": 1}))
            .await;
        store.set_failing_writes(true);

        let result = store
            .write("host", "a1", "u1.user.config.json", &json!({"v": 2}))
            .await;
        assert!(result.is_err());
        assert_eq!(
            store.file("host", "a1", "u1.user.config.json").await,
            Some(json!({"v": 1}))
        );
        assert_eq!(store.writes(), 1);
    }
}
