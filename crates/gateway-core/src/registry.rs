//! App registry
//!
//! Process-wide map of every known app. It is filled once at startup by
//! crawling the app assets of the hosting tenant and grows lazily when a
//! request names a tenant/subtenant whose asset appeared later.
//!
//! # Concurrency
//!
//! Lookups of registered apps take a shared read lock. Lazy creation is
//! serialized per app id: concurrent requests for the same unknown app
//! create it once, while requests for different unknown apps proceed in
//! parallel.

use gateway_clients::{
    AssetHierarchy, AssetQuery, AssetRecord, ClientError, ClientResult, ConfigFileStore,
};
use gateway_tenancy::{AppId, AppTarget, MainAppConfig, MAIN_CONFIG_FILE};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AccessConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::user_cache::UserConfigCache;

/// One application: a tenant, or a tenant and subtenant pair.
#[derive(Debug)]
pub struct App {
    app_id: AppId,
    target: AppTarget,
    asset_id: String,
    main_config: Option<MainAppConfig>,
    accepted_scopes: HashSet<String>,
    users: UserConfigCache,
}

impl App {
    /// Build an app from its asset, reading its main settings and
    /// populating its user cache.
    pub async fn load(
        asset: &AssetRecord,
        target: AppTarget,
        config: &AccessConfig,
        store: Arc<dyn ConfigFileStore>,
    ) -> ClientResult<Self> {
        let app_id = target.app_id();
        let tenant = config.host_tenant.as_str();

        let main_config = if store.exists(tenant, &asset.asset_id, MAIN_CONFIG_FILE).await? {
            let content = store.read(tenant, &asset.asset_id, MAIN_CONFIG_FILE).await?;
            match serde_json::from_value::<MainAppConfig>(content) {
                Ok(main) => Some(main),
                Err(e) => {
                    warn!(app_id = %app_id, error = %e, "Main app config is not decodable");
                    None
                }
            }
        } else {
            warn!(app_id = %app_id, "Main app config missing");
            None
        };

        let users = UserConfigCache::load(store, tenant, asset.asset_id.clone()).await?;

        if let Some(ref main) = main_config {
            let count = users.len().await;
            if !main.allows_user_count(count) {
                warn!(
                    app_id = %app_id,
                    users = count,
                    max = ?main.max_number_of_users,
                    "App holds more users than its configured maximum"
                );
            }
        }

        Ok(Self {
            accepted_scopes: config.scopes_for(&app_id),
            app_id,
            target,
            asset_id: asset.asset_id.clone(),
            main_config,
            users,
        })
    }

    /// Derived app id.
    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Tenant name.
    pub fn tenant(&self) -> &str {
        &self.target.tenant
    }

    /// Subtenant id, if the app is subtenant-scoped.
    pub fn subtenant(&self) -> Option<&str> {
        self.target.subtenant.as_deref()
    }

    /// Asset holding the app's files.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Main settings, if the app has them.
    pub fn main_config(&self) -> Option<&MainAppConfig> {
        self.main_config.as_ref()
    }

    /// Check whether the app has main settings.
    pub fn has_main_config(&self) -> bool {
        self.main_config.is_some()
    }

    /// Scopes granting access to this app.
    pub fn accepted_scopes(&self) -> &HashSet<String> {
        &self.accepted_scopes
    }

    /// The app's user config cache.
    pub fn users(&self) -> &UserConfigCache {
        &self.users
    }
}

/// Registry of all known apps.
pub struct AppRegistry {
    config: AccessConfig,
    assets: Arc<dyn AssetHierarchy>,
    files: Arc<dyn ConfigFileStore>,
    apps: RwLock<HashMap<AppId, Arc<App>>>,
    /// Per app id creation locks, present only while a request holds one
    creating: Mutex<HashMap<AppId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRegistry")
            .field("config", &self.config)
            .finish()
    }
}

impl AppRegistry {
    /// Create an empty registry.
    pub fn new(
        config: AccessConfig,
        assets: Arc<dyn AssetHierarchy>,
        files: Arc<dyn ConfigFileStore>,
    ) -> Self {
        Self {
            config,
            assets,
            files,
            apps: RwLock::new(HashMap::new()),
            creating: Mutex::new(HashMap::new()),
        }
    }

    /// Access configuration of the registry.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    fn app_query(&self) -> AssetQuery {
        AssetQuery::new(
            self.config.host_tenant.clone(),
            self.config.app_container_asset_id.clone(),
            self.config.app_asset_type.clone(),
        )
    }

    /// Register every app asset found under the container asset.
    ///
    /// Assets whose name is not an app id are skipped. Any remote failure
    /// aborts initialization.
    ///
    /// # Returns
    ///
    /// The number of registered apps.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> ClientResult<usize> {
        let assets = self.assets.list_assets(&self.app_query()).await?;
        let mut loaded = HashMap::new();

        for asset in &assets {
            let app_id = AppId::from(asset.name.as_str());
            let Some(target) = app_id.target() else {
                warn!(asset = %asset.name, "Skipping asset with an invalid app id");
                continue;
            };

            let app = App::load(asset, target, &self.config, self.files.clone()).await?;
            loaded.insert(app_id, Arc::new(app));
        }

        let count = loaded.len();
        self.apps.write().await.extend(loaded);
        info!(apps = count, "App registry initialized");
        Ok(count)
    }

    /// Registered app by id, without asking the asset hierarchy.
    pub async fn get(&self, app_id: &AppId) -> Option<Arc<App>> {
        self.apps.read().await.get(app_id).cloned()
    }

    /// Resolve the app of a tenant/subtenant pair.
    ///
    /// Unknown apps are looked up in the asset hierarchy and registered on
    /// the fly.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AppNotFound`] when no asset exists for the app,
    /// [`GatewayError::Internal`] when a remote call fails.
    pub async fn resolve_app(&self, target: &AppTarget) -> GatewayResult<Arc<App>> {
        let app_id = target.app_id();

        if let Some(app) = self.get(&app_id).await {
            return Ok(app);
        }

        let key_lock = {
            let mut creating = self.creating.lock().await;
            creating.entry(app_id.clone()).or_default().clone()
        };
        let guard = key_lock.lock().await;

        // Another request may have created it while we waited.
        let result = match self.get(&app_id).await {
            Some(app) => Ok(app),
            None => self.create_app(&app_id, target).await,
        };

        drop(guard);
        self.release_creation_lock(&app_id, &key_lock).await;
        result
    }

    /// Forget the creation lock of an app once no other request holds it.
    ///
    /// Waiters clone the lock under the `creating` mutex, so the count
    /// checked here cannot grow behind our back.
    async fn release_creation_lock(&self, app_id: &AppId, key_lock: &Arc<Mutex<()>>) {
        let mut creating = self.creating.lock().await;
        let ours = creating
            .get(app_id)
            .is_some_and(|lock| Arc::ptr_eq(lock, key_lock));
        // One reference in the map, one held by the caller.
        if ours && Arc::strong_count(key_lock) == 2 {
            creating.remove(app_id);
        }
    }

    async fn create_app(&self, app_id: &AppId, target: &AppTarget) -> GatewayResult<Arc<App>> {
        let query = self.app_query().with_name(app_id.as_str());
        let assets = self
            .assets
            .list_assets(&query)
            .await
            .map_err(|e| internal(app_id, "Asset lookup failed", e))?;

        let Some(asset) = assets.first() else {
            debug!(app_id = %app_id, "No asset for app");
            return Err(GatewayError::AppNotFound);
        };
        if assets.len() > 1 {
            warn!(app_id = %app_id, count = assets.len(), "Several assets share an app id, using the first");
        }

        let app = App::load(asset, target.clone(), &self.config, self.files.clone())
            .await
            .map_err(|e| internal(app_id, "App load failed", e))?;
        let registered = self
            .apps
            .write()
            .await
            .entry(app_id.clone())
            .or_insert_with(|| Arc::new(app))
            .clone();
        info!(app_id = %app_id, "Registered app on demand");
        Ok(registered)
    }

    /// Drop every registered app.
    pub async fn reset(&self) {
        self.apps.write().await.clear();
        info!("App registry reset");
    }

    /// Ids of all registered apps, sorted.
    pub async fn app_ids(&self) -> Vec<AppId> {
        let mut ids: Vec<AppId> = self.apps.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered apps.
    pub async fn len(&self) -> usize {
        self.apps.read().await.len()
    }

    /// Check whether no app is registered.
    pub async fn is_empty(&self) -> bool {
        self.apps.read().await.is_empty()
    }
}

fn internal(app_id: &AppId, context: &str, e: ClientError) -> GatewayError {
    error!(app_id = %app_id, error = %e, "{}", context);
    GatewayError::Internal(format!("{}: {}", context, e))
}
