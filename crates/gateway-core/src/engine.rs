//! Authorization engine
//!
//! Turns decoded token claims into an authorized view of the caller's user
//! config, and validates self-edits before committing them.
//!
//! A request walks these steps in order; the first failing step decides the
//! response:
//!
//! 1. The token must name a tenant ([`GatewayError::InvalidAppId`]).
//! 2. The app of the tenant/subtenant must exist ([`GatewayError::AppNotFound`]).
//! 3. The app must have main settings ([`GatewayError::MainSettingsNotFound`]).
//! 4. One token scope must be accepted by the app ([`GatewayError::NoScope`]).
//! 5. The directory must know exactly one user of the token's name
//!    ([`GatewayError::UserNotInDirectory`]).
//! 6. The app must hold a config for that user with a known role
//!    ([`GatewayError::UserConfigNotFound`], [`GatewayError::InvalidRole`]).
//! 7. Reads return the cached document.
//! 8. Writes validate the body, check plant id consistency and the role
//!    rules, refuse changes to immutable fields, then write through the
//!    cache.
//!
//! Remote failures are terminal for the request and surface as
//! [`GatewayError::Internal`]; the engine never retries.

use gateway_auth::GatewayClaims;
use gateway_clients::{IdentityDirectory, UserQuery};
use gateway_rbac::{PlantPermissions, Role};
use gateway_tenancy::{AppId, UserConfigDocument, UserConfigView};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::error::{GatewayError, GatewayResult, PlantSection};
use crate::registry::{App, AppRegistry};
use crate::validation::parse_user_config;

/// Who the caller is within an app.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIdentity {
    /// App the request targets
    pub app_id: AppId,
    /// Directory id of the caller
    pub user_id: String,
    /// Caller's role in the app
    pub role: Role,
    /// Caller's plant permissions in the app
    pub plant_permissions: PlantPermissions,
}

/// Caller resolved through step 6.
struct Authorized {
    app: Arc<App>,
    identity: ResolvedIdentity,
    document: UserConfigDocument,
}

/// Request-resolution state machine.
#[derive(Clone)]
pub struct AuthorizationEngine {
    registry: Arc<AppRegistry>,
    directory: Arc<dyn IdentityDirectory>,
}

impl std::fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("registry", &self.registry)
            .finish()
    }
}

impl AuthorizationEngine {
    /// Create an engine over a registry and a directory.
    pub fn new(registry: Arc<AppRegistry>, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            registry,
            directory,
        }
    }

    /// The registry the engine resolves apps from.
    pub fn registry(&self) -> &Arc<AppRegistry> {
        &self.registry
    }

    /// Steps 1 to 4: resolve the app and check the token's scopes.
    #[instrument(skip(self, claims), fields(user = %claims.user_name))]
    pub async fn authorize_app(&self, claims: &GatewayClaims) -> GatewayResult<Arc<App>> {
        let target = claims.target().ok_or(GatewayError::InvalidAppId)?;
        let app = self.registry.resolve_app(&target).await?;

        if !app.has_main_config() {
            return Err(GatewayError::MainSettingsNotFound);
        }

        if !claims.has_any_scope(app.accepted_scopes()) {
            debug!(app_id = %app.app_id(), "Token scopes not accepted by app");
            return Err(GatewayError::NoScope);
        }

        Ok(app)
    }

    /// Steps 1 to 6: resolve the caller's identity and cached config.
    pub async fn resolve_identity(
        &self,
        claims: &GatewayClaims,
    ) -> GatewayResult<ResolvedIdentity> {
        self.authorize(claims)
            .await
            .map(|authorized| authorized.identity)
    }

    async fn authorize(&self, claims: &GatewayClaims) -> GatewayResult<Authorized> {
        let app = self.authorize_app(claims).await?;
        let user_id = self.lookup_user_id(&app, &claims.user_name).await?;

        let document = app
            .users()
            .get(&user_id)
            .await
            .ok_or(GatewayError::UserConfigNotFound)?;
        let role = document.role().ok_or(GatewayError::InvalidRole)?;

        Ok(Authorized {
            identity: ResolvedIdentity {
                app_id: app.app_id().clone(),
                user_id,
                role,
                plant_permissions: document.permissions.plants.clone(),
            },
            app,
            document,
        })
    }

    async fn lookup_user_id(&self, app: &App, user_name: &str) -> GatewayResult<String> {
        let mut query = UserQuery::new(app.tenant()).with_user_name(user_name);
        if let Some(subtenant) = app.subtenant() {
            query = query.with_subtenant(subtenant);
        }

        let users = self.directory.find_users(&query).await.map_err(|e| {
            error!(app_id = %app.app_id(), error = %e, "Directory lookup failed");
            GatewayError::Internal(e.to_string())
        })?;

        match users.as_slice() {
            [] => Err(GatewayError::UserNotInDirectory),
            [user] => Ok(user.id.clone()),
            _ => {
                error!(
                    app_id = %app.app_id(),
                    matches = users.len(),
                    "Directory returned an ambiguous user match"
                );
                Err(GatewayError::Internal(format!(
                    "{} directory entries for one user name",
                    users.len()
                )))
            }
        }
    }

    /// Read the caller's config.
    #[instrument(skip(self, claims), fields(user = %claims.user_name))]
    pub async fn get_me(&self, claims: &GatewayClaims) -> GatewayResult<UserConfigView> {
        let Authorized {
            identity, document, ..
        } = self.authorize(claims).await?;

        Ok(UserConfigView::new(document, identity.app_id, identity.user_id))
    }

    /// Replace the caller's config with the document in `body`.
    ///
    /// # Errors
    ///
    /// Besides the authorization errors of [`get_me`](Self::get_me):
    /// payload, plant id, role and immutability violations (400), and
    /// [`GatewayError::Internal`] when the store rejects the write.
    #[instrument(skip(self, claims, body), fields(user = %claims.user_name))]
    pub async fn put_me(
        &self,
        claims: &GatewayClaims,
        body: &[u8],
    ) -> GatewayResult<UserConfigView> {
        let Authorized {
            app,
            identity,
            document: current,
        } = self.authorize(claims).await?;

        let update = parse_user_config(body)?;
        check_plant_ids(&update)?;
        // A changed role is reported as such, whatever the plants say.
        if update.role() == current.role() {
            check_admin_role(&update)?;
        }
        check_immutable_fields(&current, &update)?;

        app.users().set(&identity.user_id, update.clone()).await?;
        info!(app_id = %identity.app_id, user_id = %identity.user_id, "User config updated");

        Ok(UserConfigView::new(update, identity.app_id, identity.user_id))
    }
}

fn check_plant_ids(update: &UserConfigDocument) -> GatewayResult<()> {
    let plants = update.permission_plant_ids();
    if update.data_plant_ids() != plants {
        return Err(GatewayError::PlantIdMismatch(PlantSection::Data));
    }
    if update.config_plant_ids() != plants {
        return Err(GatewayError::PlantIdMismatch(PlantSection::Config));
    }
    Ok(())
}

fn check_admin_role(update: &UserConfigDocument) -> GatewayResult<()> {
    // A validated document always carries a known role.
    let allowed = update
        .role()
        .map_or(false, |role| update.permissions.plants.allows_role(role));
    if !allowed {
        return Err(GatewayError::RoleAdminMismatch);
    }
    Ok(())
}

fn check_immutable_fields(
    current: &UserConfigDocument,
    update: &UserConfigDocument,
) -> GatewayResult<()> {
    if update.role() != current.role() {
        return Err(GatewayError::RoleImmutable);
    }
    if update.user_name != current.user_name {
        return Err(GatewayError::NameImmutable);
    }
    if update.permissions.plants != current.permissions.plants {
        return Err(GatewayError::PlantPermissionsImmutable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_rbac::PlantPermission;
    use serde_json::json;

    fn document(role: Role, plants: PlantPermissions) -> UserConfigDocument {
        let mut document = UserConfigDocument::new("jane@acme.io", role, plants.clone());
        for (plant_id, _) in plants.iter() {
            document = document
                .with_data(plant_id, json!({}))
                .with_config(plant_id, json!({}));
        }
        document
    }

    #[test]
    fn test_plant_id_mismatch_reports_section() {
        let plants = PlantPermissions::new().with("P1", PlantPermission::User);
        let base = document(Role::LocalUser, plants);

        let mut extra_data = base.clone();
        extra_data.data.insert("P2".into(), json!({}));
        assert_eq!(
            check_plant_ids(&extra_data),
            Err(GatewayError::PlantIdMismatch(PlantSection::Data))
        );

        let mut missing_config = base.clone();
        missing_config.config.clear();
        assert_eq!(
            check_plant_ids(&missing_config),
            Err(GatewayError::PlantIdMismatch(PlantSection::Config))
        );

        assert_eq!(check_plant_ids(&base), Ok(()));
    }

    #[test]
    fn test_admin_plant_requires_admin_role() {
        let admin_plants = PlantPermissions::new().with("P1", PlantPermission::Admin);

        assert_eq!(
            check_admin_role(&document(Role::GlobalUser, admin_plants.clone())),
            Err(GatewayError::RoleAdminMismatch)
        );
        assert_eq!(
            check_admin_role(&document(Role::LocalUser, admin_plants.clone())),
            Err(GatewayError::RoleAdminMismatch)
        );
        assert_eq!(
            check_admin_role(&document(Role::LocalAdmin, admin_plants.clone())),
            Ok(())
        );
        assert_eq!(
            check_admin_role(&document(Role::GlobalAdmin, admin_plants)),
            Ok(())
        );
    }

    #[test]
    fn test_immutable_fields_in_order() {
        let plants = PlantPermissions::new().with("P1", PlantPermission::Admin);
        let current = document(Role::GlobalAdmin, plants.clone());

        let mut renamed_and_demoted = document(Role::LocalAdmin, plants.clone());
        renamed_and_demoted.user_name = "other@acme.io".into();
        assert_eq!(
            check_immutable_fields(&current, &renamed_and_demoted),
            Err(GatewayError::RoleImmutable)
        );

        let mut renamed = current.clone();
        renamed.user_name = "other@acme.io".into();
        assert_eq!(
            check_immutable_fields(&current, &renamed),
            Err(GatewayError::NameImmutable)
        );

        let downgraded = document(
            Role::GlobalAdmin,
            PlantPermissions::new().with("P1", PlantPermission::User),
        );
        assert_eq!(
            check_immutable_fields(&current, &downgraded),
            Err(GatewayError::PlantPermissionsImmutable)
        );

        let new_data = current.clone().with_data("P1", json!({"line": 2}));
        assert_eq!(check_immutable_fields(&current, &new_data), Ok(()));
    }
}
