//! Error taxonomy of the authorization engine
//!
//! Every variant maps to one HTTP status and one fixed caller-facing
//! message. Only [`GatewayError::Internal`] carries detail that must stay
//! out of responses.

use std::fmt;
use thiserror::Error;

/// Section of a user config document whose plant ids are compared against
/// `permissions.plants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantSection {
    /// The `data` map
    Data,
    /// The `config` map
    Config,
}

impl fmt::Display for PlantSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantSection::Data => write!(f, "data"),
            PlantSection::Config => write!(f, "config"),
        }
    }
}

/// Gateway error types.
#[derive(Debug, Error, PartialEq)]
pub enum GatewayError {
    /// Token carries no usable tenant
    #[error("Access denied. Invalid application id!")]
    InvalidAppId,

    /// No app registered or discoverable for the tenant/subtenant
    #[error("Access denied. Application of given id not found for the user!")]
    AppNotFound,

    /// App exists but has no main settings file
    #[error("Access denied. Main application settings not found for the user!")]
    MainSettingsNotFound,

    /// Token scopes do not intersect the app's accepted scopes
    #[error("Forbidden access. No scope found to access this app!")]
    NoScope,

    /// Directory has no user of the token's name
    #[error("Access denied. User does not exist in the tenant!")]
    UserNotInDirectory,

    /// App has no config document for the user
    #[error("Access denied. User of given name not found!")]
    UserConfigNotFound,

    /// Stored role ordinal is not a known role
    #[error("Access denied. Invalid user role!")]
    InvalidRole,

    /// Request body failed validation
    #[error("{0}")]
    InvalidPayload(String),

    /// Plant ids of a section disagree with `permissions.plants`
    #[error("Plant ids in {0} and permissions do not match!")]
    PlantIdMismatch(PlantSection),

    /// A plant admin permission was given to a non-admin role
    #[error("Plant admin permission requires local or global admin role!")]
    RoleAdminMismatch,

    /// The request tried to change the caller's role
    #[error("Users role cannot be modified!")]
    RoleImmutable,

    /// The request tried to change the caller's user name
    #[error("Users name cannot be modified!")]
    NameImmutable,

    /// The request tried to change the caller's plant permissions
    #[error("Users plant permissions cannot be modified!")]
    PlantPermissionsImmutable,

    /// Remote service or other unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "Ups.. Something fails..";

impl GatewayError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, GatewayError::Internal(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::InvalidAppId
            | GatewayError::AppNotFound
            | GatewayError::MainSettingsNotFound
            | GatewayError::NoScope
            | GatewayError::UserNotInDirectory
            | GatewayError::UserConfigNotFound
            | GatewayError::InvalidRole => 403,

            GatewayError::InvalidPayload(_)
            | GatewayError::PlantIdMismatch(_)
            | GatewayError::RoleAdminMismatch
            | GatewayError::RoleImmutable
            | GatewayError::NameImmutable
            | GatewayError::PlantPermissionsImmutable => 400,

            GatewayError::Internal(_) => 500,
        }
    }

    /// Get error code for logs and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::InvalidAppId => "INVALID_APP_ID",
            GatewayError::AppNotFound => "APP_NOT_FOUND",
            GatewayError::MainSettingsNotFound => "MAIN_SETTINGS_NOT_FOUND",
            GatewayError::NoScope => "NO_SCOPE",
            GatewayError::UserNotInDirectory => "USER_NOT_IN_DIRECTORY",
            GatewayError::UserConfigNotFound => "USER_CONFIG_NOT_FOUND",
            GatewayError::InvalidRole => "INVALID_ROLE",
            GatewayError::InvalidPayload(_) => "INVALID_PAYLOAD",
            GatewayError::PlantIdMismatch(_) => "PLANT_ID_MISMATCH",
            GatewayError::RoleAdminMismatch => "ROLE_ADMIN_MISMATCH",
            GatewayError::RoleImmutable => "ROLE_IMMUTABLE",
            GatewayError::NameImmutable => "NAME_IMMUTABLE",
            GatewayError::PlantPermissionsImmutable => "PLANT_PERMISSIONS_IMMUTABLE",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Caller-facing message.
    ///
    /// Internal failures collapse to [`INTERNAL_MESSAGE`].
    pub fn message(&self) -> String {
        match self {
            GatewayError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
