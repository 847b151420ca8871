//! Payload validation for user config updates
//!
//! A `PUT /config/user/me` body must be a complete user config document:
//!
//! ```json
//! {
//!   "userName": "jane@acme.io",
//!   "data": { "<plantId>": {} },
//!   "config": { "<plantId>": {} },
//!   "permissions": { "role": 0, "plants": { "<plantId>": 0 } }
//! }
//! ```
//!
//! Checks run in a fixed order and the first failure wins, so a body with
//! several problems always reports the same one. Messages quote the
//! offending path the way schema validators conventionally do
//! (`"permissions.role" must be one of [0, 1, 2, 3]`).

use gateway_rbac::{PlantPermission, PlantPermissions, Role};
use gateway_tenancy::{UserConfigDocument, UserPermissions};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::error::{GatewayError, GatewayResult};

const TOP_LEVEL_KEYS: [&str; 4] = ["userName", "data", "config", "permissions"];
const PERMISSION_KEYS: [&str; 2] = ["role", "plants"];

// Local part per RFC 5322 atoms, domain with at least one dot.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Check that a string looks like an e-mail address.
pub fn is_email(value: &str) -> bool {
    email_regex().map_or(false, |re| re.is_match(value))
}

fn invalid(message: impl Into<String>) -> GatewayError {
    GatewayError::InvalidPayload(message.into())
}

fn required_object<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    label: &str,
) -> GatewayResult<&'a Map<String, Value>> {
    match object.get(key) {
        None => Err(invalid(format!("\"{label}\" is required"))),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(invalid(format!("\"{label}\" must be of type object"))),
    }
}

/// Interpret a JSON number as an integer ordinal, accepting `1.0` for `1`.
fn ordinal(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

/// Decode and validate a raw request body.
///
/// A body that is not JSON at all fails with `"value" must be valid JSON`.
pub fn parse_user_config(body: &[u8]) -> GatewayResult<UserConfigDocument> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| invalid("\"value\" must be valid JSON"))?;
    validate_user_config(&value)
}

/// Validate a decoded body and convert it into a document.
///
/// # Returns
///
/// The document on success, [`GatewayError::InvalidPayload`] carrying the
/// first failed rule otherwise.
pub fn validate_user_config(value: &Value) -> GatewayResult<UserConfigDocument> {
    let body = value
        .as_object()
        .ok_or_else(|| invalid("\"value\" must be of type object"))?;

    let user_name = match body.get("userName") {
        None => return Err(invalid("\"userName\" is required")),
        Some(Value::String(name)) => name,
        Some(_) => return Err(invalid("\"userName\" must be a string")),
    };
    if !is_email(user_name) {
        return Err(invalid("\"userName\" must be a valid email"));
    }

    let data = required_object(body, "data", "data")?;
    let config = required_object(body, "config", "config")?;
    let permissions = required_object(body, "permissions", "permissions")?;

    let role = match permissions.get("role") {
        None => return Err(invalid("\"permissions.role\" is required")),
        Some(raw) => ordinal(raw)
            .and_then(Role::from_ordinal)
            .ok_or_else(|| invalid("\"permissions.role\" must be one of [0, 1, 2, 3]"))?,
    };

    let raw_plants = required_object(permissions, "plants", "permissions.plants")?;
    let mut plants = PlantPermissions::new();
    for (plant_id, raw) in raw_plants {
        let permission = ordinal(raw)
            .and_then(PlantPermission::from_ordinal)
            .ok_or_else(|| {
                invalid(format!(
                    "\"permissions.plants.{plant_id}\" must be one of [0, 1]"
                ))
            })?;
        plants.insert(plant_id.clone(), permission);
    }

    if let Some(key) = permissions
        .keys()
        .find(|key| !PERMISSION_KEYS.contains(&key.as_str()))
    {
        return Err(invalid(format!("\"permissions.{key}\" is not allowed")));
    }

    if let Some(key) = body
        .keys()
        .find(|key| !TOP_LEVEL_KEYS.contains(&key.as_str()))
    {
        return Err(invalid(format!("\"{key}\" is not allowed")));
    }

    Ok(UserConfigDocument {
        data: data.clone(),
        config: config.clone(),
        permissions: UserPermissions::new(role, plants),
        user_name: user_name.clone(),
    })
}
