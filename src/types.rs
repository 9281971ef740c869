//! Wire DTOs exchanged with the external auth service.
//!
//! DESIGN
//! ======
//! Every field the service may omit is optional so a partially filled
//! response still deserializes; the session layer decides what a missing
//! field means for each operation.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Authenticated identity as returned by the auth service and persisted
/// under the `user` storage key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Service-assigned identifier. Numeric ids are normalized to strings.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Account email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Authorization claim (e.g. `"admin"`).
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the account has been suspended by an operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

/// Successful (resolved) auth service response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
    /// Present when the service reports failure without rejecting.
    #[serde(default)]
    pub error: Option<String>,
}

/// Structured rejection body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
    /// Short error code or message.
    #[serde(default)]
    pub error: Option<String>,
    /// Generic human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level validation messages, in service order.
    #[serde(default, deserialize_with = "deserialize_details")]
    pub details: Vec<String>,
}

impl AuthFailure {
    /// True when none of the recognized fields carry text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.error.as_deref().is_none_or(str::is_empty)
            && self.message.as_deref().is_none_or(str::is_empty)
            && self.details.is_empty()
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(id) if !id.is_empty() => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected non-empty string or number id")),
    }
}

/// Accepts a list of strings, a list of `{ "message": ... }` objects, or null.
fn deserialize_details<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("msg"))
                .and_then(|m| m.as_str())
                .map(str::to_owned),
            _ => None,
        })
        .collect())
}
