//! The dashboard configuration document.
//!
//! Reads are tolerant: any missing or `null` field, at the top level or inside `gateway`,
//! takes its default, so a document written by an older build always loads.

use crate::constants::{DEFAULT_GATEWAY_URL, LAYOUT_EXPORT_VERSION};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Persisted dashboard state.
#[derive(Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub gateway: GatewayConfig,
    /// Widget placements. Opaque to the server.
    #[serde(deserialize_with = "null_as_default")]
    pub layout: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub edit_mode: bool,
}

/// Where the gateway lives and how to authenticate to it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Secret; empty means unset.
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { url: DEFAULT_GATEWAY_URL.to_owned(), token: String::new() }
    }
}

impl GatewayConfig {
    #[must_use]
    pub const fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl DashboardConfig {
    /// Copy with everything but the gateway credentials reset. Used when the full
    /// document does not fit its medium.
    #[must_use]
    pub fn credentials_only(&self) -> Self {
        Self { gateway: self.gateway.clone(), ..Self::default() }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &if self.has_token() { "<redacted>" } else { "" })
            .finish()
    }
}

impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("gateway", &self.gateway)
            .field("layout", &format_args!("[{} items]", self.layout.len()))
            .field("edit_mode", &self.edit_mode)
            .finish()
    }
}

/// Reads a layout from an export document (`{"version": 1, "layout": [...]}`) or a bare
/// array. Anything else is `None`.
#[must_use]
pub fn import_layout(document: Value) -> Option<Vec<Value>> {
    match document {
        Value::Array(layout) => Some(layout),
        Value::Object(mut map) => {
            let versioned = map.get("version").and_then(Value::as_u64) == Some(u64::from(LAYOUT_EXPORT_VERSION));
            match map.remove("layout") {
                Some(Value::Array(layout)) if versioned => Some(layout),
                _ => None,
            }
        },
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
