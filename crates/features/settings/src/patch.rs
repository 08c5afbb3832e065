//! Validation of inbound configuration patches.
//!
//! Types are checked against the raw JSON before anything is deserialized, so a rejection
//! names the offending field instead of echoing a serde position. Nothing is coerced.

use crate::error::SettingsError;
use crate::model::{ConfigUpdate, GatewayUpdate};
use helm_domain::dashboard::{DashboardConfig, GatewayConfig};
use serde_json::{Map, Value};

/// A validated partial update. `None` leaves the current value in place.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigPatch {
    pub gateway: Option<GatewayConfig>,
    pub layout: Option<Vec<Value>>,
    pub edit_mode: Option<bool>,
}

impl ConfigPatch {
    /// Parses and validates a request body.
    ///
    /// # Errors
    /// [`SettingsError::Validation`] if the body is not a JSON object or a known field has
    /// the wrong type. The message names the field (`editMode`, `layout`, `gateway`,
    /// `gateway.url`, `gateway.token`).
    pub fn from_json(body: &[u8]) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SettingsError::validation(format!("Body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Validates an already parsed body.
    ///
    /// # Errors
    /// See [`ConfigPatch::from_json`].
    pub fn from_value(value: Value) -> Result<Self, SettingsError> {
        let Value::Object(body) = &value else {
            return Err(SettingsError::validation("Body must be a JSON object"));
        };
        check_types(body)?;

        let update: ConfigUpdate =
            serde_json::from_value(value).map_err(|e| SettingsError::validation(e.to_string()))?;
        Ok(update.into())
    }

    /// A patch that only replaces the layout.
    #[must_use]
    pub const fn layout(layout: Vec<Value>) -> Self {
        Self { gateway: None, layout: Some(layout), edit_mode: None }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.gateway.is_none() && self.layout.is_none() && self.edit_mode.is_none()
    }

    /// Shallow merge onto `current`. A supplied gateway replaces the whole sub-object.
    #[must_use]
    pub fn apply(self, current: DashboardConfig) -> DashboardConfig {
        DashboardConfig {
            gateway: self.gateway.unwrap_or(current.gateway),
            layout: self.layout.unwrap_or(current.layout),
            edit_mode: self.edit_mode.unwrap_or(current.edit_mode),
        }
    }
}

impl From<ConfigUpdate> for ConfigPatch {
    fn from(update: ConfigUpdate) -> Self {
        Self { gateway: update.gateway.map(gateway_from), layout: update.layout, edit_mode: update.edit_mode }
    }
}

fn gateway_from(update: GatewayUpdate) -> GatewayConfig {
    let defaults = GatewayConfig::default();
    GatewayConfig { url: update.url.unwrap_or(defaults.url), token: update.token.unwrap_or(defaults.token) }
}

fn check_types(body: &Map<String, Value>) -> Result<(), SettingsError> {
    if let Some(edit_mode) = present(body, "editMode")
        && !edit_mode.is_boolean()
    {
        return Err(SettingsError::validation("editMode must be a boolean"));
    }

    if let Some(layout) = present(body, "layout")
        && !layout.is_array()
    {
        return Err(SettingsError::validation("layout must be an array"));
    }

    if let Some(gateway) = present(body, "gateway") {
        let Value::Object(gateway) = gateway else {
            return Err(SettingsError::validation("gateway must be an object"));
        };
        for field in ["url", "token"] {
            if let Some(value) = present(gateway, field)
                && !value.is_string()
            {
                return Err(SettingsError::validation(format!("gateway.{field} must be a string")));
            }
        }
    }

    Ok(())
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_counts_as_absent() {
        let patch = ConfigPatch::from_value(json!({ "editMode": null, "layout": null, "gateway": null })).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_partial_gateway_takes_defaults() {
        let patch = ConfigPatch::from_value(json!({ "gateway": { "token": "t" } })).unwrap();
        let gateway = patch.gateway.unwrap();
        assert_eq!(gateway.url, GatewayConfig::default().url);
        assert_eq!(gateway.token, "t");
    }

    #[test]
    fn test_apply_is_shallow() {
        let current = DashboardConfig {
            gateway: GatewayConfig { url: "ws://old:1".into(), token: "old".into() },
            layout: vec![json!({ "i": "a" })],
            edit_mode: true,
        };
        let patch = ConfigPatch::from_value(json!({ "gateway": { "url": "ws://new:2" } })).unwrap();
        let merged = patch.apply(current);

        assert_eq!(merged.gateway.url, "ws://new:2");
        assert!(merged.gateway.token.is_empty());
        assert_eq!(merged.layout.len(), 1);
        assert!(merged.edit_mode);
    }
}
