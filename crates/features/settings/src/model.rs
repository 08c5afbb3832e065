//! Wire shapes of the `/config` endpoints.

use helm_derive::api_model;
use helm_domain::constants::LAYOUT_EXPORT_VERSION;
use helm_domain::dashboard::{DashboardConfig, GatewayConfig};
use serde_json::Value;

/// Body accepted by `PUT /config` and `POST /config`. Every field is optional and `null`
/// counts as not supplied.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone, PartialEq)]
pub struct ConfigUpdate {
    pub gateway: Option<GatewayUpdate>,
    #[cfg_attr(feature = "server", schema(value_type = Option<Vec<Object>>))]
    pub layout: Option<Vec<Value>>,
    pub edit_mode: Option<bool>,
}

/// Replacement gateway settings. Missing members take their defaults.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone, PartialEq, Eq)]
pub struct GatewayUpdate {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Gateway settings as returned to the dashboard.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayView {
    pub url: String,
    pub token: String,
    /// Lets the dashboard show "token is set" without echoing it.
    pub has_token: bool,
}

/// Current configuration, as returned by every read and write.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct ConfigResponse {
    pub gateway: GatewayView,
    #[cfg_attr(feature = "server", schema(value_type = Vec<Object>))]
    pub layout: Vec<Value>,
    pub edit_mode: bool,
}

impl From<GatewayConfig> for GatewayView {
    fn from(gateway: GatewayConfig) -> Self {
        let has_token = gateway.has_token();
        Self { url: gateway.url, token: gateway.token, has_token }
    }
}

impl From<DashboardConfig> for ConfigResponse {
    fn from(config: DashboardConfig) -> Self {
        Self { gateway: config.gateway.into(), layout: config.layout, edit_mode: config.edit_mode }
    }
}

/// Portable layout export.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct LayoutDocument {
    pub version: u32,
    #[cfg_attr(feature = "server", schema(value_type = Vec<Object>))]
    pub layout: Vec<Value>,
}

impl LayoutDocument {
    #[must_use]
    pub const fn new(layout: Vec<Value>) -> Self {
        Self { version: LAYOUT_EXPORT_VERSION, layout }
    }
}

/// Acknowledgement for `DELETE /config`.
#[api_model]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeleteResponse {
    pub ok: bool,
}
