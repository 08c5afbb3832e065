//! Names and limits that appear on disk, in cookies or in the environment.

/// Gateway the dashboard connects to when nothing is configured.
pub const DEFAULT_GATEWAY_URL: &str = "ws://localhost:18789";

/// Dashboard config file name under the data directory.
pub const CONFIG_FILE: &str = "helm-config.json";
/// Generated key file name under the data directory.
pub const KEY_FILE: &str = "helm.key";

/// Cookie holding the sealed dashboard config.
pub const COOKIE_NAME: &str = "helm_config";
/// Largest sealed cookie value written before layout data is dropped.
pub const COOKIE_MAX_BYTES: usize = 3800;
pub const COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Prefix of layered environment overrides (`HELM__SERVER__PORT`).
pub const ENV_PREFIX: &str = "HELM";
/// Legacy single variable carrying the operator secret.
pub const SECRET_ENV: &str = "HELM_SECRET";

/// Version tag of exported layout documents.
pub const LAYOUT_EXPORT_VERSION: u32 = 1;
