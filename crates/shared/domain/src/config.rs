use crate::constants::{COOKIE_MAX_AGE_DAYS, COOKIE_MAX_BYTES, COOKIE_NAME, CONFIG_FILE, KEY_FILE};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

/// Arc-wrapped so request state can clone it freely.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Deployment profile. Decides cookie defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    pub profile: Profile,
}

/// TLS certificate and key paths (PEM).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Locations of persisted state. File names are relative to `data_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub key_file: PathBuf,
}

impl StorageConfig {
    /// Absolute-or-relative location of the key file on disk.
    #[must_use]
    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file)
    }
}

#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Operator secret. The encryption key is its SHA-256.
    pub secret: Option<String>,
}

impl SecurityConfig {
    /// Secret if set and not blank.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.trim().is_empty())
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig").field("secret", &self.secret().map(|_| "<redacted>")).finish()
    }
}

/// Where the dashboard config is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON file in the data directory, token encrypted per field.
    #[default]
    File,
    /// A sealed browser cookie; no server-side state.
    Cookie,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: Backend,
    pub cookie: CookieConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub max_bytes: usize,
    pub max_age_days: i64,
    /// Forces the `Secure` attribute on or off. Unset: on outside development.
    pub secure: Option<bool>,
}

impl CookieConfig {
    #[must_use]
    pub fn secure_for(&self, profile: Profile) -> bool {
        self.secure.unwrap_or(profile == Profile::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `compact`, `pretty` or `json`.
    pub format: String,
    pub directives: Option<String>,
    /// Rolling log files are written here when set.
    pub dir: Option<PathBuf>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 3000, ssl: None, profile: Profile::default() }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), config_file: PathBuf::from(CONFIG_FILE), key_file: PathBuf::from(KEY_FILE) }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { name: COOKIE_NAME.to_owned(), max_bytes: COOKIE_MAX_BYTES, max_age_days: COOKIE_MAX_AGE_DAYS, secure: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: "compact".to_owned(), directives: None, dir: None }
    }
}
