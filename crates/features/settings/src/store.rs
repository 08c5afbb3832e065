//! # Config Store
//!
//! Front door to dashboard configuration. Reads never fail: whatever the backend cannot
//! make sense of is logged and replaced by defaults, so a changed secret or a corrupt file
//! never locks the dashboard out. Writes are validated upstream and surface every
//! persistence failure.

use crate::backend::{ConfigBackend, CookieBackend, CookieSettings, FileBackend, Loaded};
use crate::error::{SettingsError, SettingsErrorExt};
use crate::jar::CookieAccess;
use crate::patch::ConfigPatch;
use helm_domain::config::{ApiConfig, Backend};
use helm_domain::dashboard::DashboardConfig;
use helm_storage::Storage;
use helm_vault::{KeyManager, Sealer, TokenCodec};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug)]
struct ConfigStoreInner {
    backend: ConfigBackend,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

/// Shared handle to the active backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<ConfigStoreInner>,
}

impl ConfigStore {
    pub fn new(backend: impl Into<ConfigBackend>) -> Self {
        Self { inner: Arc::new(ConfigStoreInner { backend: backend.into(), write_lock: Mutex::new(()) }) }
    }

    /// Builds the backend selected by `config.persistence.backend`.
    ///
    /// For the file backend this creates the data directory and resolves the token key up
    /// front, so a generated key file appears at startup rather than on the first save.
    ///
    /// # Errors
    /// [`SettingsError::Storage`] if the data directory cannot be created, or
    /// [`SettingsError::Vault`] if a key cannot be generated.
    pub async fn from_config(config: &ApiConfig) -> Result<Self, SettingsError> {
        let keys = KeyManager::builder().secret(config.security.secret()).key_file(config.storage.key_path()).build();

        let backend: ConfigBackend = match config.persistence.backend {
            Backend::File => {
                let storage =
                    Storage::builder().root(&config.storage.data_dir).connect().await.context("Opening data directory")?;
                keys.resolve_key().context("Resolving token key")?;
                FileBackend::new(storage, &config.storage.config_file, TokenCodec::new(keys)).into()
            },
            Backend::Cookie => {
                let settings = CookieSettings::from_config(&config.persistence.cookie, config.server.profile);
                CookieBackend::new(Sealer::new(keys), settings).into()
            },
        };

        info!(backend = ?backend.kind(), keyed = config.security.secret().is_some(), "Config store ready");
        Ok(Self::new(backend))
    }

    #[must_use]
    pub fn backend(&self) -> &ConfigBackend {
        &self.inner.backend
    }

    /// Current configuration. Missing or unreadable state reads as defaults, and a token
    /// that no longer decrypts reads as unset.
    pub async fn read(&self, jar: &dyn CookieAccess) -> DashboardConfig {
        let backend = self.inner.backend.kind();

        match self.inner.backend.load(jar).await {
            Ok(Loaded::TokenCleared { config, cause }) => {
                warn!(?backend, error = %cause, "Stored gateway token could not be decrypted, treating it as unset");
                config
            },
            Ok(loaded) => loaded.into_config(),
            Err(err) => {
                warn!(?backend, error = %err, "Stored config is unreadable, using defaults");
                DashboardConfig::default()
            },
        }
    }

    /// Merges `patch` onto the current configuration, persists the result and returns what
    /// was stored. The cookie backend may have dropped the layout to stay within budget.
    ///
    /// # Errors
    /// Any failure to encrypt, encode or persist the merged document.
    pub async fn write(&self, jar: &dyn CookieAccess, patch: ConfigPatch) -> Result<DashboardConfig, SettingsError> {
        let _guard = self.inner.write_lock.lock().await;

        let merged = patch.apply(self.read(jar).await);
        self.inner.backend.store(jar, &merged).await
    }

    /// Replaces the layout, keeping everything else.
    ///
    /// # Errors
    /// See [`ConfigStore::write`].
    pub async fn set_layout(&self, jar: &dyn CookieAccess, layout: Vec<Value>) -> Result<DashboardConfig, SettingsError> {
        self.write(jar, ConfigPatch::layout(layout)).await
    }

    /// Removes persisted state. Removing nothing is not an error.
    ///
    /// # Errors
    /// [`SettingsError::Storage`] if an existing file cannot be removed.
    pub async fn delete(&self, jar: &dyn CookieAccess) -> Result<(), SettingsError> {
        let _guard = self.inner.write_lock.lock().await;
        self.inner.backend.clear(jar).await
    }
}
