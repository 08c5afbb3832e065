//! Persistence backends for the dashboard configuration.
//!
//! Backends report what they found as a [`Loaded`] value and leave the decision of what
//! to do with unreadable state to [`ConfigStore`](crate::ConfigStore).

mod cookie;
mod file;

pub use cookie::{CookieBackend, CookieSettings};
pub use file::FileBackend;

use crate::error::SettingsError;
use crate::jar::CookieAccess;
use helm_domain::config::Backend;
use helm_domain::dashboard::DashboardConfig;
use helm_vault::VaultError;

/// Outcome of a backend load.
#[derive(Debug)]
pub enum Loaded {
    /// Nothing stored yet.
    Absent,
    Intact(DashboardConfig),
    /// The document loaded but its encrypted token could not be opened, so the token was
    /// reset to empty.
    TokenCleared { config: DashboardConfig, cause: VaultError },
}

impl Loaded {
    /// The configuration this outcome stands for, defaults when absent.
    #[must_use]
    pub fn into_config(self) -> DashboardConfig {
        match self {
            Self::Absent => DashboardConfig::default(),
            Self::Intact(config) | Self::TokenCleared { config, .. } => config,
        }
    }
}

/// The active backend.
#[derive(Debug)]
pub enum ConfigBackend {
    File(FileBackend),
    Cookie(CookieBackend),
}

impl ConfigBackend {
    #[must_use]
    pub const fn kind(&self) -> Backend {
        match self {
            Self::File(_) => Backend::File,
            Self::Cookie(_) => Backend::Cookie,
        }
    }

    pub(crate) async fn load(&self, jar: &dyn CookieAccess) -> Result<Loaded, SettingsError> {
        match self {
            Self::File(backend) => backend.load().await,
            Self::Cookie(backend) => backend.load(jar),
        }
    }

    /// Persists `config` and returns the document a later load will see, which can be
    /// smaller than `config` when the medium forced a reduction.
    pub(crate) async fn store(
        &self,
        jar: &dyn CookieAccess,
        config: &DashboardConfig,
    ) -> Result<DashboardConfig, SettingsError> {
        match self {
            Self::File(backend) => backend.store(config).await,
            Self::Cookie(backend) => backend.store(jar, config),
        }
    }

    pub(crate) async fn clear(&self, jar: &dyn CookieAccess) -> Result<(), SettingsError> {
        match self {
            Self::File(backend) => backend.clear().await,
            Self::Cookie(backend) => {
                backend.clear(jar);
                Ok(())
            },
        }
    }
}

impl From<FileBackend> for ConfigBackend {
    fn from(backend: FileBackend) -> Self {
        Self::File(backend)
    }
}

impl From<CookieBackend> for ConfigBackend {
    fn from(backend: CookieBackend) -> Self {
        Self::Cookie(backend)
    }
}
