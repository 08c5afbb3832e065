use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub trait Sealed {}
}
impl private::Sealed for NoRoot {}
impl private::Sealed for WithRoot {}

/// Builder for [`Storage`]; `connect` is only available once a root is set.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct StorageBuilder<S: private::Sealed = NoRoot> {
    state: S,
    create: bool,
}

impl Default for StorageBuilder<NoRoot> {
    fn default() -> Self {
        Self { state: NoRoot, create: true }
    }
}

#[allow(private_bounds)]
impl<S: private::Sealed> StorageBuilder<S> {
    /// Whether `connect` may create a missing root. Defaults to `true`.
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        StorageBuilder { state: WithRoot(path.into()), create: self.create }
    }
}

impl StorageBuilder<WithRoot> {
    /// Prepares the root and returns the handle.
    ///
    /// Creates the directory when allowed, canonicalizes it, then sweeps stale temp
    /// files. A failed sweep is logged and does not fail the connect.
    ///
    /// # Errors
    /// [`StorageError::Io`] if the root is missing and may not be created, or cannot be
    /// resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let WithRoot(root) = self.state;

        if self.create {
            fs::create_dir_all(&root).await.context(format!("Creating data directory {}", root.display()))?;
        }

        let canonical =
            fs::canonicalize(&root).await.context(format!("Resolving data directory {}", root.display()))?;
        info!(path = %canonical.display(), "Data directory ready");

        let storage = Storage { inner: Arc::new(StorageInner { root: canonical, tmp_counter: AtomicU64::new(0) }) };
        storage.purge_tmp().await;

        Ok(storage)
    }
}
