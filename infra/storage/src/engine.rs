//! The [`Storage`] handle: every path is resolved inside one canonical root, and every
//! write replaces its target atomically.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::{self, TMP_MARKER};
use crate::security;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug)]
pub(crate) struct StorageInner {
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Thread-safe handle to a sandboxed data directory. Cheap to clone.
///
/// ```rust
/// use helm_storage::{Storage, StorageError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let storage = Storage::builder().root(tmp.path().join("data")).connect().await?;
///
/// storage.write("helm-config.json", br#"{"layout":[]}"#).await?;
/// assert_eq!(storage.read("helm-config.json").await?, br#"{"layout":[]}"#);
/// assert!(storage.delete("helm-config.json").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Storage {
    #[must_use = "The storage root is not prepared until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Maps a relative path to its location under the root.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] for absolute paths, `..` escapes, or symlinks
    /// leading out of the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve(&self.inner.root, path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`] if it does not exist, [`StorageError::Io`] otherwise.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::not_found(&resolved)),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Reading {}", resolved.display()).into()),
            }),
        }
    }

    /// Like [`Storage::read`], with a missing file reported as `None`.
    ///
    /// # Errors
    /// Any failure other than absence.
    pub async fn read_optional(&self, path: impl AsRef<Path>) -> Result<Option<Vec<u8>>, StorageError> {
        match self.read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(StorageError::FileNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Replaces a file's contents atomically.
    ///
    /// Bytes go to a sibling temp file which is synced and renamed over the target, so
    /// readers observe either the old contents or the new, never a mix. Missing parent
    /// directories are created.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] or [`StorageError::Io`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await.context(format!("Creating {}", parent.display()))?;
        }

        let temp = self.tmp_path(&resolved);
        if let Err(err) = write_synced(&temp, data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io {
                source: err,
                context: Some(format!("Replacing {}", resolved.display()).into()),
            });
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File replaced");
        Ok(())
    }

    /// Removes a file. Returns whether anything was there.
    ///
    /// # Errors
    /// [`StorageError::Io`] for failures other than absence.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(true)
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Deleting {}", resolved.display()).into()),
            }),
        }
    }

    /// # Errors
    /// Path resolution failures, or I/O errors other than absence.
    pub async fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        fs::try_exists(&resolved).await.context("Checking existence")
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] or [`StorageError::Io`].
    pub async fn metadata(&self, path: impl AsRef<Path>) -> Result<std::fs::Metadata, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::metadata(&resolved).await {
            Ok(meta) => Ok(meta),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::not_found(&resolved)),
            Err(err) => Err(StorageError::Io { source: err, context: Some("Reading metadata".into()) }),
        }
    }

    /// Sweeps temp files left behind by interrupted writes. Returns how many were removed.
    pub async fn purge_tmp(&self) -> usize {
        maintenance::purge_tmp(&self.inner.root).await
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
        target.with_file_name(format!("{name}{TMP_MARKER}{}.{n}", std::process::id()))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await
        .context(format!("Creating {}", path.display()))?;
    file.write_all(data).await.context("Writing temp file")?;
    file.sync_all().await.context("Syncing temp file")
}

async fn sync_dir(path: &Path) {
    // Directory fsync is unsupported on some platforms; the rename already happened.
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}
