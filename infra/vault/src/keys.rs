//! # Key Management
//!
//! [`KeyManager`] owns the single 32-byte symmetric key used by the [`Sealer`](crate::Sealer)
//! and the [`TokenCodec`](crate::TokenCodec). Resolution order:
//!
//! 1. An operator-supplied secret, hashed with SHA-256. Deterministic, no local state.
//! 2. A hex-encoded key file, if it decodes to exactly 32 bytes.
//! 3. A freshly generated key, written to the key file with owner-only permissions.
//!
//! The resolved key is cached for the lifetime of the manager. Losing the key file in
//! generated-key mode strands every token encrypted under it.

use crate::error::VaultError;
use getrandom::fill;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Default location of the generated key file, beside the dashboard config.
pub const DEFAULT_KEY_FILE: &str = "data/helm.key";

/// Raw key material. Zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Derives a key as `SHA256(secret)`.
    #[must_use]
    pub fn derive(secret: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(secret.as_ref());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest);
        Self(key)
    }

    /// Generates a key from the operating system RNG.
    ///
    /// # Errors
    /// Returns [`VaultError::Encryption`] if the system RNG is unavailable.
    pub fn generate() -> Result<Self, VaultError> {
        let mut key = [0u8; KEY_LEN];
        fill(&mut key).map_err(|e| VaultError::Encryption {
            message: format!("System RNG unavailable: {e}").into(),
            context: Some("Key generation".into()),
        })?;
        Ok(Self(key))
    }

    /// Parses a hex-encoded key; `None` unless it decodes to exactly [`KEY_LEN`] bytes.
    #[must_use]
    pub fn from_hex(encoded: &str) -> Option<Self> {
        let bytes = Zeroizing::new(hex::decode(encoded.trim()).ok()?);
        let key: [u8; KEY_LEN] = bytes.as_slice().try_into().ok()?;
        Some(Self(key))
    }

    pub(crate) fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    pub(crate) const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[derive(Debug)]
struct KeyManagerInner {
    secret_key: Option<SecretKey>,
    key_file: PathBuf,
    resolved: OnceLock<SecretKey>,
    init: Mutex<()>,
}

/// Owner of the process key.
///
/// Cheap to clone: clones share the same cache, so the key file is generated at most
/// once per manager no matter how many codecs hold a handle.
#[derive(Debug, Clone)]
pub struct KeyManager {
    inner: Arc<KeyManagerInner>,
}

impl KeyManager {
    /// Returns a new [`KeyManagerBuilder`].
    #[must_use]
    pub fn builder() -> KeyManagerBuilder {
        KeyManagerBuilder::default()
    }

    /// The key derived from the operator secret, if one was configured.
    ///
    /// This is the only key the cookie sealer uses: a sealed cookie has to stay readable
    /// by every deployment sharing the same secret, so a machine-local key file is never
    /// consulted here.
    #[must_use]
    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.inner.secret_key.as_ref()
    }

    /// Path of the key file used in generated-key mode.
    #[must_use]
    pub fn key_file(&self) -> &Path {
        &self.inner.key_file
    }

    /// Resolves the process key, generating and persisting one on first use if needed.
    ///
    /// Unreadable or malformed key files are treated as absent. A key that cannot be
    /// written back is still used for the lifetime of this manager.
    ///
    /// # Errors
    /// Returns [`VaultError::Encryption`] only if the system RNG fails during generation.
    pub fn resolve_key(&self) -> Result<&SecretKey, VaultError> {
        if let Some(key) = self.inner.resolved.get() {
            return Ok(key);
        }

        let _guard = self.inner.init.lock();
        if let Some(key) = self.inner.resolved.get() {
            return Ok(key);
        }

        let key = match &self.inner.secret_key {
            Some(key) => key.clone(),
            None => self.load_or_generate()?,
        };
        Ok(self.inner.resolved.get_or_init(|| key))
    }

    fn load_or_generate(&self) -> Result<SecretKey, VaultError> {
        let path = self.key_file();

        match fs::read_to_string(path).map(Zeroizing::new) {
            Ok(contents) => {
                if let Some(key) = SecretKey::from_hex(&contents) {
                    debug!(path = %path.display(), "Loaded key file");
                    return Ok(key);
                }
                warn!(path = %path.display(), "Key file is malformed, generating a new key");
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No key file found, generating a new key");
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Key file unreadable, generating a new key");
            },
        }

        let key = SecretKey::generate()?;
        match write_key_file(path, &key) {
            Ok(()) => info!(path = %path.display(), "Persisted generated key"),
            Err(err) => warn!(
                path = %path.display(),
                error = %err,
                "Failed to persist generated key, encrypted tokens will not survive a restart"
            ),
        }
        Ok(key)
    }
}

fn write_key_file(path: &Path, key: &SecretKey) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(key.to_hex().as_bytes())?;
    file.sync_all()
}

/// Builder for [`KeyManager`].
///
/// Holds the operator secret in zeroizing storage until [`KeyManagerBuilder::build`]
/// turns it into a derived key.
#[must_use = "Builder must be finalized with `build`"]
#[derive(Debug)]
pub struct KeyManagerBuilder {
    secret: Option<Zeroizing<String>>,
    key_file: PathBuf,
}

impl Default for KeyManagerBuilder {
    fn default() -> Self {
        Self { secret: None, key_file: PathBuf::from(DEFAULT_KEY_FILE) }
    }
}

impl KeyManagerBuilder {
    /// Sets the operator secret. Empty or whitespace-only secrets count as unset.
    pub fn secret(mut self, secret: Option<impl Into<String>>) -> Self {
        self.secret =
            secret.map(|s| Zeroizing::new(s.into())).filter(|s: &Zeroizing<String>| !s.trim().is_empty());
        self
    }

    /// Sets the key file used when no secret is configured.
    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = path.into();
        self
    }

    /// Finalizes the manager. Nothing touches the filesystem until the first
    /// [`KeyManager::resolve_key`] call.
    #[must_use]
    pub fn build(self) -> KeyManager {
        let secret_key = self.secret.as_ref().map(|s| SecretKey::derive(s.as_bytes()));

        KeyManager {
            inner: Arc::new(KeyManagerInner {
                secret_key,
                key_file: self.key_file,
                resolved: OnceLock::new(),
                init: Mutex::new(()),
            }),
        }
    }
}
