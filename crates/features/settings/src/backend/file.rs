use super::Loaded;
use crate::error::{SettingsError, SettingsErrorExt};
use helm_domain::dashboard::DashboardConfig;
use helm_storage::Storage;
use helm_vault::TokenCodec;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

/// Whole configuration as pretty JSON in the data directory. Only the gateway token is
/// encrypted, so the rest of the file stays readable and hand-editable.
#[derive(Debug, Clone)]
pub struct FileBackend {
    storage: Storage,
    file: PathBuf,
    codec: TokenCodec,
}

impl FileBackend {
    /// `file` is relative to the storage root.
    pub fn new(storage: Storage, file: impl Into<PathBuf>, codec: TokenCodec) -> Self {
        Self { storage, file: file.into(), codec }
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Reads the document and opens its token.
    ///
    /// A token that does not look encrypted is a legacy plaintext value and is returned
    /// as-is; the next store encrypts it.
    pub(crate) async fn load(&self) -> Result<Loaded, SettingsError> {
        let Some(bytes) = self.storage.read_optional(&self.file).await? else {
            return Ok(Loaded::Absent);
        };

        let mut config: DashboardConfig = serde_json::from_slice(&bytes).context("Parsing config file")?;

        if config.gateway.has_token() && TokenCodec::is_encrypted(&config.gateway.token) {
            match self.run_codec(config.gateway.token.clone(), |codec, token| codec.decrypt(&token)).await? {
                Ok(token) => config.gateway.token = token,
                Err(cause) => {
                    config.gateway.token.clear();
                    return Ok(Loaded::TokenCleared { config, cause });
                },
            }
        }

        Ok(Loaded::Intact(config))
    }

    pub(crate) async fn store(&self, config: &DashboardConfig) -> Result<DashboardConfig, SettingsError> {
        let mut persisted = config.clone();
        if persisted.gateway.has_token() {
            persisted.gateway.token = self
                .run_codec(config.gateway.token.clone(), |codec, token| codec.encrypt(&token))
                .await?
                .context("Encrypting gateway token")?;
        }

        let json = serde_json::to_vec_pretty(&persisted).context("Encoding config file")?;
        self.storage.write(&self.file, &json).await.context("Writing config file")?;

        debug!(file = %self.file.display(), has_token = config.gateway.has_token(), "Stored config file");
        Ok(config.clone())
    }

    /// Runs a token operation on the blocking pool: the first one may read or generate the
    /// key file.
    async fn run_codec<T, F>(&self, token: String, op: F) -> Result<T, SettingsError>
    where
        T: Send + 'static,
        F: FnOnce(&TokenCodec, String) -> T + Send + 'static,
    {
        let codec = self.codec.clone();
        task::spawn_blocking(move || op(&codec, token))
            .await
            .map_err(|e| SettingsError::Internal { message: e.to_string().into(), context: Some("Token codec task".into()) })
    }

    pub(crate) async fn clear(&self) -> Result<(), SettingsError> {
        let existed = self.storage.delete(&self.file).await.context("Deleting config file")?;
        debug!(file = %self.file.display(), existed, "Cleared config file");
        Ok(())
    }
}
