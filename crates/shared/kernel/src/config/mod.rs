use config::{Config, Environment, File, Map};
use helm_domain::config::ApiConfig;
use helm_domain::constants::{ENV_PREFIX, SECRET_ENV};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::info;

/// Base name probed when no config file is given (`helm.toml`, `helm.json`, ...).
pub const DEFAULT_CONFIG_NAME: &str = "helm";

#[helm_derive::helm_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// 1. **File**: the explicit path (required), or `helm.*` in the working directory
///    (optional).
/// 2. **Environment**: `HELM__SECTION__KEY` overrides, e.g. `HELM__SERVER__PORT=8080` or
///    `HELM__PERSISTENCE__BACKEND=cookie`.
///
/// The process environment can be swapped for a fixed map, which keeps tests free of
/// global state.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn env_source<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Deserializes any configuration shape from the layered sources.
    ///
    /// # Errors
    /// A missing explicit file, unparsable sources, or a shape mismatch with `T`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let file = match &self.file {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                File::from(path.as_path()).required(true)
            },
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        // `flatten` in `ApiConfig` bypasses string coercion, so typed values are parsed up front.
        let env =
            Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true).source(self.env.clone());

        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")
    }

    /// Loads [`ApiConfig`], falling back to `HELM_SECRET` when no secret is configured.
    ///
    /// # Errors
    /// See [`ConfigLoader::load`].
    pub fn load_api(&self) -> Result<ApiConfig, ConfigError> {
        let mut config: ApiConfig = self.load()?;

        if config.security.secret().is_none()
            && let Some(secret) = self.var(SECRET_ENV).filter(|s| !s.trim().is_empty())
        {
            config.security.secret = Some(secret);
        }

        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.env {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}
