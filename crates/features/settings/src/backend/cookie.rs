use super::Loaded;
use crate::error::{SettingsError, SettingsErrorExt};
use crate::jar::CookieAccess;
use helm_domain::config::{CookieConfig, Profile};
use helm_domain::constants::{COOKIE_MAX_AGE_DAYS, COOKIE_MAX_BYTES, COOKIE_NAME};
use helm_domain::dashboard::DashboardConfig;
use helm_vault::Sealer;
use tower_cookies::Cookie;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tracing::{debug, warn};

/// Name and attributes of the config cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    /// Budget for the sealed value, in bytes.
    pub max_bytes: usize,
    pub max_age_days: i64,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: COOKIE_NAME.to_owned(),
            max_bytes: COOKIE_MAX_BYTES,
            max_age_days: COOKIE_MAX_AGE_DAYS,
            secure: false,
        }
    }
}

impl CookieSettings {
    #[must_use]
    pub fn from_config(config: &CookieConfig, profile: Profile) -> Self {
        Self {
            name: config.name.clone(),
            max_bytes: config.max_bytes,
            max_age_days: config.max_age_days,
            secure: config.secure_for(profile),
        }
    }
}

/// Whole configuration sealed into one HTTP-only cookie. No server-side state.
///
/// When the sealed document outgrows [`CookieSettings::max_bytes`] the layout and edit mode
/// are dropped and only the gateway credentials are kept: a lost layout can be rebuilt by
/// hand, a lost token cannot.
#[derive(Debug, Clone)]
pub struct CookieBackend {
    sealer: Sealer,
    settings: CookieSettings,
}

impl CookieBackend {
    pub fn new(sealer: Sealer, settings: CookieSettings) -> Self {
        if !sealer.is_keyed() {
            warn!(cookie = %settings.name, "No secret configured, config cookies will only be base64-encoded");
        }
        Self { sealer, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &CookieSettings {
        &self.settings
    }

    pub(crate) fn load(&self, jar: &dyn CookieAccess) -> Result<Loaded, SettingsError> {
        let Some(raw) = jar.get(&self.settings.name) else {
            return Ok(Loaded::Absent);
        };
        let config: DashboardConfig = self.sealer.unseal(&raw).context("Opening config cookie")?;
        Ok(Loaded::Intact(config))
    }

    pub(crate) fn store(
        &self,
        jar: &dyn CookieAccess,
        config: &DashboardConfig,
    ) -> Result<DashboardConfig, SettingsError> {
        let mut persisted = config.clone();
        let mut sealed = self.sealer.seal(&persisted).context("Sealing config cookie")?;

        if sealed.len() > self.settings.max_bytes {
            let full = sealed.len();
            persisted = config.credentials_only();
            sealed = self.sealer.seal(&persisted).context("Sealing reduced config cookie")?;
            warn!(
                cookie = %self.settings.name,
                full,
                reduced = sealed.len(),
                budget = self.settings.max_bytes,
                "Config cookie over budget, dropped layout and kept credentials"
            );
            if sealed.len() > self.settings.max_bytes {
                warn!(cookie = %self.settings.name, size = sealed.len(), "Reduced config cookie is still over budget");
            }
        }

        debug!(cookie = %self.settings.name, size = sealed.len(), "Stored config cookie");
        jar.set(self.cookie(sealed));
        Ok(persisted)
    }

    pub(crate) fn clear(&self, jar: &dyn CookieAccess) {
        jar.remove(&self.settings.name);
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.settings.name.clone(), value))
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(Duration::days(self.settings.max_age_days))
            .secure(self.settings.secure)
            .build()
    }
}
