//! # Settings
//!
//! The dashboard configuration slice: validated patches, the [`ConfigStore`] with its file
//! and cookie backends, and (with the `server` feature) the `/config` routes.
//!
//! ## Example
//!
//! ```rust
//! use helm_settings::{ConfigPatch, ConfigStore, CookieBackend, CookieSettings, MemoryJar};
//! use helm_vault::{KeyManager, Sealer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), helm_settings::SettingsError> {
//! let sealer = Sealer::new(KeyManager::builder().secret(Some("operator-secret")).build());
//! let store = ConfigStore::new(CookieBackend::new(sealer, CookieSettings::default()));
//! let jar = MemoryJar::new();
//!
//! let patch = ConfigPatch::from_json(br#"{"gateway":{"url":"ws://h:1","token":"abc"}}"#)?;
//! store.write(&jar, patch).await?;
//!
//! assert_eq!(store.read(&jar).await.gateway.token, "abc");
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod error;
mod jar;
mod model;
mod patch;
mod store;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod router;

pub use backend::{ConfigBackend, CookieBackend, CookieSettings, FileBackend, Loaded};
pub use error::{SettingsError, SettingsErrorExt};
pub use jar::{CookieAccess, MemoryJar};
pub use model::{ConfigResponse, ConfigUpdate, DeleteResponse, GatewayUpdate, GatewayView, LayoutDocument};
pub use patch::ConfigPatch;
pub use store::ConfigStore;

#[cfg(feature = "server")]
pub use router::settings_router;

/// `OpenAPI` tag for configuration endpoints.
pub const SETTINGS_TAG: &str = "Settings";
