use helm_vault::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConfig {
    pub gateway_url: String,
    pub edit_mode: bool,
    pub layout: Vec<String>,
}

#[must_use]
pub fn sample_config() -> CookieConfig {
    CookieConfig {
        gateway_url: "ws://127.0.0.1:18789".into(),
        edit_mode: true,
        layout: vec!["clock".into(), "weather".into()],
    }
}

/// Key manager backed by an operator secret.
#[must_use]
pub fn keyed(secret: &str) -> KeyManager {
    KeyManager::builder().secret(Some(secret)).build()
}

/// Key manager with no secret, generating its key inside `dir`.
#[must_use]
pub fn generated(dir: &Path) -> KeyManager {
    KeyManager::builder().secret(None::<String>).key_file(dir.join("helm.key")).build()
}
