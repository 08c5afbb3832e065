#![allow(dead_code)]

use helm_domain::config::{ApiConfig, Backend, Profile};
use helm_settings::{ConfigStore, CookieBackend, CookieSettings};
use helm_vault::{KeyManager, Sealer};
use serde_json::{Value, json};
use std::path::Path;

pub const CONFIG_FILE: &str = "helm-config.json";

pub async fn file_store(dir: &Path, secret: Option<&str>) -> ConfigStore {
    let mut config = ApiConfig::default();
    config.storage.data_dir = dir.to_path_buf();
    config.security.secret = secret.map(str::to_owned);
    ConfigStore::from_config(&config).await.unwrap()
}

pub async fn cookie_store_from_config(secret: Option<&str>, profile: Profile) -> ConfigStore {
    let mut config = ApiConfig::default();
    config.persistence.backend = Backend::Cookie;
    config.server.profile = profile;
    config.security.secret = secret.map(str::to_owned);
    ConfigStore::from_config(&config).await.unwrap()
}

pub fn cookie_store(secret: Option<&str>) -> ConfigStore {
    let keys = KeyManager::builder().secret(secret).build();
    ConfigStore::new(CookieBackend::new(Sealer::new(keys), CookieSettings::default()))
}

pub fn read_file(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(CONFIG_FILE)).unwrap()
}

pub fn write_file(dir: &Path, document: &Value) {
    std::fs::write(dir.join(CONFIG_FILE), serde_json::to_vec_pretty(document).unwrap()).unwrap();
}

/// A layout whose sealed form is well over the cookie budget.
pub fn big_layout() -> Vec<Value> {
    (0..120)
        .map(|i| json!({ "i": format!("widget-{i}"), "x": i % 12, "y": i / 12, "w": 4, "h": 3, "kind": "sessions" }))
        .collect()
}
