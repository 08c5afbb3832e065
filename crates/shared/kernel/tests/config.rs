use helm_domain::config::{Backend, Profile};
use helm_kernel::config::{ConfigError, ConfigLoader};
use std::fs;

fn no_env() -> Vec<(&'static str, &'static str)> {
    Vec::new()
}

#[test]
fn defaults_without_file_or_env() {
    let cfg = ConfigLoader::new().env_source(no_env()).load_api().unwrap();
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.persistence.backend, Backend::File);
    assert!(cfg.security.secret().is_none());
}

#[test]
fn file_values_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helm.toml");
    fs::write(
        &path,
        r#"
[server]
port = 8443
profile = "production"

[storage]
data_dir = "/srv/helm"

[persistence]
backend = "cookie"

[persistence.cookie]
max_bytes = 2048
"#,
    )
    .unwrap();

    let cfg = ConfigLoader::new().file(&path).env_source(no_env()).load_api().unwrap();
    assert_eq!(cfg.server.port, 8443);
    assert_eq!(cfg.server.profile, Profile::Production);
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/srv/helm"));
    assert_eq!(cfg.persistence.backend, Backend::Cookie);
    assert_eq!(cfg.persistence.cookie.max_bytes, 2048);
    assert_eq!(cfg.persistence.cookie.name, "helm_config");
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("helm.json");
    fs::write(&path, r#"{ "server": { "port": 4000 } }"#).unwrap();

    let cfg = ConfigLoader::new()
        .file(&path)
        .env_source([("HELM__SERVER__PORT", "5000"), ("HELM__PERSISTENCE__BACKEND", "cookie")])
        .load_api()
        .unwrap();
    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.persistence.backend, Backend::Cookie);
}

#[test]
fn typed_environment_values_are_parsed() {
    let cfg = ConfigLoader::new()
        .env_source([
            ("HELM__SERVER__PORT", "8080"),
            ("HELM__PERSISTENCE__COOKIE__MAX_BYTES", "2048"),
            ("HELM__PERSISTENCE__COOKIE__MAX_AGE_DAYS", "30"),
            ("HELM__PERSISTENCE__COOKIE__SECURE", "true"),
            ("HELM__SECURITY__SECRET", "12345"),
        ])
        .load_api()
        .unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.persistence.cookie.max_bytes, 2048);
    assert_eq!(cfg.persistence.cookie.max_age_days, 30);
    assert_eq!(cfg.persistence.cookie.secure, Some(true));
    assert_eq!(cfg.security.secret(), Some("12345"));
}

#[test]
fn legacy_secret_variable_is_a_fallback() {
    let cfg = ConfigLoader::new().env_source([("HELM_SECRET", "from-legacy")]).load_api().unwrap();
    assert_eq!(cfg.security.secret(), Some("from-legacy"));

    let cfg = ConfigLoader::new()
        .env_source([("HELM_SECRET", "from-legacy"), ("HELM__SECURITY__SECRET", "layered")])
        .load_api()
        .unwrap();
    assert_eq!(cfg.security.secret(), Some("layered"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConfigLoader::new().file(dir.path().join("absent.toml")).env_source(no_env()).load_api();
    assert!(matches!(result, Err(ConfigError::Config { .. })));
}

#[test]
fn shape_mismatch_is_an_error() {
    let result = ConfigLoader::new().env_source([("HELM__SERVER__PORT", "not-a-port")]).load_api();
    assert!(result.is_err());
}
