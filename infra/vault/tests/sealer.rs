pub mod fixtures;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fixtures::*;
use helm_vault::prelude::*;
use helm_vault::{ENCRYPTED_TAG, PLAIN_TAG};

#[test]
fn test_keyed_roundtrip() {
    let sealer = Sealer::new(keyed("sealer-secret"));
    let config = sample_config();

    let sealed = sealer.seal(&config).expect("Sealing failed");
    assert!(sealed.starts_with(ENCRYPTED_TAG));

    let opened: CookieConfig = sealer.unseal(&sealed).expect("Unsealing failed");
    assert_eq!(config, opened);
}

#[test]
fn test_unkeyed_roundtrip_is_plain_json() {
    let dir = tempfile::tempdir().unwrap();
    let sealer = Sealer::new(generated(dir.path()));
    assert!(!sealer.is_keyed());

    let sealed = sealer.seal(&sample_config()).unwrap();
    assert!(sealed.starts_with(PLAIN_TAG));

    let json = STANDARD.decode(&sealed[PLAIN_TAG.len()..]).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["gatewayUrl"], "ws://127.0.0.1:18789");

    let opened: CookieConfig = sealer.unseal(&sealed).unwrap();
    assert_eq!(opened, sample_config());
    assert!(!dir.path().join("helm.key").exists(), "plain sealing must not generate a key file");
}

#[test]
fn test_same_secret_opens_across_instances() {
    let sealed = Sealer::new(keyed("shared")).seal(&sample_config()).unwrap();
    let opened: CookieConfig = Sealer::new(keyed("shared")).unseal(&sealed).unwrap();
    assert_eq!(opened, sample_config());
}

#[test]
fn test_wrong_secret_fails_authentication() {
    let sealed = Sealer::new(keyed("one")).seal(&sample_config()).unwrap();
    let result = Sealer::new(keyed("two")).unseal::<CookieConfig>(&sealed);
    assert!(matches!(result, Err(VaultError::AuthenticationFailed { .. })));
}

#[test]
fn test_tampering_any_byte_is_detected() {
    let sealer = Sealer::new(keyed("tamper"));
    let Sealed::Encrypted(payload) = sealer.seal_value(&sample_config()).unwrap() else {
        panic!("expected encrypted payload");
    };

    for index in 0..payload.len() {
        let mut tampered = payload.clone();
        tampered[index] ^= 0x01;
        let result = sealer.open(&Sealed::Encrypted(tampered));
        assert!(
            matches!(result, Err(VaultError::AuthenticationFailed { .. })),
            "flipping byte {index} must fail authentication"
        );
    }
}

#[test]
fn test_encrypted_without_secret_is_missing_key() {
    let sealed = Sealer::new(keyed("present")).seal(&sample_config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let result = Sealer::new(generated(dir.path())).unseal::<CookieConfig>(&sealed);
    assert!(matches!(result, Err(VaultError::MissingKey { .. })));
}

#[test]
fn test_plain_payload_opens_with_secret_configured() {
    let dir = tempfile::tempdir().unwrap();
    let plain = Sealer::new(generated(dir.path())).seal(&sample_config()).unwrap();

    let opened: CookieConfig = Sealer::new(keyed("later")).unseal(&plain).unwrap();
    assert_eq!(opened, sample_config());
}

#[test]
fn test_unknown_prefix() {
    let sealer = Sealer::new(keyed("x"));
    for raw in ["x:abcd", "", "e", "{\"gateway\":{}}"] {
        let result = sealer.unseal::<serde_json::Value>(raw);
        assert!(matches!(result, Err(VaultError::UnknownFormat { .. })), "{raw:?} should be unknown");
    }
}

#[test]
fn test_malformed_bodies() {
    let sealer = Sealer::new(keyed("x"));

    let short = format!("{ENCRYPTED_TAG}{}", STANDARD.encode([0u8; 27]));
    assert!(matches!(sealer.unseal::<serde_json::Value>(&short), Err(VaultError::AuthenticationFailed { .. })));

    let not_base64 = format!("{ENCRYPTED_TAG}!!!");
    assert!(matches!(
        sealer.unseal::<serde_json::Value>(&not_base64),
        Err(VaultError::AuthenticationFailed { .. })
    ));

    let bad_plain = format!("{PLAIN_TAG}!!!");
    assert!(matches!(sealer.unseal::<serde_json::Value>(&bad_plain), Err(VaultError::InvalidFormat { .. })));

    let not_json = format!("{PLAIN_TAG}{}", STANDARD.encode(b"not json"));
    assert!(matches!(sealer.unseal::<serde_json::Value>(&not_json), Err(VaultError::Serialization { .. })));
}
