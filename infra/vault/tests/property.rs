use helm_vault::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn token_roundtrip_arbitrary_strings(token in any::<String>(), secret in "[a-z]{1,32}") {
        let codec = TokenCodec::new(KeyManager::builder().secret(Some(secret)).build());
        let encrypted = codec.encrypt(&token).unwrap();
        prop_assert!(TokenCodec::is_encrypted(&encrypted));
        prop_assert_eq!(codec.decrypt(&encrypted).unwrap(), token);
    }

    #[test]
    fn sealer_roundtrip_arbitrary_json(values in proptest::collection::vec(any::<i64>(), 0..256), flag in any::<bool>()) {
        let sealer = Sealer::new(KeyManager::builder().secret(Some("prop")).build());
        let value = serde_json::json!({ "values": values, "flag": flag });
        let opened: serde_json::Value = sealer.unseal(&sealer.seal(&value).unwrap()).unwrap();
        prop_assert_eq!(opened, value);
    }

    #[test]
    fn arbitrary_input_never_panics(raw in ".{0,128}") {
        let keys = KeyManager::builder().secret(Some("fuzz")).build();
        let _ = Sealer::new(keys.clone()).unseal::<serde_json::Value>(&raw);
        let _ = TokenCodec::new(keys).decrypt(&raw);
        let _ = TokenCodec::is_encrypted(&raw);
    }
}
