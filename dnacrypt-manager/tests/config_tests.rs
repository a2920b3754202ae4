use dnacrypt_manager::dnacrypt_crypto::{Algorithm, CryptoError, KdfParams};
use dnacrypt_manager::ManagerConfig;
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = ManagerConfig::default();
    assert_eq!(config.algorithm, Algorithm::Aes256Gcm);
    assert_eq!(config.signing_key_id, "signing_key_v1");
    assert_eq!(config.kdf, KdfParams::default());
    config.validate().unwrap();
}

#[test]
fn json_round_trip() {
    let config = ManagerConfig {
        algorithm: Algorithm::ChaCha20Poly1305,
        signing_key_id: "signing_key_v2".into(),
        kdf: KdfParams::new(19 * 1024, 2, 1),
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("CHACHA20-POLY1305"));
    let parsed: ManagerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn missing_fields_use_defaults() {
    let parsed: ManagerConfig = serde_json::from_str(r#"{"signing_key_id":"k"}"#).unwrap();
    assert_eq!(parsed.signing_key_id, "k");
    assert_eq!(parsed.algorithm, Algorithm::Aes256Gcm);
    assert_eq!(parsed.kdf, KdfParams::default());
}

#[test]
fn unknown_algorithm_rejected_at_parse() {
    let result = serde_json::from_str::<ManagerConfig>(r#"{"algorithm":"DES"}"#);
    assert!(result.is_err());
}

#[test]
fn invalid_kdf_rejected_by_validate() {
    let config = ManagerConfig {
        kdf: KdfParams::new(1, 1, 1),
        ..ManagerConfig::default()
    };
    assert!(matches!(config.validate(), Err(CryptoError::Configuration(_))));
}
