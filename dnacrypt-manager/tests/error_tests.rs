use dnacrypt_manager::dnacrypt_crypto::{CryptoError, ErrorKind};
use dnacrypt_manager::ManagerError;

#[test]
fn authentication_display_is_generic() {
    let err = ManagerError::from(CryptoError::Authentication);
    assert_eq!(
        err.to_string(),
        "authentication failed (wrong key, wrong context, or tampered data)"
    );
    assert!(err.is_authentication());
}

#[test]
fn configuration_display() {
    let err = ManagerError::from(CryptoError::Configuration("master secret is empty".into()));
    assert_eq!(err.to_string(), "configuration error: master secret is empty");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn malformed_display() {
    let err = ManagerError::from(CryptoError::MalformedInput("expected 12 bytes, got 3".into()));
    assert_eq!(err.to_string(), "malformed input: expected 12 bytes, got 3");
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn invalid_utf8_is_malformed() {
    let err = ManagerError::InvalidUtf8("message".into());
    assert_eq!(err.to_string(), "decrypted message is not valid UTF-8");
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert!(!err.is_authentication());
}

#[test]
fn serialization_is_malformed() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = ManagerError::from(json_err);
    assert!(err.to_string().starts_with("serialization error:"));
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}
