mod support;

use dnacrypt_manager::{FieldClass, PlainRecord, ProtectedField, RecordSchema};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use support::manager;

fn profile() -> PlainRecord {
    let value = json!({
        "user_id": "u-1001",
        "email": "Alice@DNACrypt.com",
        "display_name": "Alice Liddell",
        "phone": "+1-555-0100",
        "ssn": "123-45-6789",
        "dob": "1990-01-01",
        "role": "researcher",
        "created_at": "2024-01-01T00:00:00Z",
        "favorite_color": "blue",
        "login_count": 42
    });
    serde_json::from_value(value).unwrap()
}

#[test]
fn user_pii_round_trip() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    assert_eq!(m.decrypt_user_data(&encrypted).unwrap(), profile());
}

#[test]
fn classification_follows_schema() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();

    assert_eq!(encrypted.get("email").unwrap().class(), FieldClass::Searchable);
    assert_eq!(encrypted.get("ssn").unwrap().class(), FieldClass::ConfidentialOnly);
    assert_eq!(encrypted.get("role").unwrap().class(), FieldClass::Clear);
    // Unlisted fields fall back to confidential.
    assert_eq!(encrypted.get("favorite_color").unwrap().class(), FieldClass::ConfidentialOnly);
    assert_eq!(encrypted.get("login_count").unwrap().class(), FieldClass::ConfidentialOnly);
}

#[test]
fn searchable_email_matches_search_token() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    assert_eq!(encrypted.index_of("email"), Some(&m.search_token("alice@dnacrypt.com")));
    assert_eq!(encrypted.indexes().count(), 1);
    assert!(encrypted.index_of("ssn").is_none());
}

#[test]
fn clear_fields_are_stored_verbatim() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    assert_eq!(
        encrypted.get("user_id"),
        Some(&ProtectedField::Clear { value: json!("u-1001") })
    );
}

#[test]
fn serialized_record_contains_no_confidential_plaintext() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    let wire = serde_json::to_string(&encrypted).unwrap();
    for secret in ["Alice Liddell", "123-45-6789", "+1-555-0100", "Alice@DNACrypt.com"] {
        assert!(!wire.contains(secret), "{secret} leaked");
    }
    assert!(wire.contains("researcher"));
}

#[test]
fn record_survives_json_storage() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    let stored: Value = serde_json::to_value(&encrypted).unwrap();
    assert_eq!(stored["email"]["class"], "searchable");
    let loaded = serde_json::from_value(stored).unwrap();
    assert_eq!(m.decrypt_user_data(&loaded).unwrap(), profile());
}

#[test]
fn moving_ciphertext_between_fields_fails() {
    let m = manager("record-secret");
    let mut encrypted = m.encrypt_user_data(&profile(), &RecordSchema::user_pii()).unwrap();
    let ssn = encrypted.fields.get("ssn").cloned().unwrap();
    encrypted.fields.insert("phone".into(), ssn);
    assert!(m.decrypt_user_data(&encrypted).unwrap_err().is_authentication());
}

#[test]
fn custom_schema_with_clear_fallback() {
    let m = manager("record-secret");
    let schema = RecordSchema::new()
        .field("username", FieldClass::Searchable)
        .fallback(FieldClass::Clear);
    let record: PlainRecord =
        serde_json::from_value(json!({"username": "Bob", "theme": "dark"})).unwrap();

    let encrypted = m.encrypt_user_data(&record, &schema).unwrap();
    assert_eq!(encrypted.get("theme").unwrap().class(), FieldClass::Clear);
    assert_eq!(encrypted.index_of("username"), Some(&m.search_token("bob")));
    assert_eq!(m.decrypt_user_data(&encrypted).unwrap(), record);
}

#[test]
fn empty_record() {
    let m = manager("record-secret");
    let encrypted = m.encrypt_user_data(&PlainRecord::new(), &RecordSchema::user_pii()).unwrap();
    assert!(encrypted.fields.is_empty());
    assert!(m.decrypt_user_data(&encrypted).unwrap().is_empty());
}
