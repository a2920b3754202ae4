mod support;

use dnacrypt_manager::dnacrypt_crypto::ErrorKind;
use dnacrypt_manager::{SequenceMetadata, SignedSequence, PRIVATE_KEY_AAD};
use support::manager;

fn metadata() -> SequenceMetadata {
    SequenceMetadata::new()
        .with("sample_id", "S-0042")
        .with("encoding", "binary_to_dna")
        .with("length", 24)
}

#[test]
fn dna_sequence_round_trip() {
    let m = manager("sequence-secret");
    let sealed = m.encrypt_dna_sequence("ATCGATCGATCGAAATTTGGGCCC", &metadata()).unwrap();
    assert!(m.verify_sequence(&sealed));

    let opened = m.decrypt_dna_sequence(&sealed).unwrap();
    assert_eq!(opened.value, "ATCGATCGATCGAAATTTGGGCCC");
    assert!(opened.signature_valid);
}

#[test]
fn metadata_is_stored_clear() {
    let m = manager("sequence-secret");
    let sealed = m.encrypt_dna_sequence("ACGT", &metadata()).unwrap();
    let wire = serde_json::to_value(&sealed).unwrap();
    assert_eq!(wire["metadata"]["sample_id"], "S-0042");

    let stored: SignedSequence = serde_json::from_value(wire).unwrap();
    assert_eq!(m.decrypt_dna_sequence(&stored).unwrap().value, "ACGT");
}

#[test]
fn invalid_bases_are_malformed() {
    let m = manager("sequence-secret");
    let err = m.encrypt_dna_sequence("ACGU", &metadata()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn tampered_metadata_is_detected() {
    let m = manager("sequence-secret");
    let mut sealed = m.encrypt_dna_sequence("ACGTACGT", &metadata()).unwrap();
    sealed.metadata = metadata().with("sample_id", "S-9999");
    assert!(!m.verify_sequence(&sealed));
    assert!(m.decrypt_dna_sequence(&sealed).unwrap_err().is_authentication());
}

#[test]
fn resigned_by_another_key_is_flagged_by_verify_own() {
    let owner = manager("sequence-secret");
    let forger = manager("sequence-secret");
    let mut sealed = owner.encrypt_dna_sequence("ACGT", &metadata()).unwrap();
    sealed.signature = forger.sign(b"unrelated");
    assert!(!owner.verify_sequence(&sealed));
}

#[test]
fn binary_sequence_payload() {
    let m = manager("sequence-secret");
    let payload: Vec<u8> = (0..=255).collect();
    let sealed = m.encrypt_sequence(&payload, &SequenceMetadata::new()).unwrap();
    let opened = m.decrypt_and_verify_sequence(&sealed).unwrap();
    assert_eq!(opened.value, payload);
    assert!(opened.signature_valid);
}

// ── Private keys at rest ────────────────────────────────────────

#[test]
fn private_key_round_trip() {
    let m = manager("key-secret");
    let key = [0x5au8; 32];
    let protected = m.encrypt_private_key(&key).unwrap();
    assert!(protected.key_id.starts_with("key_"));
    assert_eq!(&m.decrypt_private_key(&protected).unwrap()[..], &key[..]);
}

#[test]
fn private_key_is_bound_to_its_context() {
    let m = manager("key-secret");
    let protected = m.encrypt_private_key(b"secret key bytes").unwrap();
    assert!(m.decrypt_field_bytes(&protected.envelope, "email").unwrap_err().is_authentication());
    let as_field = std::str::from_utf8(PRIVATE_KEY_AAD).unwrap();
    assert_eq!(
        m.decrypt_field_bytes(&protected.envelope, as_field).unwrap(),
        b"secret key bytes"
    );
}

#[test]
fn signing_key_export_is_not_a_private_key_blob() {
    let m = manager("key-secret");
    let exported = m.export_signing_key().unwrap();
    assert!(m.decrypt_private_key(&exported).unwrap_err().is_authentication());
}
