//! Byte-sequence encryption bound to signed, clear-text metadata.
//!
//! The metadata is the AAD of the envelope and is also covered by the
//! signature, which is taken over `ciphertext || canonical(metadata)`.
//! A verifier can therefore check integrity without the KEK, and any
//! change to either half breaks both the signature and decryption.

use std::collections::BTreeMap;

use dnacrypt_crypto::{CryptoError, EnvelopeBlob, SignatureBundle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ManagerError, ManagerResult};
use crate::manager::EncryptionManager;

/// Metadata carried in the clear alongside a sequence. Keys are kept sorted
/// so the canonical encoding does not depend on insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceMetadata(BTreeMap<String, Value>);

impl SequenceMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON with sorted keys. This is both the AAD and the signed suffix.
    pub fn canonical_bytes(&self) -> ManagerResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }
}

impl FromIterator<(String, Value)> for SequenceMetadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An encrypted sequence with its signature and clear metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedSequence {
    pub envelope: EnvelopeBlob,
    pub signature: SignatureBundle,
    pub metadata: SequenceMetadata,
}

/// Decrypted payload plus the outcome of signature verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verified<T> {
    pub value: T,
    pub signature_valid: bool,
}

fn signed_bytes(ciphertext: &[u8], aad: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ciphertext.len() + aad.len());
    out.extend_from_slice(ciphertext);
    out.extend_from_slice(aad);
    out
}

fn is_nucleotide(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')
}

impl EncryptionManager {
    pub fn encrypt_sequence(
        &self,
        data: &[u8],
        metadata: &SequenceMetadata,
    ) -> ManagerResult<SignedSequence> {
        let aad = metadata.canonical_bytes()?;
        let envelope = self.seal(data, &aad)?;
        let signature = self.sign(&signed_bytes(&envelope.ciphertext, &aad));

        Ok(SignedSequence {
            envelope,
            signature,
            metadata: metadata.clone(),
        })
    }

    /// Checks the signature over ciphertext and metadata without decrypting.
    pub fn verify_sequence(&self, sequence: &SignedSequence) -> bool {
        match sequence.metadata.canonical_bytes() {
            Ok(aad) => self.verify(
                &signed_bytes(&sequence.envelope.ciphertext, &aad),
                &sequence.signature,
            ),
            Err(_) => false,
        }
    }

    /// Decrypts and reports signature validity separately.
    ///
    /// Decryption failure is an error; an invalid signature is not.
    pub fn decrypt_and_verify_sequence(
        &self,
        sequence: &SignedSequence,
    ) -> ManagerResult<Verified<Vec<u8>>> {
        let signature_valid = self.verify_sequence(sequence);
        let aad = sequence.metadata.canonical_bytes()?;
        let value = self.open(&sequence.envelope, &aad)?;
        Ok(Verified {
            value,
            signature_valid,
        })
    }

    /// [`Self::encrypt_sequence`] for nucleotide strings (A, C, G, T, N).
    pub fn encrypt_dna_sequence(
        &self,
        sequence: &str,
        metadata: &SequenceMetadata,
    ) -> ManagerResult<SignedSequence> {
        if let Some((pos, c)) = sequence.char_indices().find(|(_, c)| !is_nucleotide(*c)) {
            return Err(CryptoError::MalformedInput(format!(
                "invalid nucleotide {c:?} at position {pos}"
            ))
            .into());
        }
        self.encrypt_sequence(sequence.as_bytes(), metadata)
    }

    pub fn decrypt_dna_sequence(
        &self,
        sequence: &SignedSequence,
    ) -> ManagerResult<Verified<String>> {
        let Verified {
            value,
            signature_valid,
        } = self.decrypt_and_verify_sequence(sequence)?;
        let value =
            String::from_utf8(value).map_err(|_| ManagerError::InvalidUtf8("sequence".into()))?;
        Ok(Verified {
            value,
            signature_valid,
        })
    }
}
