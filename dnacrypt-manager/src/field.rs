//! Field-level encryption bound to the field name.
//!
//! The field name is the AAD, so a ciphertext lifted from one column and
//! pasted into another fails authentication instead of decrypting.

use dnacrypt_crypto::{BlindIndexToken, EnvelopeBlob};
use serde::{Deserialize, Serialize};

use crate::error::ManagerResult;
use crate::manager::EncryptionManager;

/// A confidential value that also supports equality search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableField {
    pub ciphertext: EnvelopeBlob,
    pub index: BlindIndexToken,
}

impl EncryptionManager {
    pub fn encrypt_field(&self, value: &str, field_name: &str) -> ManagerResult<EnvelopeBlob> {
        self.encrypt_field_bytes(value.as_bytes(), field_name)
    }

    /// Fails authentication unless `field_name` matches the one used to encrypt.
    pub fn decrypt_field(&self, blob: &EnvelopeBlob, field_name: &str) -> ManagerResult<String> {
        self.open_string(blob, field_name.as_bytes(), field_name)
    }

    pub fn encrypt_field_bytes(
        &self,
        value: &[u8],
        field_name: &str,
    ) -> ManagerResult<EnvelopeBlob> {
        self.seal(value, field_name.as_bytes())
    }

    pub fn decrypt_field_bytes(
        &self,
        blob: &EnvelopeBlob,
        field_name: &str,
    ) -> ManagerResult<Vec<u8>> {
        self.open(blob, field_name.as_bytes())
    }

    /// Encrypts `value` under `field_name` and indexes its normalized form.
    pub fn prepare_searchable(
        &self,
        field_name: &str,
        value: &str,
    ) -> ManagerResult<SearchableField> {
        Ok(SearchableField {
            ciphertext: self.encrypt_field(value, field_name)?,
            index: self.index(value),
        })
    }

    /// Decrypts the ciphertext half. The index is never consulted.
    pub fn decrypt_searchable(
        &self,
        field: &SearchableField,
        field_name: &str,
    ) -> ManagerResult<String> {
        self.decrypt_field(&field.ciphertext, field_name)
    }
}
