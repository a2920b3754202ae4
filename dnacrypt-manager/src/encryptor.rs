//! Opaque-bytes interface for the storage layer.
//!
//! Stores depend on `Arc<dyn BlobEncryptor>` and never see key material.
//! The `context` string (a table/column name, an entity id) is bound as
//! AAD, so a blob only decrypts under the context it was written for.

use dnacrypt_crypto::EnvelopeBlob;

use crate::error::ManagerResult;
use crate::manager::EncryptionManager;

pub trait BlobEncryptor: Send + Sync {
    /// Encrypts `data`, returning a self-describing serialized envelope.
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> ManagerResult<Vec<u8>>;

    /// Decrypts a blob previously produced by `encrypt_bytes` with the same `context`.
    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> ManagerResult<Vec<u8>>;

    /// Hex blind-index token for equality lookups.
    fn blind_index(&self, value: &str) -> String;
}

impl BlobEncryptor for EncryptionManager {
    fn encrypt_bytes(&self, context: &str, data: &[u8]) -> ManagerResult<Vec<u8>> {
        let blob = self.seal(data, context.as_bytes())?;
        Ok(serde_json::to_vec(&blob)?)
    }

    fn decrypt_bytes(&self, context: &str, data: &[u8]) -> ManagerResult<Vec<u8>> {
        let blob: EnvelopeBlob = serde_json::from_slice(data)?;
        self.open(&blob, context.as_bytes())
    }

    fn blind_index(&self, value: &str) -> String {
        self.index(value).to_string()
    }
}
