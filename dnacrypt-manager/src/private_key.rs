//! Private keys at rest.
//!
//! A protected key is an ordinary envelope under a fixed AAD label. The
//! stored artifact is useless without the KEK, and the label keeps it from
//! being confused with any other field ciphertext.

use chrono::{DateTime, Utc};
use dnacrypt_crypto::EnvelopeBlob;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::ManagerResult;
use crate::manager::EncryptionManager;

/// AAD for caller-supplied private keys.
pub const PRIVATE_KEY_AAD: &[u8] = b"private_key";

/// AAD for the manager's own exported signing key.
pub(crate) const SIGNING_KEY_AAD: &[u8] = b"signing_key";

/// An encrypted private key and its bookkeeping label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtectedPrivateKey {
    pub envelope: EnvelopeBlob,
    pub key_id: String,
    pub created_at: DateTime<Utc>,
}

impl EncryptionManager {
    pub fn encrypt_private_key(&self, key_bytes: &[u8]) -> ManagerResult<ProtectedPrivateKey> {
        Ok(ProtectedPrivateKey {
            envelope: self.seal(key_bytes, PRIVATE_KEY_AAD)?,
            key_id: format!("key_{}", Uuid::now_v7()),
            created_at: Utc::now(),
        })
    }

    pub fn decrypt_private_key(
        &self,
        protected: &ProtectedPrivateKey,
    ) -> ManagerResult<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(self.open(&protected.envelope, PRIVATE_KEY_AAD)?))
    }

    /// Seals this manager's signing key under the KEK so the caller can
    /// persist it and reload it with
    /// [`crate::EncryptionManagerBuilder::signing_key`].
    pub fn export_signing_key(&self) -> ManagerResult<ProtectedPrivateKey> {
        let seed = self.signer().secret_bytes();
        Ok(ProtectedPrivateKey {
            envelope: self.seal(seed.as_slice(), SIGNING_KEY_AAD)?,
            key_id: self.signing_key_id().to_string(),
            created_at: Utc::now(),
        })
    }
}
