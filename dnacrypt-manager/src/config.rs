//! Encryption manager configuration.
//!
//! The master secret is deliberately not part of this struct: how it is
//! sourced (env var, secret manager, prompt) is the caller's business.

use dnacrypt_crypto::{Algorithm, CryptoError, KdfParams};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::EncryptionManager`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Argon2id cost used for both the KEK and the index key.
    pub kdf: KdfParams,

    /// AEAD scheme for new envelopes. Opening follows each envelope's own label.
    pub algorithm: Algorithm,

    /// Label attached to every signature bundle.
    pub signing_key_id: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            algorithm: Algorithm::Aes256Gcm,
            signing_key_id: "signing_key_v1".to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<(), CryptoError> {
        self.kdf.validate()?;
        if self.signing_key_id.trim().is_empty() {
            return Err(CryptoError::Configuration(
                "signing key id must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Cheap KDF settings for tests. Never use outside of test code.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            kdf: KdfParams::new(64, 1, 1),
            ..Self::default()
        }
    }
}
