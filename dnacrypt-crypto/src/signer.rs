//! Ed25519 signing and verification.
//!
//! Every signature ships with the signer's public key, so a holder of the
//! bundle alone can verify it (trust on first use). Callers that already
//! know the expected key should use [`verify_with_key`].

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::encoding::base64_bytes;
use crate::error::{CryptoError, CryptoResult};

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Ed25519 secret seed length in bytes.
pub const SECRET_KEY_SIZE: usize = 32;
/// Ed25519 signature length in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Detached signature plus what a verifier needs to check it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBundle {
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Opaque label for the caller's key-rotation bookkeeping.
    pub key_id: String,
    pub signed_at: DateTime<Utc>,
}

/// The manager's signing identity. The secret half is zeroized on drop.
pub struct SigningKeyPair {
    signing: SigningKey,
    key_id: String,
}

impl SigningKeyPair {
    pub fn generate(key_id: impl Into<String>) -> Self {
        Self {
            signing: SigningKey::generate(&mut rand::rngs::OsRng),
            key_id: key_id.into(),
        }
    }

    pub fn from_secret_bytes(bytes: &[u8], key_id: impl Into<String>) -> CryptoResult<Self> {
        let seed: Zeroizing<[u8; SECRET_KEY_SIZE]> =
            Zeroizing::new(bytes.try_into().map_err(|_| {
                CryptoError::malformed(format!(
                    "signing key must be {SECRET_KEY_SIZE} bytes, got {}",
                    bytes.len()
                ))
            })?);
        Ok(Self {
            signing: SigningKey::from_bytes(&seed),
            key_id: key_id.into(),
        })
    }

    /// Secret seed, for sealing under the KEK before persistence.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        Zeroizing::new(self.signing.to_bytes())
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.signing.verifying_key().to_bytes()
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn sign(&self, data: &[u8]) -> SignatureBundle {
        let signature = self.signing.sign(data);
        SignatureBundle {
            signature: signature.to_bytes().to_vec(),
            public_key: self.public_key_bytes().to_vec(),
            key_id: self.key_id.clone(),
            signed_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("key_id", &self.key_id)
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish()
    }
}

/// Checks `bundle` over `data` using the public key embedded in the bundle.
///
/// Returns `false` for any failure: malformed key, wrong-length signature,
/// or mismatched data.
pub fn verify(data: &[u8], bundle: &SignatureBundle) -> bool {
    let Ok(key_bytes) = <[u8; PUBLIC_KEY_SIZE]>::try_from(bundle.public_key.as_slice()) else {
        return false;
    };
    let Ok(public_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&bundle.signature) else {
        return false;
    };
    public_key.verify_strict(data, &signature).is_ok()
}

/// Like [`verify`], but also requires the bundle's key to be `expected`.
pub fn verify_with_key(
    data: &[u8],
    bundle: &SignatureBundle,
    expected: &[u8; PUBLIC_KEY_SIZE],
) -> bool {
    bundle.public_key.as_slice() == expected.as_slice() && verify(data, bundle)
}
