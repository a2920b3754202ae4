//! Key derivation and the KEK / index-key hierarchy.
//!
//! The master secret is stretched with Argon2id twice, once per purpose,
//! under fixed domain-separation salts. The two outputs are computationally
//! independent, so blind-index tokens can be handed to an untrusted store
//! without weakening the key-encryption key.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, CryptoResult};

/// Length of every symmetric key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

const KEK_SALT: &[u8] = b"dnacrypt_kek_salt_v1";
const INDEX_SALT: &[u8] = b"dnacrypt_index_salt_v1";

/// The caller's master secret. Held only long enough to derive keys.
pub struct MasterSecret(Zeroizing<Vec<u8>>);

impl MasterSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MasterSecret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for MasterSecret {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<&[u8]> for MasterSecret {
    fn from(b: &[u8]) -> Self {
        Self::new(b)
    }
}

impl From<Vec<u8>> for MasterSecret {
    fn from(b: Vec<u8>) -> Self {
        Self::new(b)
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterSecret([REDACTED])")
    }
}

/// A 256-bit symmetric key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, rejecting anything that is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::malformed(format!(
                "key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Generates a random 256-bit key from the OS CSPRNG.
pub fn generate_random_key() -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let key = DerivedKey(bytes);
    bytes.zeroize();
    key
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Checks the parameters without deriving anything.
    pub fn validate(&self) -> CryptoResult<()> {
        self.to_argon2().map(|_| ())
    }

    fn to_argon2(&self) -> CryptoResult<Params> {
        if self.iterations == 0 {
            return Err(CryptoError::config("KDF iteration count must be at least 1"));
        }
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::config(format!("invalid KDF parameters: {e}")))
    }
}

/// What a derived key is for. Each purpose has its own fixed salt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPurpose {
    KeyEncryption,
    BlindIndex,
}

impl KeyPurpose {
    pub fn salt(&self) -> &'static [u8] {
        match self {
            Self::KeyEncryption => KEK_SALT,
            Self::BlindIndex => INDEX_SALT,
        }
    }
}

/// Derives a 256-bit key from `secret` under `purpose_salt` with Argon2id.
pub fn derive_key(
    secret: &MasterSecret,
    purpose_salt: &[u8],
    params: &KdfParams,
) -> CryptoResult<DerivedKey> {
    if secret.is_empty() {
        return Err(CryptoError::config("master secret is empty"));
    }

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut output = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(secret.as_bytes(), purpose_salt, &mut *output)
        .map_err(|e| CryptoError::config(format!("key derivation failed: {e}")))?;

    Ok(DerivedKey(*output))
}

/// The two long-lived symmetric keys derived from one master secret.
pub struct KeyHierarchy {
    kek: DerivedKey,
    index_key: DerivedKey,
}

impl KeyHierarchy {
    pub fn derive(secret: &MasterSecret, params: &KdfParams) -> CryptoResult<Self> {
        let kek = derive_key(secret, KeyPurpose::KeyEncryption.salt(), params)?;
        let index_key = derive_key(secret, KeyPurpose::BlindIndex.salt(), params)?;

        if kek.as_bytes() == index_key.as_bytes() {
            return Err(CryptoError::config(
                "key-encryption key and index key collided",
            ));
        }

        Ok(Self { kek, index_key })
    }

    pub fn kek(&self) -> &DerivedKey {
        &self.kek
    }

    pub fn index_key(&self) -> &DerivedKey {
        &self.index_key
    }
}

impl std::fmt::Debug for KeyHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHierarchy")
            .field("kek", &"[REDACTED]")
            .field("index_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::new(64, 1, 1)
    }

    #[test]
    fn derive_is_deterministic() {
        let secret = MasterSecret::from("test_master_key_123");
        let k1 = derive_key(&secret, KEK_SALT, &fast()).unwrap();
        let k2 = derive_key(&secret, KEK_SALT, &fast()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn purposes_yield_independent_keys() {
        let secret = MasterSecret::from("test_master_key_123");
        let hierarchy = KeyHierarchy::derive(&secret, &fast()).unwrap();
        assert_ne!(hierarchy.kek().as_bytes(), hierarchy.index_key().as_bytes());
    }

    #[test]
    fn different_secrets_yield_different_keys() {
        let a = derive_key(&MasterSecret::from("alpha"), KEK_SALT, &fast()).unwrap();
        let b = derive_key(&MasterSecret::from("bravo"), KEK_SALT, &fast()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn empty_secret_is_configuration_error() {
        let err = derive_key(&MasterSecret::from(""), KEK_SALT, &fast()).unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = KdfParams::new(64, 0, 1).validate().unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
    }

    #[test]
    fn memory_below_lane_minimum_rejected() {
        // Argon2 needs at least 8 KiB per lane.
        assert!(KdfParams::new(8, 1, 4).validate().is_err());
    }

    #[test]
    fn default_params_are_valid() {
        KdfParams::default().validate().unwrap();
    }

    #[test]
    fn debug_redacts_material() {
        let secret = MasterSecret::from("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
        let key = generate_random_key();
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(DerivedKey::from_slice(&[0u8; 31]).is_err());
        assert!(DerivedKey::from_slice(&[0u8; 32]).is_ok());
    }
}
