//! Salted SHA-256 digests for values that need obfuscation but not secrecy.
//!
//! Unlike a blind index this is unkeyed: anyone holding the salt can test
//! guesses. Use it for low-sensitivity lookups such as date buckets.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};

pub const LOOKUP_SALT_SIZE: usize = 16;
pub const LOOKUP_HASH_SIZE: usize = 32;

/// Hex-encoded digest and the salt that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupHash {
    pub hash: String,
    pub salt: String,
}

impl LookupHash {
    /// Recomputes the digest of `value` under the stored salt and compares
    /// it in constant time.
    pub fn matches(&self, value: &str) -> CryptoResult<bool> {
        let salt = parse_salt(&self.salt)?;
        let mut stored = [0u8; LOOKUP_HASH_SIZE];
        hex::decode_to_slice(&self.hash, &mut stored)
            .map_err(|e| CryptoError::malformed(format!("invalid lookup hash: {e}")))?;
        Ok(digest(&salt, value)[..].ct_eq(&stored[..]).into())
    }
}

/// SHA-256 over `salt || value`. A random salt is drawn when none is given.
pub fn hash_for_lookup(value: &str, salt: Option<[u8; LOOKUP_SALT_SIZE]>) -> LookupHash {
    let salt = salt.unwrap_or_else(|| {
        let mut s = [0u8; LOOKUP_SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut s);
        s
    });

    LookupHash {
        hash: hex::encode(digest(&salt, value)),
        salt: hex::encode(salt),
    }
}

fn digest(salt: &[u8; LOOKUP_SALT_SIZE], value: &str) -> [u8; LOOKUP_HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

/// Parses a hex salt as stored in [`LookupHash::salt`].
pub fn parse_salt(hex_salt: &str) -> CryptoResult<[u8; LOOKUP_SALT_SIZE]> {
    let mut out = [0u8; LOOKUP_SALT_SIZE];
    hex::decode_to_slice(hex_salt, &mut out)
        .map_err(|e| CryptoError::malformed(format!("invalid lookup salt: {e}")))?;
    Ok(out)
}
