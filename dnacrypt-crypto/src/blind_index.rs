//! Deterministic blind indexes for equality search over encrypted fields.
//!
//! A token is `HMAC-SHA256(index_key, normalize(value))`. It supports
//! equality only: tokens carry no ordering, prefix or range information.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;

type HmacSha256 = Hmac<Sha256>;

/// Token length in bytes. Rendered as 64 hex characters.
pub const TOKEN_SIZE: usize = 32;

/// A fixed-length equality-search token.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlindIndexToken([u8; TOKEN_SIZE]);

impl BlindIndexToken {
    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for BlindIndexToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for BlindIndexToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlindIndexToken({})", self.to_hex())
    }
}

impl std::str::FromStr for BlindIndexToken {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        let mut out = [0u8; TOKEN_SIZE];
        hex::decode_to_slice(s, &mut out).map_err(|e| {
            CryptoError::malformed(format!("blind index must be {} hex chars: {e}", TOKEN_SIZE * 2))
        })?;
        Ok(Self(out))
    }
}

impl Serialize for BlindIndexToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlindIndexToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Lowercases, then trims surrounding whitespace.
pub fn normalize(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}

/// Computes and checks blind indexes under one index key.
#[derive(Clone)]
pub struct BlindIndexer {
    mac: HmacSha256,
}

impl BlindIndexer {
    pub fn new(index_key: &DerivedKey) -> CryptoResult<Self> {
        let mac = HmacSha256::new_from_slice(index_key.as_bytes())
            .map_err(|_| CryptoError::config("index key rejected by HMAC"))?;
        Ok(Self { mac })
    }

    /// Indexes `value` after normalization.
    pub fn index(&self, value: &str) -> BlindIndexToken {
        self.index_with(value, true)
    }

    /// Indexes `value`, normalizing only when asked.
    pub fn index_with(&self, value: &str, normalize_input: bool) -> BlindIndexToken {
        let mut mac = self.mac.clone();
        if normalize_input {
            mac.update(normalize(value).as_bytes());
        } else {
            mac.update(value.as_bytes());
        }
        let mut out = [0u8; TOKEN_SIZE];
        out.copy_from_slice(&mac.finalize().into_bytes());
        BlindIndexToken(out)
    }

    /// Checks `value` against a stored hex token in constant time.
    ///
    /// A token that is not valid hex of the right length never matches.
    pub fn verify(&self, value: &str, token: &str) -> bool {
        match token.parse::<BlindIndexToken>() {
            Ok(parsed) => self.verify_token(value, &parsed),
            Err(_) => false,
        }
    }

    pub fn verify_token(&self, value: &str, token: &BlindIndexToken) -> bool {
        let mut mac = self.mac.clone();
        mac.update(normalize(value).as_bytes());
        mac.verify_slice(token.as_bytes()).is_ok()
    }
}

impl std::fmt::Debug for BlindIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlindIndexer([REDACTED])")
    }
}
