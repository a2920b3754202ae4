//! Serde adapters that put byte fields on the wire as base64 text.
//!
//! Bundles cross process and storage boundaries as JSON, so every byte
//! field is a standard, padded base64 string.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{CryptoError, CryptoResult};

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(text.as_bytes())
        .map_err(|e| CryptoError::malformed(format!("invalid base64: {e}")))
}

/// Decodes base64 into a fixed-length array, rejecting any other length.
pub fn decode_array<const N: usize>(text: &str) -> CryptoResult<[u8; N]> {
    let bytes = decode(text)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::malformed(format!("expected {N} bytes, got {len}")))
}

/// `#[serde(with = "base64_bytes")]` for `Vec<u8>` fields.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "base64_array")]` for `[u8; N]` fields.
pub mod base64_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<const N: usize, S: Serializer>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_array::<N>(&text).map_err(serde::de::Error::custom)
    }
}
