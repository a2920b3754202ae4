//! Envelope encryption with one-time data-encryption keys.
//!
//! Every `seal` draws a fresh DEK and nonce, encrypts the payload under
//! the DEK, then wraps the DEK under the long-lived KEK. The KEK therefore
//! only ever encrypts 32-byte keys, never bulk data.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::cipher::{open_raw, random_nonce, seal_raw, Algorithm, NONCE_SIZE, TAG_SIZE};
use crate::encoding::{base64_array, base64_bytes};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{generate_random_key, DerivedKey, KEY_SIZE};

/// Size of a wrapped DEK: nonce, encrypted key, tag.
pub const WRAPPED_DEK_SIZE: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// A DEK sealed under the KEK, laid out as `nonce || ciphertext || tag`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedDek(#[serde(with = "base64_array")] [u8; WRAPPED_DEK_SIZE]);

impl WrappedDek {
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; WRAPPED_DEK_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::malformed(format!(
                "wrapped DEK must be {WRAPPED_DEK_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; WRAPPED_DEK_SIZE] {
        &self.0
    }

    pub fn nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&self.0[..NONCE_SIZE]);
        nonce
    }

    fn parts(&self) -> ([u8; NONCE_SIZE], &[u8], [u8; TAG_SIZE]) {
        let (nonce, rest) = self.0.split_at(NONCE_SIZE);
        let (ciphertext, tag) = rest.split_at(KEY_SIZE);
        let mut n = [0u8; NONCE_SIZE];
        n.copy_from_slice(nonce);
        let mut t = [0u8; TAG_SIZE];
        t.copy_from_slice(tag);
        (n, ciphertext, t)
    }
}

/// Self-describing output of [`seal`].
///
/// `ciphertext` and `tag` are one AEAD output kept apart so the tag length
/// is explicit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeBlob {
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_array")]
    pub nonce: [u8; NONCE_SIZE],
    #[serde(with = "base64_array")]
    pub tag: [u8; TAG_SIZE],
    pub wrapped_dek: WrappedDek,
    pub algorithm_id: Algorithm,
}

impl EnvelopeBlob {
    pub fn to_json(&self) -> CryptoResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CryptoError::malformed(format!("envelope encoding failed: {e}")))
    }

    /// Parses a JSON envelope. Bad base64, wrong lengths and unknown
    /// algorithm labels are all [`CryptoError::MalformedInput`].
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CryptoError::malformed(format!("invalid envelope: {e}")))
    }
}

/// Wraps a DEK under the KEK with its own random nonce and no AAD.
pub fn wrap_dek(
    kek: &DerivedKey,
    dek: &DerivedKey,
    algorithm: Algorithm,
) -> CryptoResult<WrappedDek> {
    let nonce = random_nonce();
    let (ciphertext, tag) = seal_raw(algorithm, kek, &nonce, dek.as_bytes(), b"")?;

    let mut out = [0u8; WRAPPED_DEK_SIZE];
    out[..NONCE_SIZE].copy_from_slice(&nonce);
    out[NONCE_SIZE..NONCE_SIZE + KEY_SIZE].copy_from_slice(&ciphertext);
    out[NONCE_SIZE + KEY_SIZE..].copy_from_slice(&tag);
    Ok(WrappedDek(out))
}

/// Recovers a DEK previously produced by [`wrap_dek`].
pub fn unwrap_dek(
    kek: &DerivedKey,
    wrapped: &WrappedDek,
    algorithm: Algorithm,
) -> CryptoResult<DerivedKey> {
    let (nonce, ciphertext, tag) = wrapped.parts();
    let plaintext = Zeroizing::new(open_raw(algorithm, kek, &nonce, ciphertext, &tag, b"")?);
    DerivedKey::from_slice(&plaintext).map_err(|_| CryptoError::Authentication)
}

/// Encrypts `plaintext` under a fresh DEK bound to `aad` (empty for none).
pub fn seal(
    kek: &DerivedKey,
    algorithm: Algorithm,
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<EnvelopeBlob> {
    let dek = generate_random_key();
    let nonce = random_nonce();
    let (ciphertext, tag) = seal_raw(algorithm, &dek, &nonce, plaintext, aad)?;
    let wrapped_dek = wrap_dek(kek, &dek, algorithm)?;

    Ok(EnvelopeBlob {
        ciphertext,
        nonce,
        tag,
        wrapped_dek,
        algorithm_id: algorithm,
    })
}

/// Decrypts an envelope produced by [`seal`] with the same `aad`.
///
/// The DEK is unwrapped first. If that fails, the payload open still runs
/// under a fixed all-zero key so both failure stages follow the same path and
/// surface as the same [`CryptoError::Authentication`]. The fallback key is
/// built on every call, successful or not.
pub fn open(kek: &DerivedKey, blob: &EnvelopeBlob, aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let algorithm = blob.algorithm_id;
    let fallback = DerivedKey::from_bytes([0u8; KEY_SIZE]);
    let (dek, unwrapped) = match unwrap_dek(kek, &blob.wrapped_dek, algorithm) {
        Ok(dek) => (dek, true),
        Err(_) => (fallback, false),
    };

    let opened = open_raw(algorithm, &dek, &blob.nonce, &blob.ciphertext, &blob.tag, aad);
    match (unwrapped, opened) {
        (true, Ok(plaintext)) => Ok(plaintext),
        (false, Ok(mut plaintext)) => {
            plaintext.zeroize();
            Err(CryptoError::Authentication)
        }
        (_, Err(_)) => {
            debug!(algorithm = %algorithm, "envelope failed authentication");
            Err(CryptoError::Authentication)
        }
    }
}
