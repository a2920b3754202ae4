//! AEAD primitive shared by every higher-level operation.
//!
//! Both supported schemes use a 256-bit key, a 96-bit nonce and a 128-bit
//! tag, so an envelope's layout is identical whichever one sealed it.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, Nonce, Tag};
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;

/// Nonce length in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;
/// Authentication tag length in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// AEAD scheme used to seal an envelope. Serialized as its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,
    #[serde(rename = "CHACHA20-POLY1305")]
    ChaCha20Poly1305,
}

impl Algorithm {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "CHACHA20-POLY1305",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        match s {
            "AES-256-GCM" => Ok(Self::Aes256Gcm),
            "CHACHA20-POLY1305" => Ok(Self::ChaCha20Poly1305),
            other => Err(CryptoError::malformed(format!("unknown algorithm: {other}"))),
        }
    }
}

/// Draws a fresh 96-bit nonce from the OS CSPRNG.
pub fn random_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts `plaintext` under `key`, returning the ciphertext and detached tag.
pub fn seal_raw(
    algorithm: Algorithm,
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<(Vec<u8>, [u8; TAG_SIZE])> {
    match algorithm {
        Algorithm::Aes256Gcm => seal_with::<Aes256Gcm>(key, nonce, plaintext, aad),
        Algorithm::ChaCha20Poly1305 => seal_with::<ChaCha20Poly1305>(key, nonce, plaintext, aad),
    }
}

/// Decrypts and authenticates `ciphertext` with its detached `tag`.
///
/// Any failure, including a wrong key or wrong `aad`, is [`CryptoError::Authentication`].
pub fn open_raw(
    algorithm: Algorithm,
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    match algorithm {
        Algorithm::Aes256Gcm => open_with::<Aes256Gcm>(key, nonce, ciphertext, tag, aad),
        Algorithm::ChaCha20Poly1305 => {
            open_with::<ChaCha20Poly1305>(key, nonce, ciphertext, tag, aad)
        }
    }
}

fn seal_with<C>(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<(Vec<u8>, [u8; TAG_SIZE])>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::malformed("invalid key length"))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<C>::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| CryptoError::malformed("plaintext too large for AEAD"))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());
    Ok((buffer, tag_bytes))
}

fn open_with<C>(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
    aad: &[u8],
) -> CryptoResult<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::malformed("invalid key length"))?;

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        Nonce::<C>::from_slice(nonce),
        aad,
        &mut buffer,
        Tag::<C>::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::Authentication)
        }
    }
}
