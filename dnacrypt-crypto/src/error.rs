//! Error taxonomy for the cryptographic core.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the cryptographic core.
///
/// Signature verification is deliberately absent: it reports a boolean.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Bad or missing master secret, or unusable KDF parameters.
    /// Raised once at construction and treated as fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// AEAD tag mismatch or wrapped-DEK unwrap failure.
    ///
    /// Carries no detail so that the failing stage cannot be told apart.
    #[error("authentication failed (wrong key, wrong context, or tampered data)")]
    Authentication,

    /// Structurally invalid input: wrong lengths, bad encoding, unknown algorithm.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Coarse classification of a [`CryptoError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    MalformedInput,
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authentication => ErrorKind::Authentication,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
