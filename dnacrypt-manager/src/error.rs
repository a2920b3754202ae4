//! Encryption manager error types.

use dnacrypt_crypto::{CryptoError, ErrorKind};
use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors returned by [`crate::EncryptionManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("decrypted {0} is not valid UTF-8")]
    InvalidUtf8(String),
}

impl ManagerError {
    /// Maps every failure onto the three-way taxonomy callers branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto(e) => e.kind(),
            Self::Serialization(_) | Self::InvalidUtf8(_) => ErrorKind::MalformedInput,
        }
    }

    /// True when the data should be treated as tampered or undecryptable.
    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
