//! High-level encryption manager for DNACryptDB.
//!
//! [`EncryptionManager`] owns the key hierarchy derived from one master
//! secret plus an Ed25519 signing key, and composes the primitives from
//! [`dnacrypt_crypto`] into the operations applications call:
//!
//! - field encryption bound to the field name, optionally searchable
//! - schema-driven PII records ([`RecordSchema`])
//! - signed encrypted sequences
//! - private keys at rest
//! - complete messages with searchable participants
//!
//! Storage code should depend on [`BlobEncryptor`] instead of the manager.
//!
//! ```no_run
//! use dnacrypt_manager::EncryptionManager;
//!
//! let manager = EncryptionManager::new("correct horse battery staple")?;
//! let blob = manager.encrypt_field("alice@dnacrypt.com", "email")?;
//! assert_eq!(manager.decrypt_field(&blob, "email")?, "alice@dnacrypt.com");
//! # Ok::<(), dnacrypt_manager::ManagerError>(())
//! ```

mod config;
mod encryptor;
mod error;
mod field;
mod manager;
mod message;
mod private_key;
mod record;
mod sequence;

pub use dnacrypt_crypto;

pub use config::ManagerConfig;
pub use encryptor::BlobEncryptor;
pub use error::{ManagerError, ManagerResult};
pub use field::SearchableField;
pub use manager::{EncryptionManager, EncryptionManagerBuilder};
pub use message::{DecryptedMessage, EncryptedMessage, Message, Urgency};
pub use private_key::{ProtectedPrivateKey, PRIVATE_KEY_AAD};
pub use record::{
    EncryptedRecord, FieldClass, PlainRecord, ProtectedField, RecordSchema, ValueEncoding,
};
pub use sequence::{SequenceMetadata, SignedSequence, Verified};
