//! Cryptographic core for DNACryptDB.
//!
//! Provides the primitives the encryption manager composes:
//! - Argon2id key derivation into a domain-separated KEK and index key
//! - Envelope encryption (AES-256-GCM or ChaCha20-Poly1305) with one-time DEKs
//! - HMAC-SHA256 blind indexes for equality search
//! - Ed25519 signatures that carry their own public key
//!
//! # Key hierarchy
//!
//! ```text
//! MasterSecret
//!     ├── KEK (Argon2id, salt "dnacrypt_kek_salt_v1")
//!     │       └── DEK (random, one per sealed item, stored wrapped)
//!     └── IndexKey (Argon2id, salt "dnacrypt_index_salt_v1")
//! ```
//!
//! All operations are pure functions of immutable key material and their
//! inputs, so every type here is safe to share across threads.

pub mod blind_index;
pub mod cipher;
pub mod encoding;
pub mod envelope;
mod error;
mod key;
pub mod lookup;
pub mod signer;

pub use blind_index::{BlindIndexToken, BlindIndexer, TOKEN_SIZE};
pub use cipher::{random_nonce, Algorithm, NONCE_SIZE, TAG_SIZE};
pub use envelope::{open, seal, unwrap_dek, wrap_dek, EnvelopeBlob, WrappedDek, WRAPPED_DEK_SIZE};
pub use error::{CryptoError, CryptoResult, ErrorKind};
pub use key::{
    derive_key, generate_random_key, DerivedKey, KdfParams, KeyHierarchy, KeyPurpose,
    MasterSecret, KEY_SIZE,
};
pub use lookup::{hash_for_lookup, LookupHash};
pub use signer::{verify, verify_with_key, SignatureBundle, SigningKeyPair};
