//! The encryption manager: immutable key material plus the raw operations
//! every composite builds on.

use dnacrypt_crypto::{
    envelope, hash_for_lookup, signer, Algorithm, BlindIndexToken, BlindIndexer, DerivedKey,
    EnvelopeBlob, KeyHierarchy, LookupHash, MasterSecret, SignatureBundle, SigningKeyPair,
};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::ManagerConfig;
use crate::error::{ManagerError, ManagerResult};
use crate::private_key::{ProtectedPrivateKey, SIGNING_KEY_AAD};

// ============================================================================
// EncryptionManager
// ============================================================================

/// Owns the KEK, index key and signing key for one process.
///
/// Key material is fixed at construction and only read afterwards, so a
/// manager can be shared across threads behind `&` or `Arc` without locks.
pub struct EncryptionManager {
    keys: KeyHierarchy,
    indexer: BlindIndexer,
    signer: SigningKeyPair,
    algorithm: Algorithm,
}

impl EncryptionManager {
    /// Builds a manager with [`ManagerConfig::default`] and a fresh signing key.
    ///
    /// Fails with a configuration error if the secret is empty.
    pub fn new(master_secret: impl Into<MasterSecret>) -> ManagerResult<Self> {
        Self::builder(master_secret).build()
    }

    pub fn with_config(
        master_secret: impl Into<MasterSecret>,
        config: ManagerConfig,
    ) -> ManagerResult<Self> {
        Self::builder(master_secret).config(config).build()
    }

    pub fn builder(master_secret: impl Into<MasterSecret>) -> EncryptionManagerBuilder {
        EncryptionManagerBuilder {
            secret: master_secret.into(),
            config: ManagerConfig::default(),
            signing_key: None,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn signing_key_id(&self) -> &str {
        self.signer.key_id()
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signer.public_key_bytes()
    }

    pub(crate) fn kek(&self) -> &DerivedKey {
        self.keys.kek()
    }

    pub(crate) fn signer(&self) -> &SigningKeyPair {
        &self.signer
    }

    // ------------------------------------------------------------------------
    // Envelope
    // ------------------------------------------------------------------------

    /// Seals `plaintext` under a fresh DEK, binding `aad` (empty for none).
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> ManagerResult<EnvelopeBlob> {
        Ok(envelope::seal(self.keys.kek(), self.algorithm, plaintext, aad)?)
    }

    /// Opens an envelope sealed by this manager (or one sharing its secret).
    pub fn open(&self, blob: &EnvelopeBlob, aad: &[u8]) -> ManagerResult<Vec<u8>> {
        Ok(envelope::open(self.keys.kek(), blob, aad)?)
    }

    pub(crate) fn open_string(
        &self,
        blob: &EnvelopeBlob,
        aad: &[u8],
        what: &str,
    ) -> ManagerResult<String> {
        let plaintext = self.open(blob, aad)?;
        String::from_utf8(plaintext).map_err(|e| {
            drop(Zeroizing::new(e.into_bytes()));
            ManagerError::InvalidUtf8(what.to_string())
        })
    }

    // ------------------------------------------------------------------------
    // Message body
    // ------------------------------------------------------------------------

    /// Encrypts a message body with no associated data.
    pub fn encrypt_message(&self, plaintext: &str) -> ManagerResult<EnvelopeBlob> {
        self.seal(plaintext.as_bytes(), b"")
    }

    pub fn decrypt_message(&self, blob: &EnvelopeBlob) -> ManagerResult<String> {
        self.open_string(blob, b"", "message")
    }

    // ------------------------------------------------------------------------
    // Blind index
    // ------------------------------------------------------------------------

    /// Normalized blind index of `value`.
    pub fn index(&self, value: &str) -> BlindIndexToken {
        self.indexer.index(value)
    }

    pub fn index_with(&self, value: &str, normalize: bool) -> BlindIndexToken {
        self.indexer.index_with(value, normalize)
    }

    /// Constant-time check of `value` against a stored hex token.
    pub fn verify_index(&self, value: &str, token: &str) -> bool {
        self.indexer.verify(value, token)
    }

    /// Token to query a searchable column with.
    pub fn search_token(&self, value: &str) -> BlindIndexToken {
        self.indexer.index(value)
    }

    /// Salted, unkeyed digest for low-sensitivity lookups.
    pub fn hash_for_lookup(&self, value: &str, salt: Option<[u8; 16]>) -> LookupHash {
        hash_for_lookup(value, salt)
    }

    // ------------------------------------------------------------------------
    // Signatures
    // ------------------------------------------------------------------------

    pub fn sign(&self, data: &[u8]) -> SignatureBundle {
        self.signer.sign(data)
    }

    /// Verifies against the key embedded in the bundle. Never errors.
    pub fn verify(&self, data: &[u8], bundle: &SignatureBundle) -> bool {
        signer::verify(data, bundle)
    }

    /// Verifies and additionally requires the bundle to be from this manager.
    pub fn verify_own(&self, data: &[u8], bundle: &SignatureBundle) -> bool {
        signer::verify_with_key(data, bundle, &self.signer.public_key_bytes())
    }
}

impl std::fmt::Debug for EncryptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionManager")
            .field("algorithm", &self.algorithm)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`EncryptionManager`], for callers that persist the signing key.
pub struct EncryptionManagerBuilder {
    secret: MasterSecret,
    config: ManagerConfig,
    signing_key: Option<ProtectedPrivateKey>,
}

impl EncryptionManagerBuilder {
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Reuses a signing key previously produced by
    /// [`EncryptionManager::export_signing_key`] under the same master secret.
    pub fn signing_key(mut self, protected: ProtectedPrivateKey) -> Self {
        self.signing_key = Some(protected);
        self
    }

    pub fn build(self) -> ManagerResult<EncryptionManager> {
        self.config.validate()?;
        let keys = KeyHierarchy::derive(&self.secret, &self.config.kdf)?;
        let indexer = BlindIndexer::new(keys.index_key())?;

        let signer = match &self.signing_key {
            Some(protected) => {
                let seed = Zeroizing::new(envelope::open(
                    keys.kek(),
                    &protected.envelope,
                    SIGNING_KEY_AAD,
                )?);
                debug!(key_id = %protected.key_id, "loaded persisted signing key");
                SigningKeyPair::from_secret_bytes(&seed, protected.key_id.clone())?
            }
            None => SigningKeyPair::generate(self.config.signing_key_id.clone()),
        };

        info!(
            algorithm = %self.config.algorithm,
            key_id = signer.key_id(),
            "encryption manager initialized"
        );

        Ok(EncryptionManager {
            keys,
            indexer,
            signer,
            algorithm: self.config.algorithm,
        })
    }
}
