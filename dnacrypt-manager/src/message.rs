//! Complete-message composition.
//!
//! Each part of a message is classified independently:
//!
//! | field              | protection                         |
//! |--------------------|------------------------------------|
//! | content            | confidential, signed as ciphertext |
//! | sender, receiver   | confidential + searchable          |
//! | urgency, timestamp | clear, for storage-side filtering  |

use chrono::{DateTime, Utc};
use dnacrypt_crypto::{EnvelopeBlob, SignatureBundle};
use serde::{Deserialize, Serialize};

use crate::error::ManagerResult;
use crate::field::SearchableField;
use crate::manager::EncryptionManager;

const SENDER_FIELD: &str = "sender";
const RECEIVER_FIELD: &str = "receiver";

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// A plaintext message as submitted by the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub urgency: Urgency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub content: EnvelopeBlob,
    pub sender: SearchableField,
    pub receiver: SearchableField,
    pub urgency: Urgency,
    pub timestamp: DateTime<Utc>,
    /// Signature over the raw content ciphertext.
    pub signature: SignatureBundle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub content: String,
    pub sender: String,
    pub receiver: String,
    pub urgency: Urgency,
    pub timestamp: DateTime<Utc>,
    pub signature_valid: bool,
}

impl EncryptionManager {
    pub fn encrypt_complete_message(&self, message: &Message) -> ManagerResult<EncryptedMessage> {
        let content = self.encrypt_message(&message.content)?;
        let signature = self.sign(&content.ciphertext);

        Ok(EncryptedMessage {
            sender: self.prepare_searchable(SENDER_FIELD, &message.sender)?,
            receiver: self.prepare_searchable(RECEIVER_FIELD, &message.receiver)?,
            content,
            urgency: message.urgency,
            timestamp: Utc::now(),
            signature,
        })
    }

    pub fn decrypt_complete_message(
        &self,
        encrypted: &EncryptedMessage,
    ) -> ManagerResult<DecryptedMessage> {
        let signature_valid = self.verify(&encrypted.content.ciphertext, &encrypted.signature);

        Ok(DecryptedMessage {
            content: self.decrypt_message(&encrypted.content)?,
            sender: self.decrypt_searchable(&encrypted.sender, SENDER_FIELD)?,
            receiver: self.decrypt_searchable(&encrypted.receiver, RECEIVER_FIELD)?,
            urgency: encrypted.urgency,
            timestamp: encrypted.timestamp,
            signature_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManagerConfig;

    fn manager() -> EncryptionManager {
        EncryptionManager::with_config("message-tests", ManagerConfig::test()).unwrap()
    }

    fn message() -> Message {
        Message {
            content: "Secret communication about encryption keys".into(),
            sender: "alice@dnacrypt.com".into(),
            receiver: "bob@dnacrypt.com".into(),
            urgency: Urgency::Critical,
        }
    }

    #[test]
    fn round_trip() {
        let m = manager();
        let encrypted = m.encrypt_complete_message(&message()).unwrap();
        let decrypted = m.decrypt_complete_message(&encrypted).unwrap();
        assert_eq!(decrypted.content, message().content);
        assert_eq!(decrypted.sender, "alice@dnacrypt.com");
        assert_eq!(decrypted.receiver, "bob@dnacrypt.com");
        assert_eq!(decrypted.urgency, Urgency::Critical);
        assert_eq!(decrypted.timestamp, encrypted.timestamp);
        assert!(decrypted.signature_valid);
    }

    #[test]
    fn sender_and_receiver_are_searchable() {
        let m = manager();
        let encrypted = m.encrypt_complete_message(&message()).unwrap();
        assert_eq!(encrypted.sender.index, m.search_token("Alice@DNACrypt.com"));
        assert_eq!(encrypted.receiver.index, m.search_token("bob@dnacrypt.com "));
    }

    #[test]
    fn signature_covers_ciphertext_not_plaintext() {
        let m = manager();
        let encrypted = m.encrypt_complete_message(&message()).unwrap();
        assert!(m.verify(&encrypted.content.ciphertext, &encrypted.signature));
        assert!(!m.verify(message().content.as_bytes(), &encrypted.signature));
    }

    #[test]
    fn swapped_sender_and_receiver_fail() {
        let m = manager();
        let mut encrypted = m.encrypt_complete_message(&message()).unwrap();
        std::mem::swap(&mut encrypted.sender, &mut encrypted.receiver);
        assert!(m.decrypt_complete_message(&encrypted).unwrap_err().is_authentication());
    }

    #[test]
    fn urgency_defaults_to_medium() {
        let parsed: Message =
            serde_json::from_str(r#"{"content":"c","sender":"s","receiver":"r"}"#).unwrap();
        assert_eq!(parsed.urgency, Urgency::Medium);
        assert_eq!(serde_json::to_string(&Urgency::High).unwrap(), "\"high\"");
    }
}
