//! Record-level (PII) protection driven by a per-field classification.
//!
//! Each field of a record is classified once in a [`RecordSchema`] and the
//! encrypted form carries that class as a variant of [`ProtectedField`].
//! Storage layers that want flat columns use [`EncryptedRecord::to_columns`],
//! which writes `<field>_encrypted`, `<field>_index` and, for non-string
//! values, `<field>_encoding` next to clear values. Those suffixes are
//! reserved: a record whose field names would collide is rejected.

use std::collections::BTreeMap;

use dnacrypt_crypto::{BlindIndexToken, CryptoError, EnvelopeBlob};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::ManagerResult;
use crate::manager::EncryptionManager;

/// A plaintext record as the application sees it.
pub type PlainRecord = BTreeMap<String, Value>;

/// How a field is protected at rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Stored as-is, available to storage-side filters and range queries.
    Clear,
    /// Encrypted, no search support.
    ConfidentialOnly,
    /// Encrypted plus a blind index for equality lookups.
    Searchable,
}

/// Field name to [`FieldClass`] mapping.
///
/// Fields the schema does not name fall back to `ConfidentialOnly` unless
/// configured otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    fields: BTreeMap<String, FieldClass>,
    fallback: FieldClass,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            fallback: FieldClass::ConfidentialOnly,
        }
    }
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, class: FieldClass) -> Self {
        self.fields.insert(name.into(), class);
        self
    }

    pub fn fallback(mut self, class: FieldClass) -> Self {
        self.fallback = class;
        self
    }

    pub fn class_of(&self, name: &str) -> FieldClass {
        self.fields.get(name).copied().unwrap_or(self.fallback)
    }

    /// The user-profile layout: email is searchable, contact and identity
    /// details are confidential, bookkeeping columns stay clear.
    pub fn user_pii() -> Self {
        let mut schema = Self::new().field("email", FieldClass::Searchable);
        for name in ["display_name", "phone", "address", "ssn", "dob"] {
            schema = schema.field(name, FieldClass::ConfidentialOnly);
        }
        for name in ["user_id", "role", "created_at"] {
            schema = schema.field(name, FieldClass::Clear);
        }
        schema
    }
}

/// How a confidential value's plaintext bytes are laid out.
///
/// Strings are sealed as raw UTF-8, exactly like
/// [`EncryptionManager::encrypt_field`], so a record column and a
/// standalone field ciphertext open the same way. Anything else is sealed
/// as its JSON encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueEncoding {
    #[default]
    Text,
    Json,
}

impl ValueEncoding {
    fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::Text,
            _ => Self::Json,
        }
    }

    fn is_text(&self) -> bool {
        *self == Self::Text
    }
}

/// One field of an [`EncryptedRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ProtectedField {
    Clear {
        value: Value,
    },
    Searchable {
        ciphertext: EnvelopeBlob,
        index: BlindIndexToken,
        #[serde(default, skip_serializing_if = "ValueEncoding::is_text")]
        encoding: ValueEncoding,
    },
    ConfidentialOnly {
        ciphertext: EnvelopeBlob,
        #[serde(default, skip_serializing_if = "ValueEncoding::is_text")]
        encoding: ValueEncoding,
    },
}

impl ProtectedField {
    pub fn class(&self) -> FieldClass {
        match self {
            Self::Clear { .. } => FieldClass::Clear,
            Self::Searchable { .. } => FieldClass::Searchable,
            Self::ConfidentialOnly { .. } => FieldClass::ConfidentialOnly,
        }
    }

    pub fn index(&self) -> Option<&BlindIndexToken> {
        match self {
            Self::Searchable { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn ciphertext(&self) -> Option<&EnvelopeBlob> {
        match self {
            Self::Clear { .. } => None,
            Self::Searchable { ciphertext, .. } | Self::ConfidentialOnly { ciphertext, .. } => {
                Some(ciphertext)
            }
        }
    }

    /// Storage column names this field occupies in [`EncryptedRecord::to_columns`].
    fn columns(&self, name: &str) -> Vec<String> {
        let (mut columns, encoding) = match self {
            Self::Clear { .. } => return vec![name.to_string()],
            Self::Searchable { encoding, .. } => {
                (vec![encrypted_column(name), index_column(name)], encoding)
            }
            Self::ConfidentialOnly { encoding, .. } => (vec![encrypted_column(name)], encoding),
        };
        if !encoding.is_text() {
            columns.push(encoding_column(name));
        }
        columns
    }
}

/// A record ready for an untrusted store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedRecord {
    pub fields: BTreeMap<String, ProtectedField>,
}

impl EncryptedRecord {
    pub fn get(&self, name: &str) -> Option<&ProtectedField> {
        self.fields.get(name)
    }

    /// Blind index for a searchable field, for the storage layer to key on.
    pub fn index_of(&self, name: &str) -> Option<&BlindIndexToken> {
        self.fields.get(name).and_then(ProtectedField::index)
    }

    pub fn indexes(&self) -> impl Iterator<Item = (&str, &BlindIndexToken)> {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.index().map(|idx| (name.as_str(), idx)))
    }

    /// Flattens into storage columns: clear values under their own name,
    /// `<field>_encrypted` for ciphertexts, `<field>_index` for tokens and
    /// `<field>_encoding` for non-string confidential values.
    ///
    /// Fails with `MalformedInput` when two fields would claim the same column.
    pub fn to_columns(&self) -> ManagerResult<BTreeMap<String, Value>> {
        check_columns(&self.fields)?;

        let mut columns = BTreeMap::new();
        for (name, field) in &self.fields {
            match field {
                ProtectedField::Clear { value } => {
                    columns.insert(name.clone(), value.clone());
                }
                ProtectedField::Searchable {
                    ciphertext,
                    index,
                    encoding,
                } => {
                    columns.insert(encrypted_column(name), serde_json::to_value(ciphertext)?);
                    columns.insert(index_column(name), Value::String(index.to_hex()));
                    if !encoding.is_text() {
                        columns.insert(encoding_column(name), serde_json::to_value(encoding)?);
                    }
                }
                ProtectedField::ConfidentialOnly {
                    ciphertext,
                    encoding,
                } => {
                    columns.insert(encrypted_column(name), serde_json::to_value(ciphertext)?);
                    if !encoding.is_text() {
                        columns.insert(encoding_column(name), serde_json::to_value(encoding)?);
                    }
                }
            }
        }
        Ok(columns)
    }

    /// Inverse of [`Self::to_columns`]. `_index` and `_encoding` columns only
    /// count as field metadata when the matching `_encrypted` column is
    /// present; otherwise they are ordinary clear fields.
    pub fn from_columns(columns: &BTreeMap<String, Value>) -> ManagerResult<Self> {
        let has_ciphertext = |name: &str| columns.contains_key(&encrypted_column(name));

        let mut fields = BTreeMap::new();
        for (column, value) in columns {
            if let Some(name) = column.strip_suffix(ENCRYPTED_SUFFIX) {
                let ciphertext: EnvelopeBlob = serde_json::from_value(value.clone())?;
                let encoding = match columns.get(&encoding_column(name)) {
                    Some(encoding) => serde_json::from_value(encoding.clone())?,
                    None => ValueEncoding::Text,
                };
                let field = match columns.get(&index_column(name)) {
                    Some(index) => ProtectedField::Searchable {
                        ciphertext,
                        index: serde_json::from_value(index.clone())?,
                        encoding,
                    },
                    None => ProtectedField::ConfidentialOnly {
                        ciphertext,
                        encoding,
                    },
                };
                insert_unique(&mut fields, name, field)?;
            } else if [INDEX_SUFFIX, ENCODING_SUFFIX]
                .into_iter()
                .filter_map(|suffix| column.strip_suffix(suffix))
                .any(has_ciphertext)
            {
                continue;
            } else {
                let field = ProtectedField::Clear {
                    value: value.clone(),
                };
                insert_unique(&mut fields, column, field)?;
            }
        }

        // A clear column named like another field's metadata is ambiguous.
        check_columns(&fields)?;
        Ok(Self { fields })
    }
}

const ENCRYPTED_SUFFIX: &str = "_encrypted";
const INDEX_SUFFIX: &str = "_index";
const ENCODING_SUFFIX: &str = "_encoding";

fn encrypted_column(name: &str) -> String {
    format!("{name}{ENCRYPTED_SUFFIX}")
}

fn index_column(name: &str) -> String {
    format!("{name}{INDEX_SUFFIX}")
}

fn encoding_column(name: &str) -> String {
    format!("{name}{ENCODING_SUFFIX}")
}

fn insert_unique(
    fields: &mut BTreeMap<String, ProtectedField>,
    name: &str,
    field: ProtectedField,
) -> ManagerResult<()> {
    if fields.insert(name.to_string(), field).is_some() {
        return Err(CryptoError::MalformedInput(format!(
            "field `{name}` appears both clear and encrypted"
        ))
        .into());
    }
    Ok(())
}

/// Rejects field sets where two fields map onto the same storage column,
/// e.g. a clear `email_index` next to a searchable `email`.
fn check_columns(fields: &BTreeMap<String, ProtectedField>) -> ManagerResult<()> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for (name, field) in fields {
        for column in field.columns(name) {
            if let Some(other) = owners.insert(column.clone(), name) {
                return Err(CryptoError::MalformedInput(format!(
                    "fields `{other}` and `{name}` both map to column `{column}`"
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// String form used for indexing: strings as-is, anything else as JSON.
fn index_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl EncryptionManager {
    /// Protects every field of `record` according to `schema`.
    pub fn encrypt_user_data(
        &self,
        record: &PlainRecord,
        schema: &RecordSchema,
    ) -> ManagerResult<EncryptedRecord> {
        let mut fields = BTreeMap::new();
        for (name, value) in record {
            let protected = self.protect_value(name, value, schema.class_of(name))?;
            fields.insert(name.clone(), protected);
        }
        check_columns(&fields)?;
        debug!(fields = fields.len(), "encrypted record");
        Ok(EncryptedRecord { fields })
    }

    /// Rebuilds the plaintext record from ciphertexts and clear values.
    /// Blind indexes are write-only artifacts and are ignored.
    pub fn decrypt_user_data(&self, encrypted: &EncryptedRecord) -> ManagerResult<PlainRecord> {
        encrypted
            .fields
            .iter()
            .map(|(name, field)| -> ManagerResult<(String, Value)> {
                Ok((name.clone(), self.reveal_value(name, field)?))
            })
            .collect()
    }

    pub fn protect_value(
        &self,
        name: &str,
        value: &Value,
        class: FieldClass,
    ) -> ManagerResult<ProtectedField> {
        Ok(match class {
            FieldClass::Clear => ProtectedField::Clear {
                value: value.clone(),
            },
            FieldClass::ConfidentialOnly => ProtectedField::ConfidentialOnly {
                ciphertext: self.seal_value(name, value)?,
                encoding: ValueEncoding::of(value),
            },
            FieldClass::Searchable => ProtectedField::Searchable {
                ciphertext: self.seal_value(name, value)?,
                index: self.index(&index_text(value)),
                encoding: ValueEncoding::of(value),
            },
        })
    }

    pub fn reveal_value(&self, name: &str, field: &ProtectedField) -> ManagerResult<Value> {
        match field {
            ProtectedField::Clear { value } => Ok(value.clone()),
            ProtectedField::Searchable {
                ciphertext,
                encoding,
                ..
            }
            | ProtectedField::ConfidentialOnly {
                ciphertext,
                encoding,
            } => match encoding {
                ValueEncoding::Text => Ok(Value::String(self.decrypt_field(ciphertext, name)?)),
                ValueEncoding::Json => {
                    let bytes = Zeroizing::new(self.decrypt_field_bytes(ciphertext, name)?);
                    Ok(serde_json::from_slice(&bytes)?)
                }
            },
        }
    }

    fn seal_value(&self, name: &str, value: &Value) -> ManagerResult<EnvelopeBlob> {
        match value {
            Value::String(text) => self.encrypt_field(text, name),
            other => {
                let bytes = Zeroizing::new(serde_json::to_vec(other)?);
                self.encrypt_field_bytes(&bytes, name)
            }
        }
    }
}
