//! Entity capability interface
//!
//! The audit engine never reflects over host types. Each audited entity type
//! implements [`Auditable`], a small adapter exposing its type name, primary
//! identifier, declared fields, attribute reads and per-field value
//! classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::policy::{FieldKey, PolicyConfig};

/// Value-type classification of an entity attribute
///
/// Used to infer which fields must be masked when a policy does not list
/// hidden fields explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Ordinary scalar value
    #[default]
    Plain,
    /// Structured/associative value (JSON object or array)
    Structured,
    /// One-way hashed value (passwords, tokens)
    Hashed,
    /// Encrypted scalar
    Encrypted,
    /// Encrypted structured value
    EncryptedStructured,
    /// Encrypted serialized object
    EncryptedObject,
}

impl FieldKind {
    /// Whether values of this kind must never appear in plaintext
    pub fn is_sensitive(self) -> bool {
        matches!(
            self,
            FieldKind::Hashed
                | FieldKind::Encrypted
                | FieldKind::EncryptedStructured
                | FieldKind::EncryptedObject
        )
    }
}

/// Primary identifier of an audited entity, copied verbatim into records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Int(id) => write!(f, "{}", id),
            SubjectId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<Uuid> for SubjectId {
    fn from(id: Uuid) -> Self {
        Self::Text(id.to_string())
    }
}

/// Adapter an entity type implements to be audited
pub trait Auditable {
    /// Fully qualified type name, e.g. `App\Models\Order` or `models::Order`
    fn type_name(&self) -> &str;

    /// Primary identifier
    fn subject_id(&self) -> SubjectId;

    /// Declared fillable fields, including any flattened `container->subkey` keys
    fn fillable(&self) -> &[&'static str];

    /// Read an attribute by name
    ///
    /// Returns `None` when the attribute is absent. Structured attributes are
    /// returned as JSON objects so flattened keys can descend into them.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Value-type classification of an attribute
    fn classification(&self, _name: &str) -> FieldKind {
        FieldKind::Plain
    }

    /// Attributes holding whole nested blobs, never logged directly
    ///
    /// Defaults to every container referenced by a flattened fillable key.
    fn containers(&self) -> Vec<String> {
        let mut containers: Vec<String> = self
            .fillable()
            .iter()
            .filter_map(|raw| FieldKey::from(*raw).split_nested().map(|(c, _)| c.to_string()))
            .collect();
        containers.sort();
        containers.dedup();
        containers
    }

    /// Type-level policy overrides
    ///
    /// Any field set here takes precedence over the static settings entry.
    fn audit_policy(&self) -> Option<PolicyConfig> {
        None
    }
}
