//! Field keys
//!
//! A field key names one loggable attribute. It is either a plain attribute
//! name (`status`) or a flattened path into a structured attribute
//! (`meta->note`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Separator between a container attribute and its subkey
pub const NESTED_SEPARATOR: &str = "->";

/// Identifier for a loggable attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    /// Create a field key from any string
    ///
    /// Keys that do not match the `container->subkey` shape are treated as
    /// simple attribute names, never rejected.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build a flattened key for `subkey` inside `container`
    pub fn nested(container: &str, subkey: &str) -> Self {
        Self(format!("{}{}{}", container, NESTED_SEPARATOR, subkey))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a flattened key into `(container, subkey)`
    ///
    /// Returns `None` for simple keys. Both halves must be non-empty and made
    /// of ASCII alphanumerics or underscores.
    pub fn split_nested(&self) -> Option<(&str, &str)> {
        let (container, subkey) = self.0.split_once(NESTED_SEPARATOR)?;
        if is_identifier(container) && is_identifier(subkey) {
            Some((container, subkey))
        } else {
            None
        }
    }

    pub fn is_nested(&self) -> bool {
        self.split_nested().is_some()
    }

    /// The attribute this key reads from on the entity
    ///
    /// For flattened keys this is the container, otherwise the key itself.
    pub fn root(&self) -> &str {
        match self.split_nested() {
            Some((container, _)) => container,
            None => &self.0,
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
