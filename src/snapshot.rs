//! Snapshots of entity state
//!
//! A snapshot maps field keys to the scalar values they held at one point in
//! time. Snapshots are built fresh per lifecycle event and never mutated
//! afterwards; every transformation (diffing, redaction) yields a new one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::entity::Auditable;
use crate::policy::FieldKey;

/// Immutable mapping of field keys to values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<FieldKey, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Value)> {
        self.0.iter()
    }

    /// Drop values considered absent: `null` and the empty string
    pub fn without_blank(self) -> Self {
        self.0
            .into_iter()
            .filter(|(_, value)| !is_blank(value))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<FieldKey, Value> {
        self.0
    }
}

/// Whether a value counts as absent for create/delete logging
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl FromIterator<(FieldKey, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (FieldKey, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Snapshot {
    type Item = (FieldKey, Value);
    type IntoIter = std::collections::btree_map::IntoIter<FieldKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a FieldKey, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, FieldKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extract the current values of `keys` from an entity
///
/// Flattened keys descend one level into their container. A missing
/// container, a non-object container or a missing subkey all yield `null`.
pub fn extract<'k, E>(entity: &E, keys: impl IntoIterator<Item = &'k FieldKey>) -> Snapshot
where
    E: Auditable + ?Sized,
{
    keys.into_iter()
        .map(|key| (key.clone(), read_field(entity, key)))
        .collect()
}

fn read_field<E>(entity: &E, key: &FieldKey) -> Value
where
    E: Auditable + ?Sized,
{
    match key.split_nested() {
        Some((container, subkey)) => match entity.attribute(container) {
            Some(Value::Object(mut map)) => map.remove(subkey).unwrap_or(Value::Null),
            _ => Value::Null,
        },
        None => entity.attribute(key.as_str()).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SubjectId;
    use serde_json::json;

    struct Order {
        status: &'static str,
        meta: Option<Value>,
    }

    impl Auditable for Order {
        fn type_name(&self) -> &str {
            "Order"
        }

        fn subject_id(&self) -> SubjectId {
            SubjectId::Int(1)
        }

        fn fillable(&self) -> &[&'static str] {
            &["status", "meta", "meta->note"]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "status" => Some(json!(self.status)),
                "meta" => self.meta.clone(),
                _ => None,
            }
        }
    }

    fn keys(raw: &[&str]) -> Vec<FieldKey> {
        raw.iter().map(|k| FieldKey::from(*k)).collect()
    }

    #[test]
    fn test_extract_simple_and_nested() {
        let order = Order {
            status: "new",
            meta: Some(json!({"note": "x", "other": 1})),
        };
        let snapshot = extract(&order, &keys(&["status", "meta->note"]));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("status"), Some(&json!("new")));
        assert_eq!(snapshot.get("meta->note"), Some(&json!("x")));
    }

    #[test]
    fn test_missing_container_is_null() {
        let order = Order {
            status: "new",
            meta: None,
        };
        let snapshot = extract(&order, &keys(&["meta->note"]));
        assert_eq!(snapshot.get("meta->note"), Some(&Value::Null));
    }

    #[test]
    fn test_non_object_container_is_null() {
        let order = Order {
            status: "new",
            meta: Some(json!("not a map")),
        };
        let snapshot = extract(&order, &keys(&["meta->note"]));
        assert_eq!(snapshot.get("meta->note"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_subkey_and_attribute_are_null() {
        let order = Order {
            status: "new",
            meta: Some(json!({})),
        };
        let snapshot = extract(&order, &keys(&["meta->note", "unknown"]));
        assert_eq!(snapshot.get("meta->note"), Some(&Value::Null));
        assert_eq!(snapshot.get("unknown"), Some(&Value::Null));
    }

    #[test]
    fn test_without_blank() {
        let snapshot: Snapshot = [
            (FieldKey::from("a"), json!(null)),
            (FieldKey::from("b"), json!("")),
            (FieldKey::from("c"), json!(0)),
            (FieldKey::from("d"), json!(false)),
            (FieldKey::from("e"), json!("x")),
        ]
        .into_iter()
        .collect();

        let kept = snapshot.without_blank();
        assert_eq!(kept.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["c", "d", "e"]);
    }
}
