//! Change detection for audit logging
//!
//! Compares before/after snapshots with strict equality: `null`, `""`, `0`
//! and `false` are all distinct, as are `1` and `"1"`.

use serde_json::Value;

use crate::snapshot::Snapshot;

/// The changed subset of an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    /// Changed keys mapped to their new values
    pub new: Snapshot,
    /// Changed keys that existed before, mapped to their old values
    pub old: Snapshot,
}

impl Changes {
    /// True when nothing changed and no record should be written
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.old.is_empty()
    }
}

/// Compute the changed keys between two snapshots
///
/// A key is changed when it is present in `after` with a value that differs
/// from `before`, or is missing from `before` entirely.
pub fn diff(before: &Snapshot, after: &Snapshot) -> Changes {
    let mut new = Vec::new();
    let mut old = Vec::new();

    for (key, after_val) in after {
        match before.get(key.as_str()) {
            Some(before_val) if before_val == after_val => {}
            Some(before_val) => {
                new.push((key.clone(), after_val.clone()));
                old.push((key.clone(), before_val.clone()));
            }
            None => new.push((key.clone(), after_val.clone())),
        }
    }

    Changes {
        new: new.into_iter().collect(),
        old: old.into_iter().collect(),
    }
}

/// Values logged for a newly created entity
pub fn created_values(after: Snapshot) -> Snapshot {
    after.without_blank()
}

/// Values logged for a deleted entity
pub fn deleted_values(before: Snapshot) -> Snapshot {
    before.without_blank()
}

/// Generate a human-readable summary of changes
///
/// Renders `key: old -> new` for each changed key. Callers should pass
/// already redacted snapshots.
pub fn describe_changes(new: &Snapshot, old: &Snapshot) -> Option<String> {
    let mut changes = Vec::new();

    for (key, new_val) in new {
        match old.get(key.as_str()) {
            Some(old_val) => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(old_val),
                format_value(new_val)
            )),
            None => changes.push(format!("{}: (added) -> {}", key, format_value(new_val))),
        }
    }

    for (key, old_val) in old {
        if !new.contains_key(key.as_str()) {
            changes.push(format!("{}: {} -> (removed)", key, format_value(old_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldKey;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        match value {
            Value::Object(map) => map.into_iter().map(|(k, v)| (FieldKey::from(k), v)).collect(),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_simple_field_change() {
        let before = snapshot(json!({"status": "new", "total": 100}));
        let after = snapshot(json!({"status": "paid", "total": 100}));

        let changes = diff(&before, &after);
        assert_eq!(changes.new, snapshot(json!({"status": "paid"})));
        assert_eq!(changes.old, snapshot(json!({"status": "new"})));
    }

    #[test]
    fn test_no_changes() {
        let before = snapshot(json!({"name": "Test", "value": 100}));
        let after = before.clone();

        let changes = diff(&before, &after);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_strict_equality() {
        let before = snapshot(json!({"a": null, "b": 0, "c": "1", "d": false}));
        let after = snapshot(json!({"a": "", "b": false, "c": 1, "d": 0}));

        let changes = diff(&before, &after);
        assert_eq!(changes.new.len(), 4);
        assert_eq!(changes.old.len(), 4);
        assert_eq!(changes.old.get("a"), Some(&Value::Null));
    }

    #[test]
    fn test_key_missing_from_before() {
        let before = snapshot(json!({"a": 1}));
        let after = snapshot(json!({"a": 1, "b": 2}));

        let changes = diff(&before, &after);
        assert_eq!(changes.new, snapshot(json!({"b": 2})));
        assert!(changes.old.is_empty());
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_key_only_in_before_is_ignored() {
        let before = snapshot(json!({"a": 1, "gone": 2}));
        let after = snapshot(json!({"a": 1}));

        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn test_diff_soundness() {
        let before = snapshot(json!({"a": 1, "b": "x", "c": true, "d": null}));
        let after = snapshot(json!({"a": 2, "b": "x", "c": false, "d": null}));

        let changes = diff(&before, &after);
        for (key, value) in &changes.new {
            assert_ne!(before.get(key.as_str()), Some(value));
        }
        for (key, value) in &after {
            if !changes.new.contains_key(key.as_str()) {
                assert_eq!(before.get(key.as_str()), Some(value));
            }
        }
    }

    #[test]
    fn test_created_and_deleted_values_filter_blank() {
        let values = snapshot(json!({"status": "new", "total": null, "note": "", "count": 0}));
        let created = created_values(values.clone());
        assert_eq!(created, snapshot(json!({"status": "new", "count": 0})));
        assert_eq!(deleted_values(values), created);
    }

    #[test]
    fn test_describe_changes() {
        let new = snapshot(json!({"status": "paid", "note": "hi"}));
        let old = snapshot(json!({"status": "new", "total": 5}));

        let summary = describe_changes(&new, &old).unwrap();
        assert!(summary.contains("status: \"new\" -> \"paid\""));
        assert!(summary.contains("note: (added) -> \"hi\""));
        assert!(summary.contains("total: 5 -> (removed)"));
        assert!(describe_changes(&Snapshot::new(), &Snapshot::new()).is_none());
    }

    #[test]
    fn test_long_string_truncation() {
        let long_string = "a".repeat(100);
        let formatted = format_value(&json!(long_string));
        assert!(formatted.ends_with("...\""));
        assert_eq!(formatted.len(), 47 + 5);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!("test")), "\"test\"");
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2})), "{2 fields}");
    }
}
