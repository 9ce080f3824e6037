//! Field selection
//!
//! Computes which field keys of an entity are eligible for logging.

use std::collections::BTreeSet;

use super::config::ResolvedPolicy;
use super::field_key::FieldKey;

/// Resolve the set of loggable field keys
///
/// Starts from the declared fillable keys minus any whole-blob container,
/// then applies the allow-list, or failing that the deny-list. Flattened keys
/// are only ever filtered, never invented.
pub fn resolve_fields<K, C>(
    fillable: impl IntoIterator<Item = K>,
    containers: impl IntoIterator<Item = C>,
    policy: &ResolvedPolicy,
) -> BTreeSet<FieldKey>
where
    K: Into<FieldKey>,
    C: AsRef<str>,
{
    let containers: BTreeSet<String> = containers
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect();

    let candidates = fillable
        .into_iter()
        .map(Into::into)
        .filter(|key: &FieldKey| !containers.contains(key.as_str()));

    if let Some(only) = policy.log_only() {
        candidates.filter(|key| only.contains(key)).collect()
    } else if let Some(except) = policy.log_except() {
        candidates.filter(|key| !except.contains(key)).collect()
    } else {
        candidates.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfig;

    fn keys(raw: &[&str]) -> BTreeSet<FieldKey> {
        raw.iter().map(|k| FieldKey::from(*k)).collect()
    }

    const NO_CONTAINERS: [&str; 0] = [];

    #[test]
    fn test_no_policy_keeps_fillable() {
        let fields = resolve_fields(["a", "b", "c"], NO_CONTAINERS, &ResolvedPolicy::default());
        assert_eq!(fields, keys(&["a", "b", "c"]));
    }

    #[test]
    fn test_log_only() {
        let policy = PolicyConfig::new().log_only(["a", "b"]).resolve();
        let fields = resolve_fields(["a", "b", "c"], NO_CONTAINERS, &policy);
        assert_eq!(fields, keys(&["a", "b"]));
    }

    #[test]
    fn test_log_except() {
        let policy = PolicyConfig::new().log_except(["c"]).resolve();
        let fields = resolve_fields(["a", "b", "c"], NO_CONTAINERS, &policy);
        assert_eq!(fields, keys(&["a", "b"]));
    }

    #[test]
    fn test_log_only_wins_over_except() {
        let policy = PolicyConfig::new()
            .log_only(["a", "c"])
            .log_except(["a"])
            .resolve();
        let fields = resolve_fields(["a", "b", "c"], NO_CONTAINERS, &policy);
        assert_eq!(fields, keys(&["a", "c"]));
    }

    #[test]
    fn test_log_only_does_not_add_undeclared_keys() {
        let policy = PolicyConfig::new().log_only(["a", "zzz"]).resolve();
        let fields = resolve_fields(["a", "b"], NO_CONTAINERS, &policy);
        assert_eq!(fields, keys(&["a"]));
    }

    #[test]
    fn test_containers_excluded() {
        let fields = resolve_fields(
            ["status", "meta", "meta->note"],
            ["meta"],
            &ResolvedPolicy::default(),
        );
        assert_eq!(fields, keys(&["meta->note", "status"]));
    }

    #[test]
    fn test_containers_excluded_even_when_allowed() {
        let policy = PolicyConfig::new().log_only(["meta", "status"]).resolve();
        let fields = resolve_fields(["status", "meta", "meta->note"], ["meta"], &policy);
        assert_eq!(fields, keys(&["status"]));
    }
}
