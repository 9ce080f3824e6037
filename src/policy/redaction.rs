//! Redaction of sensitive values
//!
//! The hidden-key set comes from the policy's explicit `log_hidden` list when
//! present, otherwise from the entity's field classification. A flattened
//! key is hidden when either the key itself or its container is classified
//! sensitive.

use std::collections::BTreeSet;

use super::config::ResolvedPolicy;
use super::field_key::FieldKey;
use crate::entity::Auditable;
use crate::snapshot::Snapshot;

/// Token substituted for sensitive values
pub const DEFAULT_MASK_TOKEN: &str = "***";

/// Masks sensitive keys in snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    hidden: BTreeSet<FieldKey>,
    mask_token: String,
}

impl RedactionPolicy {
    pub fn new(hidden: BTreeSet<FieldKey>, mask_token: impl Into<String>) -> Self {
        Self {
            hidden,
            mask_token: mask_token.into(),
        }
    }

    /// Build the redaction policy for one entity
    ///
    /// `fields` is the set of keys that may appear in the snapshots; inferred
    /// hiding only needs to consider those.
    pub fn for_entity<'k, E>(
        entity: &E,
        policy: &ResolvedPolicy,
        fields: impl IntoIterator<Item = &'k FieldKey>,
        mask_token: &str,
    ) -> Self
    where
        E: Auditable + ?Sized,
    {
        let hidden = match policy.log_hidden() {
            Some(explicit) => explicit.clone(),
            None => fields
                .into_iter()
                .filter(|key| is_sensitive(entity, key))
                .cloned()
                .collect(),
        };
        Self::new(hidden, mask_token)
    }

    pub fn hidden(&self) -> &BTreeSet<FieldKey> {
        &self.hidden
    }

    pub fn mask_token(&self) -> &str {
        &self.mask_token
    }

    /// Replace every hidden value in `values` with the mask token
    pub fn redact(&self, values: Snapshot) -> Snapshot {
        values
            .into_iter()
            .map(|(key, value)| {
                if self.hidden.contains(&key) {
                    (key, serde_json::Value::String(self.mask_token.clone()))
                } else {
                    (key, value)
                }
            })
            .collect()
    }
}

fn is_sensitive<E>(entity: &E, key: &FieldKey) -> bool
where
    E: Auditable + ?Sized,
{
    if entity.classification(key.as_str()).is_sensitive() {
        return true;
    }
    key.split_nested()
        .map(|(container, _)| entity.classification(container).is_sensitive())
        .unwrap_or(false)
}
