//! Per-entity-type audit policy
//!
//! `PolicyConfig` is the user-facing, partially specified form (as loaded
//! from settings or returned by `Auditable::audit_policy`). It is resolved
//! once into an immutable `ResolvedPolicy`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::field_key::FieldKey;
use crate::audit::AuditEvent;

/// Audit policy for one entity type
///
/// Every field is optional so a type-level override can replace individual
/// settings without restating the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Lifecycle events to observe (all three when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_events: Option<Vec<AuditEvent>>,

    /// Allow-list of field keys; wins over `log_except` when both are set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_only: Option<Vec<FieldKey>>,

    /// Deny-list of field keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_except: Option<Vec<FieldKey>>,

    /// Field keys to mask; when unset, inferred from field classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_hidden: Option<Vec<FieldKey>>,
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_events(mut self, events: impl IntoIterator<Item = AuditEvent>) -> Self {
        self.log_events = Some(events.into_iter().collect());
        self
    }

    pub fn log_only<K: Into<FieldKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.log_only = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn log_except<K: Into<FieldKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.log_except = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn log_hidden<K: Into<FieldKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.log_hidden = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Layer `overrides` on top of this policy, field by field
    pub fn overridden_by(self, overrides: PolicyConfig) -> PolicyConfig {
        PolicyConfig {
            log_events: overrides.log_events.or(self.log_events),
            log_only: overrides.log_only.or(self.log_only),
            log_except: overrides.log_except.or(self.log_except),
            log_hidden: overrides.log_hidden.or(self.log_hidden),
        }
    }

    /// Resolve into the immutable form used on the hot path
    ///
    /// Empty allow/deny lists are treated as unset.
    pub fn resolve(self) -> ResolvedPolicy {
        let events = match self.log_events {
            Some(events) => events.into_iter().collect(),
            None => AuditEvent::ALL.into_iter().collect(),
        };

        ResolvedPolicy {
            events,
            log_only: non_empty(self.log_only),
            log_except: non_empty(self.log_except),
            log_hidden: self.log_hidden.map(|keys| keys.into_iter().collect()),
        }
    }
}

fn non_empty(keys: Option<Vec<FieldKey>>) -> Option<BTreeSet<FieldKey>> {
    keys.filter(|k| !k.is_empty())
        .map(|k| k.into_iter().collect())
}

/// A fully resolved, immutable policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    events: BTreeSet<AuditEvent>,
    log_only: Option<BTreeSet<FieldKey>>,
    log_except: Option<BTreeSet<FieldKey>>,
    log_hidden: Option<BTreeSet<FieldKey>>,
}

impl ResolvedPolicy {
    /// Whether this lifecycle event should produce records
    pub fn observes(&self, event: AuditEvent) -> bool {
        self.events.contains(&event)
    }

    pub fn log_only(&self) -> Option<&BTreeSet<FieldKey>> {
        self.log_only.as_ref()
    }

    pub fn log_except(&self) -> Option<&BTreeSet<FieldKey>> {
        self.log_except.as_ref()
    }

    pub fn log_hidden(&self) -> Option<&BTreeSet<FieldKey>> {
        self.log_hidden.as_ref()
    }
}

impl Default for ResolvedPolicy {
    fn default() -> Self {
        PolicyConfig::default().resolve()
    }
}
