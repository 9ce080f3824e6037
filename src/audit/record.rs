//! Audit record data structures
//!
//! Defines the lifecycle event kinds, the persisted record layout and the
//! builder that assembles records from redacted snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::ActorContext;
use crate::entity::{Auditable, SubjectId};
use crate::snapshot::Snapshot;

/// Lifecycle events that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEvent {
    /// Entity was created
    Created,
    /// Entity was updated
    Updated,
    /// Entity was deleted
    Deleted,
}

impl AuditEvent {
    pub const ALL: [AuditEvent; 3] = [AuditEvent::Created, AuditEvent::Updated, AuditEvent::Deleted];
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEvent::Created => write!(f, "created"),
            AuditEvent::Updated => write!(f, "updated"),
            AuditEvent::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single persisted audit record
///
/// `props` and `old_props` hold the redacted value maps as serialized JSON
/// text, exactly as the audit table stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Normalized entity type (namespace stripped, lower-cased)
    pub subject_type: String,

    /// Primary identifier of the entity
    pub subject_id: SubjectId,

    /// Lifecycle event that produced the record
    pub event: AuditEvent,

    /// Kind of actor responsible, `None` when unauthenticated
    pub causer_type: Option<String>,

    /// Identifier of the actor responsible
    pub causer_id: Option<SubjectId>,

    /// New values (created/updated)
    pub props: Option<String>,

    /// Previous values (updated/deleted)
    pub old_props: Option<String>,

    /// When the record was built (UTC)
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event.to_string().to_uppercase(),
            self.subject_type,
            self.subject_id
        );

        if let (Some(kind), Some(id)) = (&self.causer_type, &self.causer_id) {
            output.push_str(&format!(" by {} {}", kind, id));
        }

        if let Some(props) = &self.props {
            output.push_str(&format!("\n  New: {}", props));
        }

        if let Some(old_props) = &self.old_props {
            output.push_str(&format!("\n  Old: {}", old_props));
        }

        output
    }
}

/// Default causer kind recorded for authenticated actors
pub const DEFAULT_CAUSER_TYPE: &str = "user";

/// Assembles audit records
#[derive(Debug, Clone)]
pub struct AuditRecordBuilder {
    namespace_prefixes: Vec<String>,
    causer_type: String,
}

impl Default for AuditRecordBuilder {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_CAUSER_TYPE)
    }
}

impl AuditRecordBuilder {
    pub fn new(namespace_prefixes: Vec<String>, causer_type: impl Into<String>) -> Self {
        Self {
            namespace_prefixes,
            causer_type: causer_type.into(),
        }
    }

    /// Strip the first matching namespace prefix and lower-case the rest
    pub fn subject_type(&self, type_name: &str) -> String {
        let stripped = self
            .namespace_prefixes
            .iter()
            .find_map(|prefix| type_name.strip_prefix(prefix.as_str()))
            .unwrap_or(type_name);
        stripped.to_lowercase()
    }

    /// Build a record from already redacted value maps
    ///
    /// `old_values` is ignored for `Created` and `new_values` for `Deleted`.
    /// Empty maps are stored as `None`.
    pub fn build<E, A>(
        &self,
        event: AuditEvent,
        entity: &E,
        new_values: Option<&Snapshot>,
        old_values: Option<&Snapshot>,
        actor: &A,
    ) -> AuditRecord
    where
        E: Auditable + ?Sized,
        A: ActorContext + ?Sized,
    {
        let (new_values, old_values) = match event {
            AuditEvent::Created => (new_values, None),
            AuditEvent::Updated => (new_values, old_values),
            AuditEvent::Deleted => (None, old_values),
        };

        let causer_id = actor.actor_id();
        let causer_type = causer_id.as_ref().map(|_| self.causer_type.clone());

        AuditRecord {
            subject_type: self.subject_type(entity.type_name()),
            subject_id: entity.subject_id(),
            event,
            causer_type,
            causer_id,
            props: serialize_props(new_values),
            old_props: serialize_props(old_values),
            created_at: Utc::now(),
        }
    }
}

/// Render a value map as compact JSON text
///
/// Goes through `Value`'s `Display`, which cannot fail: keys are plain
/// strings and values are already JSON. Non-ASCII characters are written
/// unescaped.
fn serialize_props(values: Option<&Snapshot>) -> Option<String> {
    values.filter(|v| !v.is_empty()).map(|v| {
        let map: serde_json::Map<String, serde_json::Value> = v
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        serde_json::Value::Object(map).to_string()
    })
}
