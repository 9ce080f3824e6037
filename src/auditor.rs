//! Lifecycle hook integration
//!
//! `Auditor` ties field selection, snapshot extraction, diffing, redaction
//! and record building together behind four explicit hooks that a host's
//! repository or service layer calls around entity writes:
//!
//! - `on_created` after an insert
//! - `on_before_update` before mutating, returning the before-snapshot
//! - `on_after_update` after mutating, given that before-snapshot
//! - `on_before_delete` before removing
//!
//! The before-snapshot is owned by the caller and passed back explicitly, so
//! concurrent updates to different entities never share state.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::{debug, trace, warn};

use crate::actor::ActorContext;
use crate::audit::{
    created_values, deleted_values, diff, AuditEvent, AuditRecordBuilder,
    AuditSink, JsonlSink,
};
use crate::config::{AuditPaths, AuditSettings};
use crate::entity::Auditable;
use crate::error::AuditResult;
use crate::policy::{resolve_fields, FieldKey, RedactionPolicy, ResolvedPolicy};
use crate::snapshot::{extract, Snapshot};

/// Audits entity lifecycle events into a sink
pub struct Auditor<S> {
    settings: AuditSettings,
    builder: AuditRecordBuilder,
    sink: S,
    /// Resolved policies per entity type name
    policies: RwLock<HashMap<String, Arc<ResolvedPolicy>>>,
}

impl<S: AuditSink> Auditor<S> {
    /// Create an auditor with default settings
    pub fn new(sink: S) -> Self {
        Self::with_settings(AuditSettings::default(), sink)
    }

    pub fn with_settings(settings: AuditSettings, sink: S) -> Self {
        let builder = AuditRecordBuilder::new(
            settings.namespace_prefixes.clone(),
            settings.causer_type.clone(),
        );
        Self {
            settings,
            builder,
            sink,
            policies: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record a newly created entity
    ///
    /// Returns `Ok(true)` when a record was written. Nothing is written when
    /// the event is not observed or every selected field is blank.
    pub fn on_created<E, A>(&self, entity: &E, actor: &A) -> AuditResult<bool>
    where
        E: Auditable + ?Sized,
        A: ActorContext + ?Sized,
    {
        let policy = self.policy(entity);
        if !policy.observes(AuditEvent::Created) {
            return Ok(false);
        }

        let fields = self.fields(entity, &policy);
        let values = created_values(extract(entity, &fields));
        if values.is_empty() {
            debug!(subject_type = entity.type_name(), "No loggable values on create");
            return Ok(false);
        }

        let redaction = self.redaction(entity, &policy, &fields);
        let values = redaction.redact(values);
        self.emit(AuditEvent::Created, entity, Some(&values), None, actor)
    }

    /// Capture the before-update snapshot
    ///
    /// The caller must keep it and hand it to `on_after_update` once the
    /// entity has been mutated.
    pub fn on_before_update<E>(&self, entity: &E) -> Snapshot
    where
        E: Auditable + ?Sized,
    {
        let policy = self.policy(entity);
        let fields = self.fields(entity, &policy);
        extract(entity, &fields)
    }

    /// Record the changes made since `before` was captured
    ///
    /// Returns `Ok(false)` without writing when no selected field changed.
    pub fn on_after_update<E, A>(&self, entity: &E, before: &Snapshot, actor: &A) -> AuditResult<bool>
    where
        E: Auditable + ?Sized,
        A: ActorContext + ?Sized,
    {
        let policy = self.policy(entity);
        if !policy.observes(AuditEvent::Updated) {
            return Ok(false);
        }

        let fields = self.fields(entity, &policy);
        let after = extract(entity, &fields);
        let changes = diff(before, &after);
        if changes.is_empty() {
            debug!(
                subject_type = entity.type_name(),
                subject_id = %entity.subject_id(),
                "Update changed no audited fields"
            );
            return Ok(false);
        }

        // Old values are masked too
        let redaction = self.redaction(entity, &policy, &fields);
        let new = redaction.redact(changes.new);
        let old = redaction.redact(changes.old);

        let changed: Vec<&str> = new.keys().map(|k| k.as_str()).collect();
        trace!(subject_type = entity.type_name(), ?changed, "Computed update diff");
        self.emit(AuditEvent::Updated, entity, Some(&new), Some(&old), actor)
    }

    /// Record an entity about to be deleted
    pub fn on_before_delete<E, A>(&self, entity: &E, actor: &A) -> AuditResult<bool>
    where
        E: Auditable + ?Sized,
        A: ActorContext + ?Sized,
    {
        let policy = self.policy(entity);
        if !policy.observes(AuditEvent::Deleted) {
            return Ok(false);
        }

        let fields = self.fields(entity, &policy);
        let values = deleted_values(extract(entity, &fields));
        if values.is_empty() {
            debug!(subject_type = entity.type_name(), "No loggable values on delete");
            return Ok(false);
        }

        let redaction = self.redaction(entity, &policy, &fields);
        let values = redaction.redact(values);
        self.emit(AuditEvent::Deleted, entity, None, Some(&values), actor)
    }

    /// Resolved policy for an entity type, cached after the first lookup
    ///
    /// Static settings are overridden field by field by the type's own
    /// `audit_policy()`.
    pub fn policy<E>(&self, entity: &E) -> Arc<ResolvedPolicy>
    where
        E: Auditable + ?Sized,
    {
        let type_name = entity.type_name();

        if let Some(policy) = self
            .policies
            .read()
            .ok()
            .and_then(|cache| cache.get(type_name).cloned())
        {
            return policy;
        }

        let subject_type = self.builder.subject_type(type_name);
        let mut config = self.settings.policy_for(type_name, &subject_type);
        if let Some(overrides) = entity.audit_policy() {
            config = config.overridden_by(overrides);
        }
        let policy = Arc::new(config.resolve());

        if let Ok(mut cache) = self.policies.write() {
            cache.insert(type_name.to_string(), Arc::clone(&policy));
        }
        trace!(type_name, ?policy, "Resolved audit policy");

        policy
    }

    fn fields<E>(&self, entity: &E, policy: &ResolvedPolicy) -> BTreeSet<FieldKey>
    where
        E: Auditable + ?Sized,
    {
        let fields = resolve_fields(entity.fillable().iter().copied(), entity.containers(), policy);
        trace!(type_name = entity.type_name(), ?fields, "Resolved audited fields");
        fields
    }

    fn redaction<E>(
        &self,
        entity: &E,
        policy: &ResolvedPolicy,
        fields: &BTreeSet<FieldKey>,
    ) -> RedactionPolicy
    where
        E: Auditable + ?Sized,
    {
        RedactionPolicy::for_entity(entity, policy, fields, &self.settings.mask_token)
    }

    fn emit<E, A>(
        &self,
        event: AuditEvent,
        entity: &E,
        new: Option<&Snapshot>,
        old: Option<&Snapshot>,
        actor: &A,
    ) -> AuditResult<bool>
    where
        E: Auditable + ?Sized,
        A: ActorContext + ?Sized,
    {
        let record = self.builder.build(event, entity, new, old, actor);
        let subject_type = record.subject_type.clone();
        let subject_id = record.subject_id.clone();

        match self.sink.insert(record) {
            Ok(()) => {
                debug!(
                    subject_type = %subject_type,
                    subject_id = %subject_id,
                    event = %event,
                    "Audit record written"
                );
                Ok(true)
            }
            Err(e) if !self.settings.strict => {
                warn!(
                    subject_type = %subject_type,
                    subject_id = %subject_id,
                    event = %event,
                    error = %e,
                    "Dropping audit record after sink failure"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl Auditor<JsonlSink> {
    /// Build an auditor from the settings file and JSONL log under `paths`
    pub fn open(paths: &AuditPaths) -> AuditResult<Self> {
        let settings = AuditSettings::load_or_default(paths)?;
        let sink = JsonlSink::new(settings.audit_log_path(paths));
        Ok(Self::with_settings(settings, sink))
    }
}
