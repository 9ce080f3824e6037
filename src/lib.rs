//! entity-audit - change auditing for domain entities
//!
//! Observes create/update/delete transitions on host entities and produces a
//! normalized audit trail of what changed, who changed it and when, with
//! sensitive values masked.
//!
//! # Architecture
//!
//! - `entity`: the `Auditable` adapter host types implement
//! - `actor`: the optional authenticated actor (causer)
//! - `policy`: field keys, per-type policies, field selection, redaction
//! - `snapshot`: point-in-time field values and their extraction
//! - `audit`: diffing, record building and sinks
//! - `auditor`: the lifecycle hooks tying everything together
//! - `config`: settings file and path resolution
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::{Auditor, JsonlSink, NoActor};
//!
//! let auditor = Auditor::new(JsonlSink::new(audit_log_path));
//!
//! auditor.on_created(&order, &NoActor)?;
//!
//! let before = auditor.on_before_update(&order);
//! order.status = "paid".into();
//! auditor.on_after_update(&order, &before, &current_user)?;
//!
//! auditor.on_before_delete(&order, &current_user)?;
//! ```

pub mod actor;
pub mod audit;
pub mod auditor;
pub mod config;
pub mod entity;
pub mod error;
pub mod policy;
pub mod snapshot;

pub use actor::{ActorContext, NoActor, StaticActor};
pub use audit::{AuditEvent, AuditRecord, AuditSink, JsonlSink, MemorySink};
pub use auditor::Auditor;
pub use config::{AuditPaths, AuditSettings};
pub use entity::{Auditable, FieldKind, SubjectId};
pub use error::{AuditError, AuditResult};
pub use policy::{FieldKey, PolicyConfig};
pub use snapshot::Snapshot;
