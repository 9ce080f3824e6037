//! Audit records, change detection and sinks
//!
//! # Architecture
//!
//! - `diff`: strict before/after comparison producing changed new/old maps,
//!   plus the blank-value filtering used for create and delete events.
//! - `AuditRecord` / `AuditRecordBuilder`: the persisted record layout and
//!   its construction from redacted snapshots.
//! - `AuditSink`: the append-only destination. `JsonlSink` writes
//!   line-delimited JSON, `MemorySink` keeps records in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_audit::audit::{diff, AuditEvent, AuditRecordBuilder, AuditSink, JsonlSink};
//!
//! let sink = JsonlSink::new(audit_log_path);
//! let changes = diff(&before, &after);
//! if !changes.is_empty() {
//!     let record = AuditRecordBuilder::default().build(
//!         AuditEvent::Updated,
//!         &order,
//!         Some(&changes.new),
//!         Some(&changes.old),
//!         &actor,
//!     );
//!     sink.insert(record)?;
//! }
//! ```

mod diff;
mod record;
mod sink;

pub use diff::{created_values, deleted_values, describe_changes, diff, Changes};
pub use record::{AuditEvent, AuditRecord, AuditRecordBuilder, DEFAULT_CAUSER_TYPE};
pub use sink::{AuditSink, JsonlSink, MemorySink};
