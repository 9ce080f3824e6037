//! Field-selection and redaction policy
//!
//! - `FieldKey`: simple or flattened (`container->subkey`) attribute names
//! - `PolicyConfig` / `ResolvedPolicy`: per-entity-type settings
//! - `resolve_fields`: which keys are eligible for logging
//! - `RedactionPolicy`: which values get masked

mod config;
mod field_key;
mod redaction;
mod selector;

pub use config::{PolicyConfig, ResolvedPolicy};
pub use field_key::{FieldKey, NESTED_SEPARATOR};
pub use redaction::{RedactionPolicy, DEFAULT_MASK_TOKEN};
pub use selector::resolve_fields;
