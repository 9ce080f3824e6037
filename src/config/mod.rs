//! Configuration module for entity-audit
//!
//! - Path resolution for the settings file and default audit log
//! - Static settings and per-entity-type policies

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::AuditSettings;
