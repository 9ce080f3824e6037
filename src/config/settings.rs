//! Audit settings
//!
//! Static configuration: mask token, namespace prefixes, causer label,
//! failure mode and per-entity-type policies. Loaded from JSON, or YAML when
//! the file extension says so.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::paths::AuditPaths;
use crate::audit::DEFAULT_CAUSER_TYPE;
use crate::error::AuditError;
use crate::policy::{PolicyConfig, DEFAULT_MASK_TOKEN};

/// Settings for the audit engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Replacement for sensitive values
    #[serde(default = "default_mask_token")]
    pub mask_token: String,

    /// Prefixes stripped from entity type names before lower-casing
    #[serde(default = "default_namespace_prefixes")]
    pub namespace_prefixes: Vec<String>,

    /// Causer kind recorded for authenticated actors
    #[serde(default = "default_causer_type")]
    pub causer_type: String,

    /// Propagate sink failures to the caller (`false` logs and drops them)
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// Audit log location for `JsonlSink`, relative paths resolve against the base dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,

    /// Static policies keyed by entity type name (full or normalized)
    #[serde(default)]
    pub entities: BTreeMap<String, PolicyConfig>,
}

fn default_mask_token() -> String {
    DEFAULT_MASK_TOKEN.to_string()
}

fn default_namespace_prefixes() -> Vec<String> {
    vec!["App\\Models\\".to_string(), "models::".to_string()]
}

fn default_causer_type() -> String {
    DEFAULT_CAUSER_TYPE.to_string()
}

fn default_strict() -> bool {
    true
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            mask_token: default_mask_token(),
            namespace_prefixes: default_namespace_prefixes(),
            causer_type: default_causer_type(),
            strict: default_strict(),
            audit_log: None,
            entities: BTreeMap::new(),
        }
    }
}

impl AuditSettings {
    /// Register a static policy for an entity type
    pub fn with_entity(mut self, type_name: impl Into<String>, policy: PolicyConfig) -> Self {
        self.entities.insert(type_name.into(), policy);
        self
    }

    /// Static policy for an entity type
    ///
    /// Looks up the full type name first, then the normalized subject type.
    pub fn policy_for(&self, type_name: &str, subject_type: &str) -> PolicyConfig {
        self.entities
            .get(type_name)
            .or_else(|| self.entities.get(subject_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve where the JSONL audit log lives
    pub fn audit_log_path(&self, paths: &AuditPaths) -> PathBuf {
        match &self.audit_log {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => paths.base_dir().join(path),
            None => paths.audit_log(),
        }
    }

    /// Parse settings from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AuditError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AuditError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Parse settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, AuditError> {
        serde_json::from_str(json)
            .map_err(|e| AuditError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Load settings from an explicit file, YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn load_from(path: &Path) -> Result<Self, AuditError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Io(format!("Failed to read settings file {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_default(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            Self::load_from(&settings_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AuditError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
