//! Audit sinks
//!
//! A sink is the durable, append-only destination for audit records. The
//! engine hands each record over by value and keeps no reference to it.
//!
//! - `JsonlSink` appends one JSON object per line and flushes every write.
//! - `MemorySink` collects records in memory.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{AuditError, AuditResult};

use super::record::AuditRecord;

/// Append-only destination for audit records
pub trait AuditSink {
    /// Persist one record
    fn insert(&self, record: AuditRecord) -> AuditResult<()>;
}

impl<S: AuditSink + ?Sized> AuditSink for &S {
    fn insert(&self, record: AuditRecord) -> AuditResult<()> {
        (**self).insert(record)
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Box<S> {
    fn insert(&self, record: AuditRecord) -> AuditResult<()> {
        (**self).insert(record)
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn insert(&self, record: AuditRecord) -> AuditResult<()> {
        (**self).insert(record)
    }
}

/// Writes audit records to a line-delimited JSON file
pub struct JsonlSink {
    /// Path to the audit log file
    log_path: PathBuf,
}

impl JsonlSink {
    /// Create a sink that appends to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Read all records from the log file
    ///
    /// Returns records in the order they were written.
    pub fn read_all(&self) -> AuditResult<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                AuditError::Json(format!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Get the number of records in the log
    pub fn entry_count(&self) -> AuditResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let count = reader
            .lines()
            .filter_map(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count();

        Ok(count)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl AuditSink for JsonlSink {
    fn insert(&self, record: AuditRecord) -> AuditResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::Sink(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Sink(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(&record)
            .map_err(|e| AuditError::Json(format!("Failed to serialize audit record: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| AuditError::Sink(format!("Failed to write audit record: {}", e)))?;

        file.flush()
            .map_err(|e| AuditError::Sink(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record inserted so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records pushed before a panicking holder are still valid, so a
    /// poisoned lock is recovered rather than reported
    fn lock(&self) -> MutexGuard<'_, Vec<AuditRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for MemorySink {
    fn insert(&self, record: AuditRecord) -> AuditResult<()> {
        self.lock().push(record);
        Ok(())
    }
}
