//! Audit logger for processed requests
//!
//! One entry per request. Finding values and the document name are recorded
//! only as SHA-256 digests, salted with `audit.hash_salt` when one is
//! configured; plaintext PHI never reaches the audit log.

use crate::phi::models::{FindingsMap, HandlingPolicy};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    request_id: Uuid,
    document_hash: String,
    policy: HandlingPolicy,
    findings_count: usize,
    categories: BTreeMap<String, usize>,
    redactions: Option<usize>,
    processing_time_ms: u64,
    findings: Vec<AuditFinding>,
}

/// Audit finding entry (with hashed value)
#[derive(Debug, Serialize)]
struct AuditFinding {
    category: String,
    length: usize,
    /// Salted SHA-256 digest of the substring
    value_hash: String,
}

/// Summary of one processed request, as handed to the audit logger
#[derive(Debug, Clone)]
pub struct AuditRecord<'a> {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Uploaded document name; recorded as a digest
    pub document: &'a str,
    pub policy: HandlingPolicy,
    pub findings: &'a FindingsMap,
    /// Boxes painted, for paginated documents
    pub redactions: Option<usize>,
    pub processing_time_ms: u64,
}

/// Audit logger for processed requests
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    salt: Option<String>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            salt: None,
        })
    }

    /// Salt every digest with `salt`
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Whether entries are written
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one entry for a processed request
    pub fn log_request(&self, record: &AuditRecord<'_>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut findings = Vec::new();
        let mut categories = BTreeMap::new();
        for (category, values) in record.findings.iter() {
            categories.insert(category.to_string(), values.len());
            findings.extend(values.iter().map(|value| AuditFinding {
                category: category.to_string(),
                length: value.chars().count(),
                value_hash: salted_hash(self.salt.as_deref(), value),
            }));
        }

        let entry = AuditLogEntry {
            timestamp: record.timestamp.to_rfc3339(),
            request_id: record.request_id,
            document_hash: salted_hash(self.salt.as_deref(), record.document),
            policy: record.policy,
            findings_count: findings.len(),
            categories,
            redactions: record.redactions,
            processing_time_ms: record.processing_time_ms,
            findings,
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Request: {} | Document: {} | Policy: {} | Findings: {} | Time: {}ms",
                entry.timestamp,
                entry.request_id,
                entry.document_hash,
                entry.policy,
                entry.findings_count,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hex SHA-256 digest of a finding value
pub fn hash_value(value: &str) -> String {
    salted_hash(None, value)
}

/// Hex SHA-256 digest of `salt`, a NUL separator and `value`
///
/// Without a salt this is the plain digest of `value`.
pub fn salted_hash(salt: Option<&str>, value: &str) -> String {
    let mut hasher = Sha256::new();
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}
