// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Append-only audit log of renames and moves

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::Result;

/// What happened to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Renamed in place to its canonical name
    Rename,
    /// Moved into its classified directory
    Relocate,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Rename => write!(f, "rename"),
            AuditAction::Relocate => write!(f, "relocate"),
        }
    }
}

/// A single completed filesystem operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        original_path: PathBuf,
        new_path: PathBuf,
        file_hash: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            original_path,
            new_path,
            file_hash,
        }
    }
}

/// JSON Lines audit log; entries are only ever appended
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the log
    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse audit entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Get the most recent N entries (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));

        let first = AuditEntry::new(
            AuditAction::Rename,
            PathBuf::from("/r/cat1/a.png"),
            PathBuf::from("/r/cat1/20230401.120000-ab.png"),
            Some("ab".to_string()),
        );
        let second = AuditEntry::new(
            AuditAction::Relocate,
            PathBuf::from("/r/cat1/20230401.120000-ab.png"),
            PathBuf::from("/r/2023/2023-04/cat1/20230401.120000-ab.png"),
            None,
        );
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries, vec![first.clone(), second.clone()]);

        let recent = log.get_recent(1).unwrap();
        assert_eq!(recent, vec![second]);
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("none.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = AuditLog::new(path.clone());
        log.append(&AuditEntry::new(
            AuditAction::Rename,
            PathBuf::from("a"),
            PathBuf::from("b"),
            None,
        ))
        .unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();

        assert_eq!(log.read_all().unwrap().len(), 1);
    }
}
