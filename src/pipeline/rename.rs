// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-place rename to the canonical name

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::hasher::hash_file;
use crate::history::{AuditAction, AuditEntry, AuditLog};
use crate::naming::{occupied_by_other, FileTimes, NameComposer};
use crate::{Result, StampsortError};

/// Result of renaming one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub from: PathBuf,
    /// Final path; equal to `from` when the file already had its name
    pub to: PathBuf,
    pub hash: String,
}

impl RenameOutcome {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Renames files within their own directory
pub struct RenameEngine {
    composer: NameComposer,
    audit: AuditLog,
    dry_run: bool,
}

impl RenameEngine {
    pub fn new(composer: NameComposer, audit: AuditLog, dry_run: bool) -> Self {
        Self {
            composer,
            audit,
            dry_run,
        }
    }

    /// Rename `path` to its canonical name, resolving collisions
    pub fn rename(&self, path: &Path) -> Result<RenameOutcome> {
        let dir = path.parent().ok_or_else(|| {
            StampsortError::Config(format!("Cannot determine parent directory of {:?}", path))
        })?;

        let times = FileTimes::read(path)?;
        let hash = hash_file(path)?;
        let name = self.composer.compose(path, &times, &hash);
        let target = self.composer.resolve(dir, &name, occupied_by_other(path))?;

        let outcome = RenameOutcome {
            from: path.to_path_buf(),
            to: target,
            hash,
        };

        if !outcome.changed() {
            debug!("Already canonical: {:?}", path);
            return Ok(outcome);
        }

        if self.dry_run {
            info!("DRY RUN: Would rename {} to {}", path.display(), outcome.to.display());
            return Ok(outcome);
        }

        std::fs::rename(path, &outcome.to)?;
        info!("Renamed file {} to {}", path.display(), outcome.to.display());

        let entry = AuditEntry::new(
            AuditAction::Rename,
            outcome.from.clone(),
            outcome.to.clone(),
            Some(outcome.hash.clone()),
        );
        if let Err(e) = self.audit.append(&entry) {
            warn!("Failed to write audit entry for {:?}: {}", outcome.to, e);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use chrono::{Local, TimeZone};
    use filetime::FileTime;
    use std::fs;

    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn engine(dir: &Path, dry_run: bool) -> RenameEngine {
        RenameEngine::new(
            NameComposer::new(&NamingConfig::default()),
            AuditLog::new(dir.join("audit.jsonl")),
            dry_run,
        )
    }

    fn write_dated(path: &Path, content: &[u8]) {
        fs::write(path, content).unwrap();
        let when = Local.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(when.timestamp(), 0)).unwrap();
    }

    #[test]
    fn test_rename_in_place() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a-mask.png");
        write_dated(&path, b"hello");

        let outcome = engine(log_dir.path(), false).rename(&path).unwrap();
        let expected = dir
            .path()
            .join(format!("20230401.120000-{}-mask.png", HELLO_SHA256));

        assert!(outcome.changed());
        assert_eq!(outcome.to, expected);
        assert!(expected.exists());
        assert!(!path.exists());

        let entries = AuditLog::new(log_dir.path().join("audit.jsonl")).read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Rename);
        assert_eq!(entries[0].original_path, path);
        assert_eq!(entries[0].file_hash.as_deref(), Some(HELLO_SHA256));
    }

    #[test]
    fn test_rename_twice_is_noop() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_dated(&path, b"hello");

        let engine = engine(log_dir.path(), false);
        let first = engine.rename(&path).unwrap();
        let second = engine.rename(&first.to).unwrap();

        assert!(!second.changed());
        assert!(second.to.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

        let entries = AuditLog::new(log_dir.path().join("audit.jsonl")).read_all().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_identical_content_is_chained_not_merged() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        write_dated(&a, b"hello");
        write_dated(&b, b"hello");

        let engine = engine(log_dir.path(), false);
        let first = engine.rename(&a).unwrap();
        let second = engine.rename(&b).unwrap();

        let base = format!("20230401.120000-{}", HELLO_SHA256);
        assert_eq!(first.to, dir.path().join(format!("{}.png", base)));
        assert_eq!(second.to, dir.path().join(format!("{}-1.png", base)));

        // Re-running over the suffixed file keeps its earned name
        let again = engine.rename(&second.to).unwrap();
        assert!(!again.changed());
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_dated(&path, b"hello");

        let outcome = engine(log_dir.path(), true).rename(&path).unwrap();
        assert!(outcome.changed());
        assert!(path.exists());
        assert!(!outcome.to.exists());
        assert!(!log_dir.path().join("audit.jsonl").exists());
    }

    #[test]
    fn test_missing_file_fails() {
        let log_dir = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(engine(log_dir.path(), false)
            .rename(&dir.path().join("gone.png"))
            .is_err());
    }
}
