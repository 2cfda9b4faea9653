// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Moving files into their classified directory

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::history::{AuditAction, AuditEntry, AuditLog};
use crate::naming::{occupied_by_other, resolve, CanonicalName};
use crate::{Result, StampsortError};

/// Result of relocating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocateOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RelocateOutcome {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Moves files under `<root>/<year>/<year>-<month>/<technique>`
pub struct RelocateEngine {
    classifier: Classifier,
    max_suffix: Option<u64>,
    audit: AuditLog,
    dry_run: bool,
}

impl RelocateEngine {
    pub fn new(
        classifier: Classifier,
        max_suffix: Option<u64>,
        audit: AuditLog,
        dry_run: bool,
    ) -> Self {
        Self {
            classifier,
            max_suffix,
            audit,
            dry_run,
        }
    }

    /// Move `path` into its target directory.
    ///
    /// An occupied destination name gets a collision suffix; nothing is
    /// overwritten. Moves across devices fail rather than copy.
    pub fn relocate(&self, path: &Path) -> Result<RelocateOutcome> {
        let target_dir = self.classifier.target_dir(path)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| StampsortError::Config(format!("{:?} has no file name", path)))?;

        let name = CanonicalName::from_file_name(file_name);
        let destination = resolve(&target_dir, &name, self.max_suffix, occupied_by_other(path))?;

        let outcome = RelocateOutcome {
            from: path.to_path_buf(),
            to: destination,
        };

        if !outcome.changed() {
            debug!("Already in place: {:?}", path);
            return Ok(outcome);
        }

        if self.dry_run {
            info!("DRY RUN: Would move {} to {}", path.display(), outcome.to.display());
            return Ok(outcome);
        }

        std::fs::create_dir_all(&target_dir)?;
        if let Err(e) = std::fs::rename(path, &outcome.to) {
            return Err(move_error(e, outcome.from, outcome.to));
        }
        info!("Moved file {} to {}", path.display(), outcome.to.display());

        let entry = AuditEntry::new(
            AuditAction::Relocate,
            outcome.from.clone(),
            outcome.to.clone(),
            None,
        );
        if let Err(e) = self.audit.append(&entry) {
            warn!("Failed to write audit entry for {:?}: {}", outcome.to, e);
        }

        Ok(outcome)
    }
}

/// Moves never fall back to copy-and-delete
fn move_error(e: io::Error, from: PathBuf, to: PathBuf) -> StampsortError {
    match e.kind() {
        ErrorKind::CrossesDevices => StampsortError::CrossDevice { from, to },
        _ => e.into(),
    }
}
