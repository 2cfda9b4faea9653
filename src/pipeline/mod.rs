// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rename-and-relocate pipeline
//!
//! Two stages run over the tree: renaming files that match the extension
//! filter, then relocating every file into its dated directory. They run
//! either fused (both stages per file) or as two full passes.
//!
//! Collision checks and renames are separate filesystem calls. Another
//! process creating the chosen name in between is not guarded against.

pub mod relocate;
pub mod rename;

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::classify::Classifier;
use crate::config::{AppConfig, PipelineMode};
use crate::history::AuditLog;
use crate::naming::NameComposer;
use crate::walk::{collect_files, matches_extension};
use crate::{Result, StampsortError};

pub use relocate::{RelocateEngine, RelocateOutcome};
pub use rename::{RenameEngine, RenameOutcome};

/// Counts for one run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Files found by the first walk
    pub scanned: usize,
    pub renamed: usize,
    pub relocated: usize,
    /// Stage steps that left the file where it was
    pub unchanged: usize,
    pub failed: usize,
}

/// Configured pipeline over one tree
pub struct Pipeline {
    mode: PipelineMode,
    root: PathBuf,
    extension: String,
    fail_fast: bool,
    dry_run: bool,
    exclude: Vec<PathBuf>,
    renamer: RenameEngine,
    relocator: RelocateEngine,
}

impl Pipeline {
    /// Build a pipeline from configuration.
    ///
    /// Both roots are canonicalised so walked paths and the classification
    /// root compare cleanly.
    pub fn new(config: &AppConfig, dry_run: bool) -> Result<Self> {
        config.validate()?;

        let root = canonical_dir(&config.root_path())?;
        let classify_root = canonical_dir(&config.classify_root_path())?;
        let history_path = absolute_path(&config.history_path());

        let composer = NameComposer::new(&config.naming);
        let classifier = Classifier::new(classify_root, &config.classify);

        Ok(Self {
            mode: config.mode,
            root,
            extension: config.extension.clone(),
            fail_fast: config.fail_fast,
            dry_run,
            exclude: vec![history_path.clone()],
            renamer: RenameEngine::new(composer, AuditLog::new(history_path.clone()), dry_run),
            relocator: RelocateEngine::new(
                classifier,
                config.naming.max_suffix,
                AuditLog::new(history_path),
                dry_run,
            ),
        })
    }

    /// Leave `path` out of every walk.
    ///
    /// For files that live under the root but belong to the tool itself, such
    /// as the configuration file the run was loaded from.
    pub fn with_excluded(mut self, path: &Path) -> Self {
        self.exclude.push(absolute_path(path));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run both stages in the configured mode.
    ///
    /// On a dry run nothing moves, so two-pass mode plans the relocate pass
    /// from the names the rename pass would have given. Both modes report the
    /// same destinations.
    pub fn run(&self) -> Result<RunReport> {
        info!("Running {} pipeline over {:?}", self.mode, self.root);
        let mut report = RunReport::default();

        match self.mode {
            PipelineMode::Fused => {
                let files = collect_files(&self.root, &self.exclude)?;
                report.scanned = files.len();
                for path in files {
                    let result = self.fused_step(&path, &mut report);
                    self.isolate(&path, result, &mut report)?;
                }
            }
            PipelineMode::TwoPass => {
                let planned = self.rename_pass(&mut report)?;
                self.relocate_pass(&mut report, &planned)?;
            }
        }

        info!(
            "Done: {} renamed, {} relocated, {} unchanged, {} failed",
            report.renamed, report.relocated, report.unchanged, report.failed
        );
        Ok(report)
    }

    /// Only the rename stage
    pub fn rename_only(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        self.rename_pass(&mut report)?;
        Ok(report)
    }

    /// Only the relocate stage, planned from the names currently on disk
    pub fn relocate_only(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        self.relocate_pass(&mut report, &HashMap::new())?;
        Ok(report)
    }

    /// Rename every matching file. On a dry run, returns the planned
    /// renames keyed by original path.
    fn rename_pass(&self, report: &mut RunReport) -> Result<HashMap<PathBuf, PathBuf>> {
        let mut planned = HashMap::new();
        let files = collect_files(&self.root, &self.exclude)?;
        if report.scanned == 0 {
            report.scanned = files.len();
        }

        for path in files {
            if !matches_extension(&path, &self.extension) {
                continue;
            }
            let result = self.renamer.rename(&path).map(|outcome| {
                count(report, outcome.changed(), Stage::Rename);
                if self.dry_run && outcome.changed() {
                    planned.insert(outcome.from, outcome.to);
                }
            });
            self.isolate(&path, result, report)?;
        }
        Ok(planned)
    }

    fn relocate_pass(
        &self,
        report: &mut RunReport,
        planned: &HashMap<PathBuf, PathBuf>,
    ) -> Result<()> {
        let files = collect_files(&self.root, &self.exclude)?;
        if report.scanned == 0 {
            report.scanned = files.len();
        }

        for path in files {
            let current = planned.get(&path).unwrap_or(&path);
            let result = self.relocator.relocate(current).map(|outcome| {
                count(report, outcome.changed(), Stage::Relocate);
            });
            self.isolate(&path, result, report)?;
        }
        Ok(())
    }

    /// Rename (when the filter matches) and immediately relocate one file
    fn fused_step(&self, path: &Path, report: &mut RunReport) -> Result<()> {
        let current = if matches_extension(path, &self.extension) {
            let outcome = self.renamer.rename(path)?;
            count(report, outcome.changed(), Stage::Rename);
            outcome.to
        } else {
            path.to_path_buf()
        };

        let outcome = self.relocator.relocate(&current)?;
        count(report, outcome.changed(), Stage::Relocate);
        Ok(())
    }

    /// Per-file failure isolation: log and count, or abort when fail-fast
    fn isolate(&self, path: &Path, result: Result<()>, report: &mut RunReport) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if self.fail_fast => {
                error!("Aborting on {:?}: {}", path, e);
                Err(e)
            }
            Err(e) => {
                error!("Failed to process {:?}: {}", path, e);
                report.failed += 1;
                Ok(())
            }
        }
    }
}

enum Stage {
    Rename,
    Relocate,
}

fn count(report: &mut RunReport, changed: bool, stage: Stage) {
    match (changed, stage) {
        (false, _) => report.unchanged += 1,
        (true, Stage::Rename) => report.renamed += 1,
        (true, Stage::Relocate) => report.relocated += 1,
    }
}

fn canonical_dir(path: &Path) -> Result<PathBuf> {
    let canonical = std::fs::canonicalize(path)
        .map_err(|e| StampsortError::Config(format!("Cannot access {:?}: {}", path, e)))?;
    if !canonical.is_dir() {
        return Err(StampsortError::Config(format!("{:?} is not a directory", path)));
    }
    Ok(canonical)
}

/// Best-effort absolute form of a path that may not exist yet
fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (std::fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => {
            warn!("Cannot resolve path {:?}", path);
            path.to_path_buf()
        }
    }
}
