// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Directory tree enumeration

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{Result, StampsortError};

/// Collect every regular file under `root`, sorted by path.
///
/// The list is gathered up front so the caller can rename and move files
/// without disturbing the walk. Symlinks are not followed. Hidden, temporary
/// and non-UTF-8 names are all included; only paths in `exclude` are left
/// out. Unreadable entries below the root are logged and skipped.
pub fn collect_files(root: &Path, exclude: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(StampsortError::Config(format!(
            "Root {:?} is not a directory",
            root
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if exclude.iter().any(|p| p == &path) {
            debug!("Excluded: {:?}", path);
            continue;
        }
        files.push(path);
    }

    Ok(files)
}

/// Whether the rename stage's extension filter accepts this file.
///
/// Compares raw name bytes, so names that are not valid UTF-8 still match.
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .map(|n| n.as_encoded_bytes().ends_with(extension.as_bytes()))
        .unwrap_or(false)
}
