// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Canonical filename composition and collision resolution
//!
//! A canonical name looks like `20230401.120000-<sha256>[-<tag>].png`: the
//! earlier of the file's creation and modification times, the content hash,
//! at most one recognised tag, then the original extension verbatim.

use chrono::{DateTime, Local};
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::config::NamingConfig;
use crate::{Result, StampsortError};

/// strftime pattern for the date prefix
pub const DATE_FORMAT: &str = "%Y%m%d.%H%M%S";

/// Creation and modification times of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    /// Birth time, when the platform reports one
    pub created: Option<DateTime<Local>>,
    pub modified: DateTime<Local>,
}

impl FileTimes {
    /// Read times from already-fetched metadata
    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        let modified = DateTime::<Local>::from(metadata.modified()?);
        let created = metadata.created().ok().map(DateTime::<Local>::from);
        Ok(Self { created, modified })
    }

    /// Stat a file and read its times
    pub fn read(path: &Path) -> Result<Self> {
        Self::from_metadata(&std::fs::metadata(path)?)
    }

    /// The earlier of the two timestamps
    pub fn oldest(&self) -> DateTime<Local> {
        match self.created {
            Some(created) if created < self.modified => created,
            _ => self.modified,
        }
    }
}

/// A filename split into the part we build and the extension we keep.
///
/// Both halves are raw `OsString`s so names that are not valid UTF-8 keep
/// their bytes through a rename or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub stem: OsString,
    /// Includes the leading `.`, or empty
    pub extension: OsString,
}

impl CanonicalName {
    pub fn new(stem: impl Into<OsString>, extension: impl Into<OsString>) -> Self {
        Self {
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    /// Split an existing file name at its last `.`
    pub fn from_file_name(name: impl AsRef<OsStr>) -> Self {
        let (stem, extension) = split_extension(name.as_ref());
        Self::new(stem, extension)
    }

    pub fn file_name(&self) -> OsString {
        let mut name = self.stem.clone();
        name.push(&self.extension);
        name
    }

    /// The name with a collision counter inserted before the extension
    pub fn with_suffix(&self, n: u64) -> OsString {
        let mut name = self.stem.clone();
        name.push(format!("-{}", n));
        name.push(&self.extension);
        name
    }
}

/// Split `name` into stem and extension (with its dot).
///
/// A leading dot does not start an extension, so `.hidden` has none. Works on
/// the raw name; anything that is not a single path component is returned
/// whole.
pub fn split_extension(name: &OsStr) -> (&OsStr, OsString) {
    let path = Path::new(name);
    if path.file_name() != Some(name) {
        return (name, OsString::new());
    }
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (stem, dotted)
        }
        _ => (name, OsString::new()),
    }
}

/// Builds canonical names from file times, content hash and tags
#[derive(Debug, Clone)]
pub struct NameComposer {
    tags: Vec<String>,
    max_suffix: Option<u64>,
}

impl NameComposer {
    pub fn new(config: &NamingConfig) -> Self {
        Self {
            tags: config.tags.clone(),
            max_suffix: config.max_suffix,
        }
    }

    /// First tag (by declared order) contained in `file_name`
    pub fn find_tag(&self, file_name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| !tag.is_empty() && file_name.contains(tag.as_str()))
            .map(String::as_str)
    }

    /// Compose the candidate name for `original`
    pub fn compose(&self, original: &Path, times: &FileTimes, hash: &str) -> CanonicalName {
        let file_name = original.file_name().unwrap_or_default();
        let (_, extension) = split_extension(file_name);

        let date_string = times.oldest().format(DATE_FORMAT);
        let stem = match self.find_tag(&file_name.to_string_lossy()) {
            Some(tag) => format!("{}-{}-{}", date_string, hash, tag),
            None => format!("{}-{}", date_string, hash),
        };

        CanonicalName::new(stem, extension)
    }

    /// Resolve `name` inside `dir` using this composer's suffix limit
    pub fn resolve<F>(&self, dir: &Path, name: &CanonicalName, is_taken: F) -> Result<PathBuf>
    where
        F: Fn(&Path) -> bool,
    {
        resolve(dir, name, self.max_suffix, is_taken)
    }
}

/// Pick the first free path for `name` in `dir`.
///
/// The bare name wins if free; otherwise `-1`, `-2`, ... are tried in order
/// before the extension. Earlier gaps are not revisited on later calls, each
/// call starts counting at 1 again.
pub fn resolve<F>(
    dir: &Path,
    name: &CanonicalName,
    max_suffix: Option<u64>,
    is_taken: F,
) -> Result<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let candidate = dir.join(name.file_name());
    if !is_taken(candidate.as_path()) {
        return Ok(candidate);
    }

    let limit = max_suffix.unwrap_or(u64::MAX);
    for i in 1..=limit {
        let suffixed = dir.join(name.with_suffix(i));
        if !is_taken(suffixed.as_path()) {
            return Ok(suffixed);
        }
    }

    Err(StampsortError::CollisionExhausted { path: candidate })
}

/// Existence check that treats `current` as free.
///
/// A file never collides with itself, which is what keeps a second run over
/// an already-renamed file a no-op. Dangling symlinks count as occupied.
pub fn occupied_by_other(current: &Path) -> impl Fn(&Path) -> bool + '_ {
    move |candidate: &Path| candidate != current && std::fs::symlink_metadata(candidate).is_ok()
}
