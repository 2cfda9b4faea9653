// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Target directory classification
//!
//! Files are sorted into `<year>/<year>-<month>/<technique>` under the
//! classification root. The date comes from the leading 8 digits of the file
//! name, the technique from the folder the file was found in.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::config::ClassifyConfig;
use crate::{Result, StampsortError};

/// Stand-in for year, month or technique when none can be derived
pub const UNKNOWN: &str = "unknown";

/// Relative directory a file belongs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDirectory {
    pub year: String,
    pub month: String,
    pub technique: String,
}

impl TargetDirectory {
    /// `<year>-<month>`
    pub fn year_month(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }

    /// Path relative to the classification root
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.year)
            .join(self.year_month())
            .join(&self.technique)
    }
}

impl fmt::Display for TargetDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.year_month(), self.technique)
    }
}

/// Year and month from a leading run of 8 ASCII digits, e.g. `20230401...`
pub fn leading_date(file_name: &str) -> Option<(&str, &str)> {
    let digits = file_name.get(..8)?;
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((&digits[..4], &digits[4..6]))
    } else {
        None
    }
}

/// Derives target directories relative to a fixed root
#[derive(Debug, Clone)]
pub struct Classifier {
    root: PathBuf,
    techniques: Vec<String>,
}

impl Classifier {
    pub fn new(root: impl Into<PathBuf>, config: &ClassifyConfig) -> Self {
        Self {
            root: root.into(),
            techniques: config.techniques.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify `path`, which must live under the root
    pub fn classify(&self, path: &Path) -> Result<TargetDirectory> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| StampsortError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (year, month) = leading_date(&file_name).unwrap_or((UNKNOWN, UNKNOWN));

        let segments: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Already sorted under its own date: look past the year/month levels
        let year_month = format!("{}-{}", year, month);
        let category_segments = match segments.as_slice() {
            [y, ym, rest @ ..] if y == year && *ym == year_month => rest,
            all => all,
        };

        let technique = self
            .techniques
            .iter()
            .find(|t| segments.iter().any(|s| s == *t))
            .cloned()
            .or_else(|| category_segments.first().cloned())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Ok(TargetDirectory {
            year: year.to_string(),
            month: month.to_string(),
            technique,
        })
    }

    /// Absolute target directory for `path`
    pub fn target_dir(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.root.join(self.classify(path)?.to_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new("/root", &ClassifyConfig::default())
    }

    fn classify(path: &str) -> String {
        classifier().classify(Path::new(path)).unwrap().to_string()
    }

    #[test]
    fn test_leading_date() {
        assert_eq!(leading_date("20230401.120000-ab.png"), Some(("2023", "04")));
        assert_eq!(leading_date("2023040.png"), None);
        assert_eq!(leading_date("img1.png"), None);
        assert_eq!(leading_date("2023"), None);
        assert_eq!(leading_date("1234567x9"), None);
    }

    #[test]
    fn test_classify_by_first_segment() {
        assert_eq!(
            classify("/root/sketches/before-color-correction/20230401.120000-ab.png"),
            "2023/2023-04/sketches"
        );
    }

    #[test]
    fn test_classify_fixed_technique_wins() {
        assert_eq!(
            classify("/root/portraits/batch7/grids/20230401.120000-ab.png"),
            "2023/2023-04/grids"
        );
        assert_eq!(
            classify("/root/text/extras/20230401.120000-ab.png"),
            "2023/2023-04/extras"
        );
        assert_eq!(
            classify("/root/grids/text/20230401.120000-ab.png"),
            "2023/2023-04/grids"
        );
    }

    #[test]
    fn test_classify_without_date_uses_unknown() {
        assert_eq!(
            classify("/root/sketches/img1.png"),
            "unknown/unknown-unknown/sketches"
        );
    }

    #[test]
    fn test_classify_file_directly_under_root() {
        assert_eq!(
            classify("/root/20231105.080000-ab.png"),
            "2023/2023-11/unknown"
        );
    }

    #[test]
    fn test_classify_already_sorted_is_stable() {
        assert_eq!(
            classify("/root/2023/2023-04/sketches/20230401.120000-ab.png"),
            "2023/2023-04/sketches"
        );
        assert_eq!(
            classify("/root/unknown/unknown-unknown/sketches/img1.png"),
            "unknown/unknown-unknown/sketches"
        );
    }

    #[test]
    fn test_classify_outside_root() {
        let err = classifier()
            .classify(Path::new("/elsewhere/cat1/a.png"))
            .unwrap_err();
        assert!(matches!(err, StampsortError::OutsideRoot { .. }));
    }

    #[test]
    fn test_target_dir_is_under_root() {
        let dir = classifier()
            .target_dir(Path::new("/root/cat1/20230401.120000-ab.png"))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/root/2023/2023-04/cat1"));
    }
}
