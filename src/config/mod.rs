// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for stampsort

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory tree to walk
    pub root: String,

    /// Only files ending with this are renamed (relocation ignores it)
    pub extension: String,

    /// Root that classification is relative to (defaults to `root`)
    #[serde(default)]
    pub classify_root: Option<String>,

    /// Fused per-file pass or two full passes
    #[serde(default)]
    pub mode: PipelineMode,

    /// Stop at the first failing file instead of skipping it
    #[serde(default)]
    pub fail_fast: bool,

    /// Naming rules
    #[serde(default)]
    pub naming: NamingConfig,

    /// Classification rules
    #[serde(default)]
    pub classify: ClassifyConfig,

    /// Audit log settings
    #[serde(default)]
    pub history: HistoryConfig,
}

/// How the rename and relocate stages are scheduled
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Rename then relocate each file before moving to the next
    #[default]
    Fused,
    /// Rename the whole tree, then relocate the whole tree
    TwoPass,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NamingConfig {
    /// Markers embedded in the canonical name, in precedence order
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Highest collision counter to try; unbounded when absent
    #[serde(default)]
    pub max_suffix: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClassifyConfig {
    /// Folder names that override the top-level category, in precedence order
    #[serde(default = "default_techniques")]
    pub techniques: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: String,
}

// Default value functions
fn default_tags() -> Vec<String> {
    vec!["before-color-correction", "before-highres-fix", "mask"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_techniques() -> Vec<String> {
    vec!["extras", "grids", "text"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_history_path() -> String { "stampsort_history.jsonl".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            extension: ".png".to_string(),
            classify_root: None,
            mode: PipelineMode::default(),
            fail_fast: false,
            naming: NamingConfig::default(),
            classify: ClassifyConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            max_suffix: None,
        }
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            techniques: default_techniques(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineMode::Fused => write!(f, "fused"),
            PipelineMode::TwoPass => write!(f, "two-pass"),
        }
    }
}

impl FromStr for PipelineMode {
    type Err = crate::StampsortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fused" => Ok(PipelineMode::Fused),
            "two-pass" | "two_pass" => Ok(PipelineMode::TwoPass),
            other => Err(crate::StampsortError::Config(format!(
                "Unknown pipeline mode '{}' (expected fused or two-pass)",
                other
            ))),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::StampsortError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would otherwise fail deep inside a run
    pub fn validate(&self) -> crate::Result<()> {
        if self.root.trim().is_empty() {
            return Err(crate::StampsortError::Config("root must not be empty".to_string()));
        }
        if self.extension.is_empty() {
            return Err(crate::StampsortError::Config(
                "extension filter must not be empty".to_string(),
            ));
        }
        if self.naming.tags.iter().any(|t| t.is_empty()) {
            return Err(crate::StampsortError::Config("naming tags must not be empty strings".to_string()));
        }
        if self.classify.techniques.iter().any(|t| t.is_empty() || t.contains(['/', '\\'])) {
            return Err(crate::StampsortError::Config(
                "techniques must be single, non-empty folder names".to_string(),
            ));
        }
        if self.naming.max_suffix == Some(0) {
            return Err(crate::StampsortError::Config("max_suffix must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// Classification root, falling back to the walk root
    pub fn classify_root_path(&self) -> PathBuf {
        self.classify_root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.root_path())
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.history.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, PipelineMode::Fused);
        assert_eq!(config.naming.tags[0], "before-color-correction");
        assert_eq!(config.classify.techniques, vec!["extras", "grids", "text"]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"root": "/data/gen", "extension": ".webp", "mode": "two_pass"}"#)
                .unwrap();
        assert_eq!(config.root, "/data/gen");
        assert_eq!(config.mode, PipelineMode::TwoPass);
        assert_eq!(config.naming, NamingConfig::default());
        assert_eq!(config.classify_root_path(), PathBuf::from("/data/gen"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.classify_root = Some("/sorted".to_string());
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.classify_root_path(), PathBuf::from("/sorted"));
    }

    #[test]
    fn test_load_missing_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.extension = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.classify.techniques.push("a/b".to_string());
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.naming.max_suffix = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("fused".parse::<PipelineMode>().unwrap(), PipelineMode::Fused);
        assert_eq!("two-pass".parse::<PipelineMode>().unwrap(), PipelineMode::TwoPass);
        assert!("parallel".parse::<PipelineMode>().is_err());
    }
}
