// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for logscan

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::LiteralCategory;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Keyword catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Log file renaming rules
    #[serde(default)]
    pub rename: RenameConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Path to the keyword catalog (JSON)
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    /// Category matched case-sensitively against the marker token
    #[serde(default = "default_literal_category")]
    pub literal_category: String,
    #[serde(default = "default_marker_token")]
    pub marker_token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportConfig {
    /// Glob matched against file names when analyzing a folder
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// Category used to rank files in the summary report
    #[serde(default = "default_severe_category")]
    pub severe_category: String,
    #[serde(default = "default_separator_width")]
    pub separator_width: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RenameConfig {
    /// File stem replaced by the folder name (`app.txt`, `app.1.txt`)
    #[serde(default = "default_source_stem")]
    pub source_stem: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// chrono format for the date inserted into `<stem>.<ext>` renames
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

// Default value functions
fn default_catalog_path() -> PathBuf { PathBuf::from("keywords.json") }
fn default_literal_category() -> String { "Parse".to_string() }
fn default_marker_token() -> String { "PARSE".to_string() }
fn default_file_pattern() -> String { "*.txt".to_string() }
fn default_severe_category() -> String { "Crashed".to_string() }
fn default_separator_width() -> usize { 500 }
fn default_source_stem() -> String { "app".to_string() }
fn default_extension() -> String { "txt".to_string() }
fn default_date_format() -> String { "%Y-%m-%d".to_string() }
fn default_history_path() -> PathBuf { PathBuf::from("logscan_history.jsonl") }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            literal_category: default_literal_category(),
            marker_token: default_marker_token(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_pattern: default_file_pattern(),
            severe_category: default_severe_category(),
            separator_width: default_separator_width(),
        }
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            source_stem: default_source_stem(),
            extension: default_extension(),
            date_format: default_date_format(),
            history_path: default_history_path(),
        }
    }
}

impl CatalogConfig {
    /// The reserved literal-token category described by this config
    pub fn literal(&self) -> LiteralCategory {
        LiteralCategory {
            name: self.literal_category.clone(),
            marker: self.marker_token.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::LogScanError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
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

    /// Reject settings that would make every run fail later on
    pub fn validate(&self) -> crate::Result<()> {
        if self.catalog.marker_token.is_empty() {
            return Err(crate::LogScanError::Config("catalog.marker_token must not be empty".to_string()));
        }
        if self.rename.source_stem.is_empty() || self.rename.extension.is_empty() {
            return Err(crate::LogScanError::Config(
                "rename.source_stem and rename.extension must not be empty".to_string(),
            ));
        }
        check_date_format(&self.rename.date_format)?;
        glob::Pattern::new(&self.report.file_pattern)?;
        Ok(())
    }
}

/// Reject chrono format strings that would fail when rendered
pub fn check_date_format(format: &str) -> crate::Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(crate::LogScanError::Config(format!("invalid date format '{}'", format)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.catalog.literal_category, "Parse");
        assert_eq!(config.report.severe_category, "Crashed");
        assert_eq!(config.rename.source_stem, "app");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"report": {"severe_category": "Fatal"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.report.severe_category, "Fatal");
        assert_eq!(config.report.file_pattern, "*.txt");
        assert_eq!(config.catalog.marker_token, "PARSE");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.rename.source_stem = "service".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.rename.source_stem, "service");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::LogScanError::Config(_))));
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let mut config = AppConfig::default();
        config.rename.date_format = "%Q".to_string();
        assert!(matches!(config.validate(), Err(crate::LogScanError::Config(_))));

        config.rename.date_format = "%Y%m%d".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_date_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"rename": {"date_format": "%Y-%Q"}}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::LogScanError::Config(_))));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut config = AppConfig::default();
        config.catalog.marker_token.clear();
        assert!(config.validate().is_err());
    }
}
