// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for logscan

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for logscan operations
pub type Result<T> = std::result::Result<T, LogScanError>;

/// logscan error types
#[derive(Error, Debug)]
pub enum LogScanError {
    #[error("Keyword catalog not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Keyword catalog is malformed: {0}")]
    ConfigMalformed(String),

    #[error("Cannot read log {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Rename error: {0}")]
    Rename(String),

    #[error("History error: {0}")]
    History(String),
}

impl LogScanError {
    /// Build a `SourceUnreadable` error for a log path
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
