// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! logscan: keyword-driven log error classifier
//!
//! Scans plain-text logs for known and novel error signatures, writes
//! per-file and per-folder reports, and renames collected log files after
//! the folder they came from.

pub mod batch;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod rename;
pub mod report;

pub use catalog::{CategoryCatalog, CategoryRule, LiteralCategory, MatchMode};
pub use classifier::{classify, classify_path, ClassificationResult};
pub use config::AppConfig;
pub use error::{LogScanError, Result};
