// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Folder analysis: classify many logs independently

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::catalog::CategoryCatalog;
use crate::classifier::{classify_path, ClassificationResult};
use crate::{LogScanError, Result};

/// Outcome of classifying one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ClassificationResult>,
}

impl FileOutcome {
    /// File name for reports (falls back to the full path)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// N of M files classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub classified: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let classified = outcomes.iter().filter(|o| o.result.is_ok()).count();
        Self {
            classified,
            failed: outcomes.len() - classified,
        }
    }

    pub fn total(&self) -> usize {
        self.classified + self.failed
    }
}

/// List files directly inside `dir` whose name matches `pattern`, sorted by name
pub fn collect_log_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LogScanError::Config(format!("'{}' is not a valid directory", dir.display())));
    }

    let pattern = glob::Pattern::new(pattern)?;
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| pattern.matches(n))
        })
        .collect();

    files.sort();
    debug!("Found {} log files in {:?}", files.len(), dir);
    Ok(files)
}

/// Classify every file on the blocking pool; results keep the input order
pub async fn analyze_folder(files: Vec<PathBuf>, catalog: Arc<CategoryCatalog>) -> Vec<FileOutcome> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let catalog = Arc::clone(&catalog);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || classify_path(&task_path, &catalog));
            (path, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(LogScanError::unreadable(&path, format!("classification task failed: {}", e))),
        };

        match &result {
            Ok(r) => info!("Analyzed {:?} ({} lines)", path, r.lines_scanned),
            Err(e) => error!("Failed to analyze {:?}: {}", path, e),
        }
        outcomes.push(FileOutcome { path, result });
    }

    outcomes
}
