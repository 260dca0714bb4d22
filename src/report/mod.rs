// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text reports for single files and whole folders

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::batch::FileOutcome;
use crate::classifier::{CategoryOutcome, ClassificationResult};
use crate::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SUMMARY_RULE_WIDTH: usize = 50;

/// `<stem>_analysis_<date>.txt` for a single-file report
pub fn default_report_name(log_path: &Path, now: &DateTime<Local>) -> String {
    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "log".to_string());
    format!("{}_analysis_{}.txt", stem, now.format(DATE_FORMAT))
}

/// Folder holding the consolidated and summary reports of one run
pub fn consolidated_dir(save_root: &Path, folder_name: &str, now: &DateTime<Local>) -> PathBuf {
    save_root.join(format!("{}_ConsolidatedReport_{}", folder_name, now.format(DATE_FORMAT)))
}

pub fn consolidated_report_name(folder_name: &str, now: &DateTime<Local>) -> String {
    format!("{}_ExceptionAnalysis_{}.txt", folder_name, now.format(DATE_FORMAT))
}

pub fn summary_report_name(folder_name: &str, now: &DateTime<Local>) -> String {
    format!("{}_ReportSummary_{}.txt", folder_name, now.format(DATE_FORMAT))
}

fn render_category(out: &mut String, outcome: &CategoryOutcome) -> std::fmt::Result {
    writeln!(out, "  Total Occurrences: {}", outcome.occurrence_count)?;
    if outcome.has_matches() {
        let lines: Vec<String> = outcome.matched_line_numbers.iter().map(|n| n.to_string()).collect();
        writeln!(out, "  Found on Lines: {}\n", lines.join(", "))?;
        writeln!(out, "  Known Errors:")?;
        for evidence in &outcome.evidence {
            writeln!(out, "    - {}: {}", evidence.keyword, evidence.line.trim())?;
        }
    } else {
        writeln!(out, "  No occurrences found.\n")?;
    }

    if !outcome.new_error_lines.is_empty() {
        writeln!(out, "\n  New Errors Found: {}", outcome.new_error_lines.len())?;
        for new_error in &outcome.new_error_lines {
            writeln!(out, "    Line {}: {}", new_error.line_number, new_error.text.trim())?;
        }
    }
    Ok(())
}

/// Report for one classified file
pub fn render_file_report(result: &ClassificationResult) -> Result<String> {
    let mut out = String::from("\nError Analysis:\n\n");
    for outcome in result.iter() {
        writeln!(out, "{}:", outcome.category)?;
        render_category(&mut out, outcome)?;
        out.push('\n');
    }
    Ok(out)
}

/// One report covering every file of a folder run
pub fn render_consolidated(
    folder: &Path,
    outcomes: &[FileOutcome],
    now: &DateTime<Local>,
    width: usize,
) -> Result<String> {
    let rule = "=".repeat(width);
    let mut out = String::new();

    writeln!(out, "Consolidated Error Analysis Report\n")?;
    writeln!(out, "Date: {}\n", now.format(TIMESTAMP_FORMAT))?;
    writeln!(out, "Folder: {}\n", folder.display())?;
    writeln!(out, "{}\n", rule)?;

    for file in outcomes {
        writeln!(out, "Analyzing File: {}\n", file.file_name())?;
        writeln!(out, "{}", rule)?;

        match &file.result {
            Ok(result) => {
                for outcome in result.iter() {
                    writeln!(out, "\n{}:", outcome.category)?;
                    render_category(&mut out, outcome)?;
                }
            }
            Err(e) => {
                writeln!(out, "\n  Could not analyze file: {}", e)?;
            }
        }

        writeln!(out, "{}\n", rule)?;
    }

    Ok(out)
}

/// Per-file counts used to rank a folder run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    /// Occurrences of the configured severe category
    pub severe: usize,
    pub new_errors: usize,
    pub known_errors: usize,
    pub error: Option<String>,
}

impl FileSummary {
    pub fn from_outcome(outcome: &FileOutcome, severe_category: &str) -> Self {
        match &outcome.result {
            Ok(result) => Self::from_result(outcome.file_name(), result, severe_category),
            Err(e) => Self {
                file_name: outcome.file_name(),
                severe: 0,
                new_errors: 0,
                known_errors: 0,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn from_result(file_name: String, result: &ClassificationResult, severe_category: &str) -> Self {
        Self {
            file_name,
            severe: result.count_of(severe_category),
            new_errors: result.total_new_errors(),
            known_errors: result.total_known_errors(),
            error: None,
        }
    }
}

/// Most severe first; ties by file name, unreadable files last
pub fn rank_by_severity(mut summaries: Vec<FileSummary>) -> Vec<FileSummary> {
    summaries.sort_by(|a, b| {
        a.error
            .is_some()
            .cmp(&b.error.is_some())
            .then(b.severe.cmp(&a.severe))
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    summaries
}

/// Ranked summary of a folder run
pub fn render_priority_summary(
    folder_name: &str,
    severe_category: &str,
    ranked: &[FileSummary],
    now: &DateTime<Local>,
    width: usize,
) -> Result<String> {
    let file_rule = "=".repeat(SUMMARY_RULE_WIDTH);
    let mut out = String::new();

    writeln!(out, "Priority Analysis Report")?;
    writeln!(out, "Date: {}", now.format(TIMESTAMP_FORMAT))?;
    writeln!(out, "Folder: {}", folder_name)?;
    writeln!(out, "{}", "=".repeat(width))?;

    for summary in ranked {
        writeln!(out, "File: {}", summary.file_name)?;
        writeln!(out, "{}", "_".repeat(SUMMARY_RULE_WIDTH))?;
        match &summary.error {
            Some(e) => {
                writeln!(out, "  Not analyzed: {}\n", e)?;
            }
            None => {
                writeln!(out, "  {} Errors: {}", severe_category, summary.severe)?;
                writeln!(out, "  New Errors: {}", summary.new_errors)?;
                writeln!(out, "  Known Errors: {}\n", summary.known_errors)?;
            }
        }
        writeln!(out, "{}\n", file_rule)?;
    }

    Ok(out)
}

/// Write a rendered report, creating parent directories
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!("Report saved to {:?}", path);
    Ok(())
}
