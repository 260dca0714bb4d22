// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification results

use serde::{Deserialize, Serialize};

/// First line seen for a keyword (or the general marker label)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub keyword: String,
    pub line: String,
}

/// A line naming the category that none of its keywords explain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewErrorLine {
    pub line_number: usize,
    pub text: String,
}

/// What one category found in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub category: String,
    /// Distinct matching lines; always `matched_line_numbers.len()`
    pub occurrence_count: usize,
    /// Ascending, unique, 1-indexed
    pub matched_line_numbers: Vec<usize>,
    /// In first-insertion order, one entry per distinct keyword
    pub evidence: Vec<Evidence>,
    /// Encounter order; empty for the literal-token category
    pub new_error_lines: Vec<NewErrorLine>,
}

impl CategoryOutcome {
    /// Stored line for a keyword or marker label
    pub fn evidence_for(&self, keyword: &str) -> Option<&str> {
        self.evidence
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.line.as_str())
    }

    pub fn has_matches(&self) -> bool {
        self.occurrence_count > 0
    }
}

/// Per-file result, categories in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub lines_scanned: usize,
    pub categories: Vec<CategoryOutcome>,
}

impl ClassificationResult {
    pub fn get(&self, category: &str) -> Option<&CategoryOutcome> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryOutcome> {
        self.categories.iter()
    }

    /// Occurrences of a category, zero when it is not in the catalog
    pub fn count_of(&self, category: &str) -> usize {
        self.get(category).map_or(0, |c| c.occurrence_count)
    }

    pub fn total_new_errors(&self) -> usize {
        self.categories.iter().map(|c| c.new_error_lines.len()).sum()
    }

    pub fn total_known_errors(&self) -> usize {
        self.categories.iter().map(|c| c.evidence.len()).sum()
    }
}
