// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Keyword catalog: error categories and how their keywords are matched
//!
//! The catalog is a JSON object mapping category names to
//! `{"keywords": [...]}`. It is loaded once per run and then shared
//! read-only between every classification.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::{LogScanError, Result};

/// How a category's keywords are tested against a log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchMode {
    /// Lowercased keyword is a substring of the lowercased line
    CaseInsensitiveSubstring,
    /// `marker` (and every keyword) appears verbatim in the raw line
    CaseSensitiveLiteralToken { marker: String },
}

/// A keyword with its case-folded form precomputed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub folded: String,
}

impl Keyword {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let folded = text.to_lowercase();
        Self { text, folded }
    }
}

/// Matching rule for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub keywords: Vec<Keyword>,
    pub mode: MatchMode,
}

impl CategoryRule {
    /// Build a rule, dropping empty and repeated keywords (first occurrence kept)
    pub fn new<I, S>(keywords: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<Keyword> = Vec::new();
        for keyword in keywords {
            let keyword = Keyword::new(keyword);
            // An empty keyword would match every line
            if keyword.text.is_empty() {
                continue;
            }
            if !unique.iter().any(|k| k.text == keyword.text) {
                unique.push(keyword);
            }
        }
        Self { keywords: unique, mode }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.mode, MatchMode::CaseSensitiveLiteralToken { .. })
    }
}

/// A named category in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Lowercased name, searched for when flagging new errors
    pub folded_name: String,
    pub rule: CategoryRule,
}

/// Name and marker token of the reserved literal-token category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralCategory {
    pub name: String,
    pub marker: String,
}

impl Default for LiteralCategory {
    fn default() -> Self {
        Self {
            name: "Parse".to_string(),
            marker: "PARSE".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawCategory {
    keywords: Vec<String>,
}

/// Ordered, immutable set of error categories
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Build a catalog from `(name, rule)` pairs, in the given order
    pub fn new<I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, CategoryRule)>,
    {
        let mut catalog = Self::default();
        for (name, rule) in categories {
            if catalog.get(&name).is_some() {
                return Err(LogScanError::ConfigMalformed(format!(
                    "category '{}' is defined twice",
                    name
                )));
            }
            catalog.categories.push(Category {
                folded_name: name.to_lowercase(),
                name,
                rule,
            });
        }
        Ok(catalog)
    }

    /// Load the catalog from a JSON file
    pub fn load(path: &Path, literal: &LiteralCategory) -> Result<Self> {
        if !path.exists() {
            return Err(LogScanError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogScanError::ConfigMalformed(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&content, literal)?;
        debug!("Loaded {} categories from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse the catalog from a JSON document
    pub fn from_json_str(content: &str, literal: &LiteralCategory) -> Result<Self> {
        if literal.marker.is_empty() {
            return Err(LogScanError::ConfigMalformed(format!(
                "category '{}' needs a non-empty marker token",
                literal.name
            )));
        }

        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| LogScanError::ConfigMalformed(format!("invalid JSON: {}", e)))?;

        let object = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(LogScanError::ConfigMalformed(format!(
                    "expected an object of categories, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut categories = Vec::with_capacity(object.len());
        for (name, details) in object {
            let raw: RawCategory = serde_json::from_value(details)
                .map_err(|e| LogScanError::ConfigMalformed(format!("category '{}': {}", name, e)))?;

            let mode = if name == literal.name {
                MatchMode::CaseSensitiveLiteralToken {
                    marker: literal.marker.clone(),
                }
            } else {
                MatchMode::CaseInsensitiveSubstring
            };
            categories.push((name, CategoryRule::new(raw.keywords, mode)));
        }

        Self::new(categories)
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
