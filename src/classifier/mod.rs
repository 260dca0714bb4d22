// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Single-pass keyword classification of a log
//!
//! Every line is lowercased once and tested against every category in
//! catalog order. Case-insensitive categories also flag lines that name the
//! category without matching any of its keywords ("new errors").

pub mod outcome;
pub mod source;

use std::path::Path;
use tracing::debug;

use crate::catalog::{Category, CategoryCatalog, MatchMode};
use crate::Result;

pub use outcome::{CategoryOutcome, ClassificationResult, Evidence, NewErrorLine};
pub use source::{lines_from_str, open_log, LineReader, LogLine};

/// Evidence key used for lines carrying the bare marker token
pub fn marker_label(marker: &str) -> String {
    format!("{} (general)", marker)
}

/// Running state for one category during the pass
struct Tally {
    matched: Vec<usize>,
    evidence: Vec<Evidence>,
    keyword_seen: Vec<bool>,
    marker_seen: bool,
    new_errors: Vec<NewErrorLine>,
}

impl Tally {
    fn new(category: &Category) -> Self {
        Self {
            matched: Vec::new(),
            evidence: Vec::new(),
            keyword_seen: vec![false; category.rule.keywords.len()],
            marker_seen: false,
            new_errors: Vec::new(),
        }
    }

    fn observe(&mut self, category: &Category, line: &LogLine, folded: &str) {
        let mut hit = false;

        match &category.rule.mode {
            MatchMode::CaseInsensitiveSubstring => {
                for (idx, keyword) in category.rule.keywords.iter().enumerate() {
                    if folded.contains(keyword.folded.as_str()) {
                        hit = true;
                        self.record_keyword(idx, &keyword.text, line);
                    }
                }

                if !hit
                    && !category.folded_name.is_empty()
                    && folded.contains(category.folded_name.as_str())
                {
                    self.new_errors.push(NewErrorLine {
                        line_number: line.number,
                        text: line.text.clone(),
                    });
                }
            }
            MatchMode::CaseSensitiveLiteralToken { marker } => {
                for (idx, keyword) in category.rule.keywords.iter().enumerate() {
                    if line.text.contains(keyword.text.as_str()) {
                        hit = true;
                        self.record_keyword(idx, &keyword.text, line);
                    }
                }

                if line.text.contains(marker.as_str()) {
                    hit = true;
                    if !self.marker_seen {
                        self.marker_seen = true;
                        self.evidence.push(Evidence {
                            keyword: marker_label(marker),
                            line: line.text.clone(),
                        });
                    }
                }
            }
        }

        // Lines arrive in order, so one push per line keeps this ascending and unique
        if hit {
            self.matched.push(line.number);
        }
    }

    fn record_keyword(&mut self, idx: usize, keyword: &str, line: &LogLine) {
        if !self.keyword_seen[idx] {
            self.keyword_seen[idx] = true;
            self.evidence.push(Evidence {
                keyword: keyword.to_string(),
                line: line.text.clone(),
            });
        }
    }

    fn finish(self, category: &Category) -> CategoryOutcome {
        CategoryOutcome {
            category: category.name.clone(),
            occurrence_count: self.matched.len(),
            matched_line_numbers: self.matched,
            evidence: self.evidence,
            new_error_lines: self.new_errors,
        }
    }
}

/// Classify every line of `lines` against `catalog`
///
/// The first line-source error aborts the pass and is returned as is; no
/// partial result escapes.
pub fn classify<I>(lines: I, catalog: &CategoryCatalog) -> Result<ClassificationResult>
where
    I: IntoIterator<Item = Result<LogLine>>,
{
    let mut tallies: Vec<Tally> = catalog.iter().map(Tally::new).collect();
    let mut lines_scanned = 0;

    for line in lines {
        let line = line?;
        let folded = line.text.to_lowercase();
        for (category, tally) in catalog.iter().zip(tallies.iter_mut()) {
            tally.observe(category, &line, &folded);
        }
        lines_scanned += 1;
    }

    let categories = catalog
        .iter()
        .zip(tallies)
        .map(|(category, tally)| tally.finish(category))
        .collect();

    Ok(ClassificationResult {
        lines_scanned,
        categories,
    })
}

/// Open and classify a log file
pub fn classify_path(path: &Path, catalog: &CategoryCatalog) -> Result<ClassificationResult> {
    let result = classify(open_log(path)?, catalog)?;
    debug!(
        "Classified {:?}: {} lines, {} known, {} new",
        path,
        result.lines_scanned,
        result.total_known_errors(),
        result.total_new_errors()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryRule, LiteralCategory};
    use crate::LogScanError;

    fn catalog(json: &str) -> CategoryCatalog {
        CategoryCatalog::from_json_str(json, &LiteralCategory::default()).unwrap()
    }

    fn run(text: &str, catalog: &CategoryCatalog) -> ClassificationResult {
        classify(lines_from_str(text), catalog).unwrap()
    }

    fn assert_consistent(result: &ClassificationResult) {
        for outcome in result.iter() {
            assert_eq!(outcome.matched_line_numbers.len(), outcome.occurrence_count);
            assert!(outcome.matched_line_numbers.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_empty_source_yields_zeroes() {
        let catalog = catalog(
            r#"{"Timeout": {"keywords": ["timed out"]}, "Parse": {"keywords": ["SYNTAX"]}}"#,
        );
        let result = run("", &catalog);
        assert_eq!(result.lines_scanned, 0);
        assert_eq!(result.categories.len(), 2);
        for outcome in result.iter() {
            assert_eq!(outcome.occurrence_count, 0);
            assert!(outcome.matched_line_numbers.is_empty());
            assert!(outcome.evidence.is_empty());
            assert!(outcome.new_error_lines.is_empty());
        }
    }

    #[test]
    fn test_timeout_and_crashed_scenario() {
        let catalog = catalog(
            r#"{"Timeout": {"keywords": ["timed out", "ETIMEDOUT"]},
                "Crashed": {"keywords": ["segfault"]}}"#,
        );
        let result = run(
            "Connection timed out after 30s\nprocess segfault detected\nCrashed unexpectedly with code 1\n",
            &catalog,
        );

        let timeout = result.get("Timeout").unwrap();
        assert_eq!(timeout.occurrence_count, 1);
        assert_eq!(timeout.matched_line_numbers, vec![1]);
        assert!(timeout.new_error_lines.is_empty());

        let crashed = result.get("Crashed").unwrap();
        assert_eq!(crashed.occurrence_count, 1);
        assert_eq!(crashed.matched_line_numbers, vec![2]);
        assert_eq!(
            crashed.new_error_lines,
            vec![NewErrorLine {
                line_number: 3,
                text: "Crashed unexpectedly with code 1".to_string(),
            }]
        );
        assert_consistent(&result);
    }

    #[test]
    fn test_case_fold_invariance() {
        let lower = catalog(r#"{"Timeout": {"keywords": ["timed out"]}}"#);
        let upper = catalog(r#"{"Timeout": {"keywords": ["TIMED OUT"]}}"#);

        for text in ["request timed out", "REQUEST TIMED OUT", "Request Timed Out"] {
            assert_eq!(run(text, &lower).count_of("Timeout"), 1, "{}", text);
            assert_eq!(run(text, &upper).count_of("Timeout"), 1, "{}", text);
        }
    }

    #[test]
    fn test_two_keywords_one_line() {
        let catalog = catalog(r#"{"Timeout": {"keywords": ["timed out", "ETIMEDOUT"]}}"#);
        let result = run("socket ETIMEDOUT: connect timed out", &catalog);

        let timeout = result.get("Timeout").unwrap();
        assert_eq!(timeout.matched_line_numbers, vec![1]);
        assert_eq!(timeout.occurrence_count, 1);
        assert_eq!(timeout.evidence.len(), 2);
        assert_eq!(timeout.evidence_for("timed out"), Some("socket ETIMEDOUT: connect timed out"));
        assert_eq!(timeout.evidence_for("ETIMEDOUT"), Some("socket ETIMEDOUT: connect timed out"));
    }

    #[test]
    fn test_first_seen_evidence_wins() {
        let catalog = catalog(r#"{"Disk": {"keywords": ["no space"]}}"#);
        let result = run(
            "boot ok\nwrite failed: no space left (sda1)\nretrying\nidle\nwrite failed: no space left (sdb1)\n",
            &catalog,
        );

        let disk = result.get("Disk").unwrap();
        assert_eq!(disk.matched_line_numbers, vec![2, 5]);
        assert_eq!(disk.evidence_for("no space"), Some("write failed: no space left (sda1)"));
        assert_eq!(disk.evidence.len(), 1);
    }

    #[test]
    fn test_evidence_keeps_insertion_order() {
        let catalog = catalog(r#"{"Net": {"keywords": ["refused", "reset", "unreachable"]}}"#);
        let result = run("peer reset\nhost unreachable\nconnection refused\n", &catalog);

        let keys: Vec<&str> = result
            .get("Net")
            .unwrap()
            .evidence
            .iter()
            .map(|e| e.keyword.as_str())
            .collect();
        assert_eq!(keys, vec!["reset", "unreachable", "refused"]);
    }

    #[test]
    fn test_evidence_stores_raw_text() {
        let catalog = catalog(r#"{"Timeout": {"keywords": ["timed out"]}}"#);
        let result = run("  Request TIMED OUT  \r\n", &catalog);
        assert_eq!(
            result.get("Timeout").unwrap().evidence_for("timed out"),
            Some("  Request TIMED OUT  ")
        );
    }

    #[test]
    fn test_keyword_match_suppresses_new_error() {
        let catalog = catalog(r#"{"Crashed": {"keywords": ["segfault"]}}"#);
        let result = run("Crashed after segfault\ncrashed again\n", &catalog);

        let crashed = result.get("Crashed").unwrap();
        assert_eq!(crashed.matched_line_numbers, vec![1]);
        assert_eq!(crashed.new_error_lines.len(), 1);
        assert_eq!(crashed.new_error_lines[0].line_number, 2);
    }

    #[test]
    fn test_new_error_with_no_keywords() {
        let catalog = catalog(r#"{"Crashed": {"keywords": []}}"#);
        let result = run("worker CRASHED\nall fine\n", &catalog);

        let crashed = result.get("Crashed").unwrap();
        assert_eq!(crashed.occurrence_count, 0);
        assert_eq!(crashed.new_error_lines.len(), 1);
        assert_eq!(crashed.new_error_lines[0].text, "worker CRASHED");
    }

    #[test]
    fn test_literal_marker_is_case_sensitive() {
        let catalog = catalog(r#"{"Parse": {"keywords": []}}"#);
        let result = run("failed to parse header\nPARSE failure in body\n", &catalog);

        let parse = result.get("Parse").unwrap();
        assert_eq!(parse.matched_line_numbers, vec![2]);
        assert_eq!(parse.evidence_for("PARSE (general)"), Some("PARSE failure in body"));
    }

    #[test]
    fn test_literal_marker_and_keyword_same_line() {
        let catalog = catalog(r#"{"Parse": {"keywords": ["SYNTAX"]}}"#);
        let result = run("PARSE SYNTAX error at token", &catalog);

        let parse = result.get("Parse").unwrap();
        assert_eq!(parse.occurrence_count, 1);
        assert_eq!(parse.matched_line_numbers, vec![1]);
        assert_eq!(parse.evidence.len(), 2);
        assert_eq!(parse.evidence_for("SYNTAX"), Some("PARSE SYNTAX error at token"));
        assert_eq!(parse.evidence_for(&marker_label("PARSE")), Some("PARSE SYNTAX error at token"));
    }

    #[test]
    fn test_literal_keywords_are_case_sensitive() {
        let catalog = catalog(r#"{"Parse": {"keywords": ["SYNTAX"]}}"#);
        let result = run("syntax warning\nSYNTAX error\n", &catalog);
        assert_eq!(result.get("Parse").unwrap().matched_line_numbers, vec![2]);
    }

    #[test]
    fn test_literal_category_never_flags_new_errors() {
        let catalog = catalog(r#"{"Parse": {"keywords": ["SYNTAX"]}}"#);
        let result = run("parse stage finished\nParse warnings: 3\n", &catalog);

        let parse = result.get("Parse").unwrap();
        assert_eq!(parse.occurrence_count, 0);
        assert!(parse.new_error_lines.is_empty());
    }

    #[test]
    fn test_literal_marker_first_seen_wins() {
        let catalog = catalog(r#"{"Parse": {"keywords": []}}"#);
        let result = run("PARSE one\nPARSE two\n", &catalog);

        let parse = result.get("Parse").unwrap();
        assert_eq!(parse.matched_line_numbers, vec![1, 2]);
        assert_eq!(parse.evidence.len(), 1);
        assert_eq!(parse.evidence[0].line, "PARSE one");
    }

    #[test]
    fn test_category_order_does_not_change_matches() {
        let forward = catalog(
            r#"{"Timeout": {"keywords": ["timed out"]}, "Network": {"keywords": ["TIMED", "socket"]}}"#,
        );
        let backward = catalog(
            r#"{"Network": {"keywords": ["TIMED", "socket"]}, "Timeout": {"keywords": ["timed out"]}}"#,
        );
        let text = "socket timed out\nnetwork down\n";

        let a = run(text, &forward);
        let b = run(text, &backward);
        for name in ["Timeout", "Network"] {
            assert_eq!(a.get(name), b.get(name));
        }
        assert_eq!(a.get("Network").unwrap().new_error_lines.len(), 1);
    }

    #[test]
    fn test_rule_built_in_code() {
        let catalog = CategoryCatalog::new(vec![(
            "Memory".to_string(),
            CategoryRule::new(["out of memory", "OOM"], MatchMode::CaseInsensitiveSubstring),
        )])
        .unwrap();
        let result = run("kernel: oom-killer invoked\n", &catalog);
        assert_eq!(result.count_of("Memory"), 1);
        assert_eq!(result.count_of("Unknown"), 0);
    }

    #[test]
    fn test_source_error_aborts_without_result() {
        let catalog = catalog(r#"{"Timeout": {"keywords": ["timed out"]}}"#);
        let bytes: &[u8] = b"timed out\n\xc3\x28 bad\n";
        let err = classify(LineReader::new(bytes, "bad.log"), &catalog).unwrap_err();
        assert!(matches!(err, LogScanError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_classify_path_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [b'o', b'k', b'\n', 0xff, 0xfe, b'\n']).unwrap();

        let catalog = catalog(r#"{"Timeout": {"keywords": ["timed out"]}}"#);
        let err = classify_path(&path, &catalog).unwrap_err();
        assert!(matches!(err, LogScanError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_classify_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.txt");
        std::fs::write(&path, "start\nrequest timed out\nstop\n").unwrap();

        let catalog = catalog(r#"{"Timeout": {"keywords": ["timed out"]}}"#);
        let result = classify_path(&path, &catalog).unwrap();
        assert_eq!(result.lines_scanned, 3);
        assert_eq!(result.get("Timeout").unwrap().matched_line_numbers, vec![2]);
        assert_consistent(&result);
    }
}
