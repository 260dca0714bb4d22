// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logscan::catalog::{CategoryCatalog, CategoryRule, MatchMode};
use logscan::classifier::{classify, LineReader};

#[derive(Arbitrary, Debug)]
struct Input {
    categories: Vec<(String, Vec<String>, bool)>,
    log: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let rules = input.categories.into_iter().map(|(name, keywords, literal)| {
        let mode = if literal {
            MatchMode::CaseSensitiveLiteralToken { marker: "PARSE".to_string() }
        } else {
            MatchMode::CaseInsensitiveSubstring
        };
        (name, CategoryRule::new(keywords, mode))
    });
    let Ok(catalog) = CategoryCatalog::new(rules) else {
        return;
    };

    if let Ok(result) = classify(LineReader::new(input.log.as_slice(), "<fuzz>"), &catalog) {
        for outcome in result.iter() {
            assert_eq!(outcome.occurrence_count, outcome.matched_line_numbers.len());
            assert!(outcome.matched_line_numbers.windows(2).all(|w| w[0] < w[1]));
        }
    }
});
