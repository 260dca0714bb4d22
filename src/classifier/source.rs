// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Line sources feeding the classifier

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::{LogScanError, Result};

/// One line of a log, numbered from 1, terminator stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub number: usize,
    pub text: String,
}

/// Lazily numbers the lines of any buffered reader
///
/// Text must be valid UTF-8; the first undecodable line surfaces as
/// `SourceUnreadable` naming `origin`.
pub struct LineReader<R> {
    lines: std::io::Lines<R>,
    number: usize,
    origin: PathBuf,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, origin: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
            origin: origin.into(),
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(text) => {
                self.number += 1;
                Some(Ok(LogLine {
                    number: self.number,
                    text,
                }))
            }
            Err(e) => Some(Err(LogScanError::unreadable(&self.origin, format!(
                "line {}: {}",
                self.number + 1,
                e
            )))),
        }
    }
}

/// Open a log file for classification
pub fn open_log(path: &Path) -> Result<LineReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| LogScanError::unreadable(path, e))?;
    Ok(LineReader::new(BufReader::new(file), path))
}

/// Number the lines of an in-memory buffer
pub fn lines_from_str(text: &str) -> LineReader<&[u8]> {
    LineReader::new(text.as_bytes(), "<memory>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_from_one_and_strips_terminators() {
        let lines: Vec<LogLine> = lines_from_str("first\r\nsecond\nthird")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LogLine { number: 1, text: "first".to_string() });
        assert_eq!(lines[1].text, "second");
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        assert_eq!(lines_from_str("").count(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let bytes: &[u8] = b"ok\n\xff\xfe broken\n";
        let mut reader = LineReader::new(bytes, "bad.txt");
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(LogScanError::SourceUnreadable { path, .. }) => assert_eq!(path, PathBuf::from("bad.txt")),
            other => panic!("expected SourceUnreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_log(&dir.path().join("nope.txt")).err().unwrap();
        assert!(matches!(err, LogScanError::SourceUnreadable { .. }));
    }
}
