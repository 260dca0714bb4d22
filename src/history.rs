// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rename journal for undo support

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::{LogScanError, Result};

/// How a log file reached its new name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameAction {
    /// The original was moved; undo moves it back
    Move,
    /// The original was left in place; undo deletes the copy
    Copy,
}

/// A single journaled rename
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: RenameAction,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    #[serde(default)]
    pub undone: bool,
}

impl HistoryEntry {
    pub fn new(action: RenameAction, original_path: PathBuf, new_path: PathBuf) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            original_path,
            new_path,
            undone: false,
        }
    }

    /// Reverse this entry on disk
    pub fn revert(&self) -> Result<()> {
        if !self.new_path.exists() {
            return Err(LogScanError::History(format!(
                "{} not found (may have been moved/deleted)",
                self.new_path.display()
            )));
        }

        match self.action {
            RenameAction::Move => {
                if self.original_path.exists() {
                    return Err(LogScanError::History(format!(
                        "{} already exists",
                        self.original_path.display()
                    )));
                }
                fs::rename(&self.new_path, &self.original_path)?;
            }
            RenameAction::Copy => {
                if !self.original_path.exists() {
                    return Err(LogScanError::History(format!(
                        "original {} is gone, keeping the copy",
                        self.original_path.display()
                    )));
                }
                fs::remove_file(&self.new_path)?;
            }
        }
        Ok(())
    }
}

/// JSON Lines journal of renames
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the journal
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse history entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Most recent N entries, newest first
    pub fn get_recent(&self, count: usize) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }

    pub fn mark_undone(&self, id: &str) -> Result<()> {
        let entries = self.read_all()?;

        let file = File::create(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);

        for mut entry in entries {
            if entry.id == id {
                entry.undone = true;
            }
            let json = serde_json::to_string(&entry)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Entries not yet undone, oldest first
    pub fn get_undoable(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self.read_all()?;
        Ok(entries.into_iter().filter(|e| !e.undone).collect())
    }

    /// Revert the `count` most recent undoable entries (0 = all)
    ///
    /// Entries that cannot be reverted are skipped and reported back.
    pub fn undo_recent(&self, count: usize, dry_run: bool) -> Result<UndoReport> {
        let mut pending = self.get_undoable()?;
        pending.reverse();
        if count > 0 {
            pending.truncate(count);
        }

        let mut report = UndoReport::default();
        for entry in pending {
            if dry_run {
                report.reverted.push(entry);
                continue;
            }
            match entry.revert() {
                Ok(()) => {
                    self.mark_undone(&entry.id)?;
                    tracing::info!("Undone: {:?} -> {:?}", entry.new_path, entry.original_path);
                    report.reverted.push(entry);
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", entry.new_path, e);
                    report.skipped.push((entry, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What an undo pass did
#[derive(Debug, Default)]
pub struct UndoReport {
    pub reverted: Vec<HistoryEntry>,
    pub skipped: Vec<(HistoryEntry, String)>,
}
