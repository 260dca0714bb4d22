// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Folder-derived log file naming
//!
//! Services write `app.txt` (current) and `app.<suffix>.txt` (rotated).
//! Collected into one place those names collide, so each file takes the
//! name of the folder it came from: `app.txt` becomes
//! `<folder>.<date>.txt` and `app.<suffix>.txt` becomes
//! `<folder>.<suffix>.txt`.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{check_date_format, RenameConfig};
use crate::history::{History, HistoryEntry, RenameAction};
use crate::{LogScanError, Result};

/// Naming convention for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRule {
    pub stem: String,
    pub extension: String,
    /// Already formatted date for `<stem>.<ext>` files
    pub date: String,
}

impl NamingRule {
    pub fn from_config(config: &RenameConfig, now: &DateTime<Local>) -> Result<Self> {
        check_date_format(&config.date_format)?;
        let mut date = String::new();
        write!(date, "{}", now.format(&config.date_format))?;

        Ok(Self {
            stem: config.source_stem.clone(),
            extension: config.extension.clone(),
            date,
        })
    }

    /// New name for `file_name` taken from `folder_name`, `None` to skip
    pub fn target_name(&self, file_name: &str, folder_name: &str) -> Option<String> {
        let prefix = format!("{}.", self.stem);
        let suffix = format!(".{}", self.extension);

        if file_name == format!("{}{}", self.stem, suffix) {
            return Some(format!("{}.{}{}", folder_name, self.date, suffix));
        }

        if file_name.len() > prefix.len() + suffix.len()
            && file_name.starts_with(&prefix)
            && file_name.ends_with(&suffix)
        {
            return Some(format!("{}.{}", folder_name, &file_name[prefix.len()..]));
        }

        None
    }
}

/// One file scheduled for renaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRename {
    pub source: PathBuf,
    pub target_name: String,
}

/// Everything a rename run will do, computed before touching disk
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub action: RenameAction,
    pub destination: PathBuf,
    pub items: Vec<PlannedRename>,
    pub skipped: Vec<PathBuf>,
}

/// What a rename run did
#[derive(Debug, Default)]
pub struct RenameReport {
    pub completed: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<(PathBuf, String)>,
    pub skipped: usize,
}

/// Last path component of a directory, resolving `.` and `..`
pub fn folder_name(dir: &Path) -> Result<String> {
    let resolved = dir.canonicalize()?;
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| LogScanError::Rename(format!("cannot derive a name from {}", dir.display())))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn plan_files(dir: &Path, folder: &str, rule: &NamingRule, plan: &mut RenamePlan) -> Result<()> {
    for path in sorted_entries(dir)? {
        if !path.is_file() {
            continue;
        }
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match rule.target_name(&file_name, folder) {
            Some(target_name) => plan.items.push(PlannedRename { source: path, target_name }),
            None => {
                debug!("Skipping file (does not match pattern): {}", file_name);
                plan.skipped.push(path);
            }
        }
    }
    Ok(())
}

/// Move matching files of `dir` into `save`, named after `dir`
pub fn plan_folder(dir: &Path, save: &Path, rule: &NamingRule) -> Result<RenamePlan> {
    if !dir.is_dir() {
        return Err(LogScanError::Rename(format!("'{}' is not a valid directory", dir.display())));
    }
    let folder = folder_name(dir)?;
    let mut plan = RenamePlan {
        action: RenameAction::Move,
        destination: save.to_path_buf(),
        items: Vec::new(),
        skipped: Vec::new(),
    };
    plan_files(dir, &folder, rule, &mut plan)?;
    Ok(plan)
}

/// Copy matching files of every subfolder of `master` into
/// `<save>/<master>_Renamed`, each named after its own subfolder
pub fn plan_tree(master: &Path, save: &Path, rule: &NamingRule) -> Result<RenamePlan> {
    if !master.is_dir() {
        return Err(LogScanError::Rename(format!("'{}' is not a valid directory", master.display())));
    }
    let master_name = folder_name(master)?;
    let mut plan = RenamePlan {
        action: RenameAction::Copy,
        destination: save.join(format!("{}_Renamed", master_name)),
        items: Vec::new(),
        skipped: Vec::new(),
    };

    for sub in sorted_entries(master)? {
        if !sub.is_dir() {
            continue;
        }
        let sub_name = sub.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        info!("Processing subfolder: {}", sub_name);
        plan_files(&sub, &sub_name, rule, &mut plan)?;
    }
    Ok(plan)
}

/// Pick a path for `name` in `dir` that is neither on disk nor already
/// claimed by this run, suffixing a time stamp on collision
fn free_target(dir: &Path, name: &str, claimed: &HashSet<PathBuf>) -> PathBuf {
    let taken = |p: &Path| p.exists() || claimed.contains(p);

    let candidate = dir.join(name);
    if !taken(&candidate) {
        return candidate;
    }

    let (base, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    let timestamp = Local::now().format("%H%M%S").to_string();
    let mut candidate = dir.join(format!("{}_{}{}", base, timestamp, ext));
    let mut n = 1;
    while taken(&candidate) {
        candidate = dir.join(format!("{}_{}_{}{}", base, timestamp, n, ext));
        n += 1;
    }
    candidate
}

/// EXDEV on unix, ERROR_NOT_SAME_DEVICE on windows
fn crosses_devices(e: &std::io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18;
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17;
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    e.raw_os_error() == Some(CROSS_DEVICE)
}

/// Copy `source` to `target`, removing whatever was written on failure
fn copy_or_clean(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Err(e) = std::fs::copy(source, target) {
        let _ = std::fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

fn transfer(action: RenameAction, source: &Path, target: &Path) -> std::io::Result<()> {
    match action {
        RenameAction::Copy => copy_or_clean(source, target),
        RenameAction::Move => match std::fs::rename(source, target) {
            Ok(()) => Ok(()),
            Err(e) if crosses_devices(&e) => {
                copy_or_clean(source, target)?;
                if let Err(e) = std::fs::remove_file(source) {
                    // Leave the original in place rather than an untracked duplicate
                    let _ = std::fs::remove_file(target);
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
    }
}

/// Carry out a plan, journaling each completed file
pub fn execute(plan: &RenamePlan, history: Option<&History>, dry_run: bool) -> Result<RenameReport> {
    let mut report = RenameReport {
        skipped: plan.skipped.len(),
        ..Default::default()
    };

    if !dry_run {
        std::fs::create_dir_all(&plan.destination)?;
    }

    let mut claimed = HashSet::new();
    for item in &plan.items {
        let target = free_target(&plan.destination, &item.target_name, &claimed);
        claimed.insert(target.clone());

        if dry_run {
            info!("DRY RUN: Would {:?} {:?} to {:?}", plan.action, item.source, target);
            report.completed.push((item.source.clone(), target));
            continue;
        }

        match transfer(plan.action, &item.source, &target) {
            Ok(()) => {
                info!("Renamed {:?} -> {:?}", item.source, target);
                if let Some(history) = history {
                    let entry = HistoryEntry::new(plan.action, item.source.clone(), target.clone());
                    if let Err(e) = history.append(&entry) {
                        warn!("Failed to journal rename of {:?}: {}", item.source, e);
                    }
                }
                report.completed.push((item.source.clone(), target));
            }
            Err(e) => {
                error!("Failed to rename {:?}: {}", item.source, e);
                report.failed.push((item.source.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}
