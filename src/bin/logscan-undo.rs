// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! logscan Undo Utility
//!
//! Reverses log renames recorded in the history journal without needing a
//! config file.

use clap::Parser;
use std::path::PathBuf;

use logscan::history::History;
use logscan::Result;

#[derive(Parser, Debug)]
#[command(name = "logscan-undo")]
#[command(version = "1.0.0")]
#[command(about = "Undo logscan log renames")]
struct Args {
    /// Path to history file
    #[arg(short = 'f', long, default_value = "logscan_history.jsonl")]
    history_file: PathBuf,

    /// Number of renames to undo (default: 1, use 0 for all)
    #[arg(short, long, default_value = "1")]
    count: usize,

    /// Dry run - show what would be undone without doing it
    #[arg(long)]
    dry_run: bool,

    /// List all entries in history
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_target(false)
        .init();

    if !args.history_file.exists() {
        eprintln!("History file not found: {:?}", args.history_file);
        eprintln!("No renames to undo.");
        return Ok(());
    }

    let history = History::new(args.history_file.clone());

    if args.list {
        let entries = history.get_recent(usize::MAX)?;
        println!("Rename History ({} entries):", entries.len());
        println!("{:-<80}", "");
        for (i, entry) in entries.iter().enumerate() {
            println!(
                "{:3}. [{}] {:?} {} -> {}{}",
                i + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.action,
                entry.original_path.display(),
                entry.new_path.display(),
                if entry.undone { " [UNDONE]" } else { "" }
            );
        }
        return Ok(());
    }

    let report = history.undo_recent(args.count, args.dry_run)?;

    println!(
        "{}Undoing {} rename(s)...",
        if args.dry_run { "[DRY RUN] " } else { "" },
        report.reverted.len() + report.skipped.len()
    );

    for entry in &report.reverted {
        println!(
            "  {}: {} -> {}",
            if args.dry_run { "Would undo" } else { "Undone" },
            entry.new_path.display(),
            entry.original_path.display()
        );
    }
    for (entry, reason) in &report.skipped {
        eprintln!("  Skip: {} ({})", entry.new_path.display(), reason);
    }

    println!();
    if args.dry_run {
        println!("Dry run complete. {} rename(s) would be undone.", report.reverted.len());
    } else {
        println!(
            "Done. {} undone, {} failed/skipped.",
            report.reverted.len(),
            report.skipped.len()
        );
    }

    Ok(())
}
