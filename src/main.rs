// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! logscan: keyword-driven log error classifier
//!
//! Analyzes single logs or whole folders against a keyword catalog and
//! renames collected log files after their source folder.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use logscan::batch::{analyze_folder, collect_log_files, BatchSummary};
use logscan::catalog::CategoryCatalog;
use logscan::classifier::classify_path;
use logscan::config::AppConfig;
use logscan::history::History;
use logscan::rename::{execute, plan_folder, plan_tree, NamingRule, RenamePlan};
use logscan::report::{
    consolidated_dir, consolidated_report_name, default_report_name, rank_by_severity,
    render_consolidated, render_file_report, render_priority_summary, summary_report_name,
    write_report, FileSummary,
};
use logscan::{LogScanError, Result};

/// logscan CLI - keyword-driven log error classifier
#[derive(Parser, Debug)]
#[command(name = "logscan")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Classify log files by error keywords and rename collected logs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Keyword catalog (overrides config)
    #[arg(short, long, global = true)]
    keywords: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single log file
    Analyze {
        /// Log file to analyze
        path: PathBuf,

        /// Where to save the report (default: <name>_analysis_<date>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report without saving it
        #[arg(long)]
        no_save: bool,
    },

    /// Analyze every log in a folder and write consolidated reports
    Folder {
        /// Folder containing log files
        dir: PathBuf,

        /// Where to create the report folder (default: current directory)
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Move app*.txt logs out of a folder, named after the folder
    Rename {
        /// Folder containing the logs
        dir: PathBuf,

        /// Destination folder
        #[arg(short, long)]
        save: PathBuf,

        /// Show what would be renamed
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy app*.txt logs out of every subfolder, named after each subfolder
    RenameTree {
        /// Folder whose subfolders contain the logs
        master: PathBuf,

        /// Where to create <master>_Renamed
        #[arg(short, long)]
        save: PathBuf,

        /// Show what would be copied
        #[arg(long)]
        dry_run: bool,
    },

    /// History and undo operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Interactive menu
    Menu,
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent history entries
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Undo recent renames
    Undo {
        /// Number of renames to undo (0 for all)
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Dry run (show what would be undone)
        #[arg(long)]
        dry_run: bool,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration and keyword catalog
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(keywords) = cli.keywords {
        config.catalog.path = keywords;
    }

    match cli.command {
        Some(Commands::Analyze { path, output, no_save }) => {
            run_analyze(&config, &path, output, no_save, &cli.format)
        }
        Some(Commands::Folder { dir, save }) => {
            run_folder(&config, &dir, save, &cli.format).await
        }
        Some(Commands::Rename { dir, save, dry_run }) => {
            let rule = NamingRule::from_config(&config.rename, &Local::now())?;
            let plan = plan_folder(&dir, &save, &rule)?;
            run_rename(&config, plan, dry_run)
        }
        Some(Commands::RenameTree { master, save, dry_run }) => {
            let rule = NamingRule::from_config(&config.rename, &Local::now())?;
            let plan = plan_tree(&master, &save, &rule)?;
            run_rename(&config, plan, dry_run)
        }
        Some(Commands::History { action }) => run_history_command(&config, action),
        Some(Commands::Config { action }) => run_config_command(&config, action, &cli.config),
        Some(Commands::Menu) | None => run_menu(&config, &cli.format).await,
    }
}

fn load_catalog(config: &AppConfig) -> Result<CategoryCatalog> {
    let catalog = CategoryCatalog::load(&config.catalog.path, &config.catalog.literal())?;
    info!("Loaded {} categories: {:?}", catalog.len(), catalog.names());
    Ok(catalog)
}

/// Analyze one log file and save its report
fn run_analyze(
    config: &AppConfig,
    path: &Path,
    output: Option<PathBuf>,
    no_save: bool,
    format: &str,
) -> Result<()> {
    let catalog = load_catalog(config)?;
    let result = classify_path(path, &catalog)?;

    let text = render_file_report(&result)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "jsonl" => println!("{}", serde_json::to_string(&result)?),
        _ => print!("{}", text),
    }

    if no_save {
        return Ok(());
    }

    let output = output.unwrap_or_else(|| PathBuf::from(default_report_name(path, &Local::now())));
    write_report(&output, &text)?;
    if format == "text" {
        println!("\nAnalysis complete. Results saved to {}", output.display());
    }
    Ok(())
}

/// Analyze a folder of logs and write the consolidated and summary reports
async fn run_folder(config: &AppConfig, dir: &Path, save: Option<PathBuf>, format: &str) -> Result<()> {
    let catalog = Arc::new(load_catalog(config)?);

    let files = collect_log_files(dir, &config.report.file_pattern)?;
    if files.is_empty() {
        println!("No files matching '{}' found in {}", config.report.file_pattern, dir.display());
        return Ok(());
    }

    let outcomes = analyze_folder(files, catalog).await;
    let summary = BatchSummary::from_outcomes(&outcomes);

    match format {
        "json" | "jsonl" => {
            let rows: Vec<serde_json::Value> = outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(r) => serde_json::json!({ "file": o.file_name(), "result": r }),
                    Err(e) => serde_json::json!({ "file": o.file_name(), "error": e.to_string() }),
                })
                .collect();
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{}", serde_json::to_string(row)?);
                }
            }
        }
        _ => {}
    }

    let now = Local::now();
    let folder = logscan::rename::folder_name(dir)?;
    let report_dir = consolidated_dir(&save.unwrap_or_else(|| PathBuf::from(".")), &folder, &now);

    let consolidated = render_consolidated(dir, &outcomes, &now, config.report.separator_width)?;
    write_report(&report_dir.join(consolidated_report_name(&folder, &now)), &consolidated)?;

    let severe = &config.report.severe_category;
    let ranked = rank_by_severity(
        outcomes.iter().map(|o| FileSummary::from_outcome(o, severe)).collect(),
    );
    let priority = render_priority_summary(&folder, severe, &ranked, &now, config.report.separator_width)?;
    write_report(&report_dir.join(summary_report_name(&folder, &now)), &priority)?;

    if format == "text" {
        println!(
            "Analysis complete: {} of {} files classified. Reports saved to {}",
            summary.classified,
            summary.total(),
            report_dir.display()
        );
    }
    if summary.failed > 0 {
        warn!("{} file(s) could not be analyzed", summary.failed);
    }
    Ok(())
}

/// Execute a rename plan, journaling into the configured history
fn run_rename(config: &AppConfig, plan: RenamePlan, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("DRY RUN MODE - files will not be renamed");
    }
    let history = History::new(config.rename.history_path.clone());
    let report = execute(&plan, Some(&history), dry_run)?;

    for (from, to) in &report.completed {
        println!("{}{} -> {}", if dry_run { "Would rename: " } else { "" }, from.display(), to.display());
    }
    for (path, reason) in &report.failed {
        eprintln!("Failed: {} ({})", path.display(), reason);
    }
    println!(
        "Renaming completed: {} renamed, {} skipped, {} failed. Destination: {}",
        report.completed.len(),
        report.skipped,
        report.failed.len(),
        plan.destination.display()
    );
    Ok(())
}

/// Run history commands
fn run_history_command(config: &AppConfig, action: HistoryCommands) -> Result<()> {
    let history = History::new(config.rename.history_path.clone());

    match action {
        HistoryCommands::List { count } => {
            let entries = history.get_recent(count)?;
            println!("Recent history ({} entries):", entries.len());
            for entry in entries {
                let status = if entry.undone { "[UNDONE]" } else { "" };
                println!("  {} {:?} {} -> {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.action,
                    entry.original_path.display(),
                    entry.new_path.display(),
                    status
                );
            }
        }
        HistoryCommands::Undo { count, dry_run } => {
            let report = history.undo_recent(count, dry_run)?;
            if report.reverted.is_empty() && report.skipped.is_empty() {
                println!("No renames to undo");
                return Ok(());
            }
            for entry in &report.reverted {
                println!("{} {} -> {}",
                    if dry_run { "Would undo:" } else { "Undone:" },
                    entry.new_path.display(),
                    entry.original_path.display()
                );
            }
            for (entry, reason) in &report.skipped {
                eprintln!("Skipped: {} ({})", entry.new_path.display(), reason);
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: &AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            let catalog = load_catalog(config)?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Keyword catalog: {}", config.catalog.path.display());
            for category in catalog.iter() {
                let mode = if category.rule.is_literal() { " (literal)" } else { "" };
                println!("    {}{}: {} keywords", category.name, mode, category.rule.keywords.len());
            }
            println!("  Severe category: {}", config.report.severe_category);
            if catalog.get(&config.report.severe_category).is_none() {
                warn!("Severe category '{}' is not in the catalog", config.report.severe_category);
            }
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_path(label: &str) -> Result<Option<PathBuf>> {
    Ok(prompt(label)?.filter(|s| !s.is_empty()).map(PathBuf::from))
}

/// Numbered menu over the main workflows; failures are reported and the menu continues
async fn run_menu(config: &AppConfig, format: &str) -> Result<()> {
    loop {
        println!("\n===== Log Automation Menu =====");
        println!("1. Analyze a single log file");
        println!("2. Analyze multiple log files in a folder");
        println!("3. Rename logs in a folder");
        println!("4. Rename logs in every subfolder");
        println!("0. Exit");

        let Some(choice) = prompt("Enter your choice: ")? else {
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => match prompt_path("Log file: ")? {
                Some(path) => run_analyze(config, &path, None, false, format),
                None => {
                    println!("No file selected.");
                    Ok(())
                }
            },
            "2" => match prompt_path("Folder: ")? {
                Some(dir) => {
                    let save = prompt_path("Save reports in (blank for current directory): ")?;
                    run_folder(config, &dir, save, format).await
                }
                None => {
                    println!("No folder selected.");
                    Ok(())
                }
            },
            "3" | "4" => {
                let source = prompt_path("Source folder: ")?;
                let save = prompt_path("Save renamed files in: ")?;
                match (source, save) {
                    (Some(source), Some(save)) => {
                        NamingRule::from_config(&config.rename, &Local::now()).and_then(|rule| {
                            let plan = if choice == "3" {
                                plan_folder(&source, &save, &rule)?
                            } else {
                                plan_tree(&source, &save, &rule)?
                            };
                            run_rename(config, plan, false)
                        })
                    }
                    _ => {
                        println!("No folder or save path provided.");
                        Ok(())
                    }
                }
            }
            "0" => {
                println!("Exiting the program.");
                return Ok(());
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            report_menu_error(&e);
        }
    }
}

fn report_menu_error(e: &LogScanError) {
    match e {
        LogScanError::ConfigNotFound(path) => {
            eprintln!("Error: Could not find the keyword catalog at {}.", path.display())
        }
        other => eprintln!("Error: {}", other),
    }
}
