use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use glam_usage::config::get_config;
use glam_usage::diff::DiffEngine;
use glam_usage::logging::init_logging;
use glam_usage::period::ReportingPeriod;
use glam_usage::report::render_comparison;
use glam_usage::store::SnapshotStore;
use glam_usage::{CaptureParams, UsageTracker};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "glam-usage")]
#[command(about = "Snapshot and diff tracking for GLAM media usage reports")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a rendered report document and persist it as a snapshot
    Record {
        /// Path to the rendered report document, or "-" for stdin
        #[arg(long)]
        input: PathBuf,
        /// Store root directory
        #[arg(long)]
        store: Option<PathBuf>,
        /// Category subdirectory under the store root
        #[arg(long)]
        category: Option<String>,
        /// Category display name recorded in snapshot metadata
        #[arg(long)]
        category_name: Option<String>,
        /// Category tree depth recorded in snapshot metadata
        #[arg(long)]
        depth: Option<u32>,
        /// Reporting period year (with --month; defaults to the previous month)
        #[arg(long, requires = "month")]
        year: Option<i32>,
        /// Reporting period month (with --year; defaults to the previous month)
        #[arg(long, requires = "year")]
        month: Option<u32>,
        /// Write the month-over-month summary regardless of the date
        #[arg(long)]
        monthly: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent snapshot for a category
    Latest {
        /// Store root directory
        #[arg(long)]
        store: Option<PathBuf>,
        /// Category subdirectory under the store root
        #[arg(long)]
        category: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Render a comparison between two snapshot directories
    Compare {
        /// The newer snapshot directory
        current: PathBuf,
        /// The older snapshot directory to compare against
        previous: PathBuf,
    },
}

fn main() -> Result<()> {
    let _log_guard = init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            input,
            store,
            category,
            category_name,
            depth,
            year,
            month,
            monthly,
            json,
        } => {
            let result = run_record(
                &input,
                store,
                category,
                category_name,
                depth,
                year,
                month,
                monthly,
                json,
            );
            match result {
                Ok(()) => Ok(()),
                Err(e) => handle_error(e, json),
            }
        }
        Commands::Latest {
            store,
            category,
            json,
        } => match run_latest(store, category, json) {
            Ok(()) => Ok(()),
            Err(e) => handle_error(e, json),
        },
        Commands::Compare { current, previous } => match run_compare(&current, &previous) {
            Ok(()) => Ok(()),
            Err(e) => handle_error(e, false),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_record(
    input: &Path,
    store: Option<PathBuf>,
    category: Option<String>,
    category_name: Option<String>,
    depth: Option<u32>,
    year: Option<i32>,
    month: Option<u32>,
    monthly: bool,
    json: bool,
) -> Result<()> {
    let document = read_document(input)?;

    let mut params = CaptureParams::from_config();
    if let Some(category) = category {
        params.subdir = category;
    }
    if let Some(name) = category_name {
        params.category = name;
    }
    if let Some(depth) = depth {
        params.depth = depth;
    }
    if let (Some(year), Some(month)) = (year, month) {
        if !(1..=12).contains(&month) {
            anyhow::bail!("Month must be between 1 and 12, got {}", month);
        }
        params.period = ReportingPeriod::new(year, month);
    }
    params.force_monthly = monthly;

    let store_root = store.unwrap_or_else(|| get_config().store.root.clone());

    let tracker = UsageTracker::new();
    let outcome = tracker.record_capture(&document, &store_root, &params)?;

    if json {
        let output = serde_json::json!({
            "directory": outcome.directory,
            "usageChanges": outcome.usage_changes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} Snapshot recorded", "✓".green());
        println!("Directory: {}", outcome.directory.display());
        println!("Usage changes: {}", outcome.usage_changes);
    }

    Ok(())
}

fn run_latest(store: Option<PathBuf>, category: Option<String>, json: bool) -> Result<()> {
    let config = get_config();
    let store_root = store.unwrap_or_else(|| config.store.root.clone());
    let subdir = category.unwrap_or_else(|| config.capture.subdir.clone());

    let store = SnapshotStore::new(store_root.join(&subdir));
    let snapshot = store
        .latest()
        .with_context(|| format!("No snapshots found under {}", store.root().display()))?;

    if json {
        let output = serde_json::json!({
            "directory": snapshot.path,
            "timestamp": snapshot.timestamp.map(|t| t.to_rfc3339()),
            "summary": snapshot.summary,
            "files": snapshot.files.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Latest snapshot: {}", snapshot.directory_name().cyan());
        if let Some(timestamp) = snapshot.timestamp {
            println!("Captured: {}", timestamp.to_rfc3339());
        }
        println!(
            "Files: {} (files_used: {}, views: {})",
            snapshot.files.len(),
            display_counter(snapshot.summary.files_used),
            display_counter(snapshot.summary.views),
        );
    }

    Ok(())
}

fn run_compare(current: &Path, previous: &Path) -> Result<()> {
    let store = SnapshotStore::new(current.parent().unwrap_or_else(|| Path::new(".")));

    let current_snapshot = store
        .load_snapshot(current)
        .with_context(|| format!("Not a readable snapshot directory: {}", current.display()))?;
    let previous_snapshot = store
        .load_snapshot(previous)
        .with_context(|| format!("Not a readable snapshot directory: {}", previous.display()))?;

    let diff = DiffEngine::compare(
        &current_snapshot.summary,
        &current_snapshot.files,
        Some(&previous_snapshot),
    );
    let heading = format!(
        "Changes compared to report ({}):",
        previous_snapshot.directory_name()
    );
    print!(
        "{}",
        render_comparison(
            &heading,
            &current_snapshot.summary,
            &current_snapshot.files,
            &diff
        )
    );

    Ok(())
}

fn read_document(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read report document from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read report document {}", input.display()))
    }
}

fn display_counter(value: Option<i64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
