//! Capture Orchestration
//!
//! This module provides the main engine that turns one rendered report
//! document into one persisted snapshot. It coordinates the full pipeline:
//!
//! 1. **Extraction**: summary counters and file/usage entries are pulled out
//!    of the document
//! 2. **Baseline lookup**: the store is queried for the most recent prior
//!    snapshot of the same category
//! 3. **Differencing**: current vs. previous, plus the compact change label
//! 4. **Persistence**: the new snapshot directory is created and fully
//!    written (raw document, metadata, comparison reports)
//! 5. **Monthly comparison**: on the first calendar day of a month the
//!    earliest snapshot of the reference month becomes a second baseline
//!
//! Everything before persistence degrades gracefully; only the persistence
//! step itself can fail, and then loudly.

use crate::config::get_config;
use crate::diff::DiffEngine;
use crate::extract::ReportExtractor;
use crate::models::SnapshotMetadata;
use crate::period::{is_first_day_of_month, ReportingPeriod};
use crate::report::{change_label, render_comparison};
use crate::store::{NewSnapshot, SnapshotStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};
use uuid::Uuid;

/// Everything one capture run needs to know besides the document itself.
#[derive(Debug, Clone)]
pub struct CaptureParams {
    /// Category display name recorded in metadata.
    pub category: String,
    /// Category subdirectory under the store root.
    pub subdir: String,
    /// Category tree depth the report was generated with.
    pub depth: u32,
    /// The reporting period the document covers.
    pub period: ReportingPeriod,
    /// Write the month-over-month summary even when it is not the first
    /// calendar day of a month.
    pub force_monthly: bool,
}

impl CaptureParams {
    /// Parameters from configuration defaults, targeting the month before
    /// `now` the way scheduled runs do.
    pub fn from_config() -> Self {
        let config = get_config();
        Self {
            category: config.capture.category.clone(),
            subdir: config.capture.subdir.clone(),
            depth: config.capture.depth,
            period: ReportingPeriod::target_for(Utc::now()),
            force_monthly: false,
        }
    }
}

/// What a capture run hands back to the caller.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// The newly written snapshot directory.
    pub directory: PathBuf,
    /// Total usage-level changes against the previous snapshot.
    pub usage_changes: usize,
}

pub struct UsageTracker {
    extractor: ReportExtractor,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            extractor: ReportExtractor::new(),
        }
    }

    /// Ingest one rendered report document and persist it as a snapshot.
    pub fn record_capture(
        &self,
        document: &str,
        store_root: &Path,
        params: &CaptureParams,
    ) -> Result<CaptureOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("capture", run_id = %run_id, category = %params.subdir);
        let _guard = span.enter();

        let now = Utc::now();
        let (summary, files) = self.extractor.extract(document);
        info!(
            files = files.len(),
            files_used = ?summary.files_used,
            views = ?summary.views,
            "Extracted report document"
        );

        let store = SnapshotStore::new(store_root.join(&params.subdir));
        let previous = store.latest();
        let diff = DiffEngine::compare(&summary, &files, previous.as_ref());
        let label = change_label(diff.total_usage_changes());

        let dir_name = SnapshotStore::directory_name(&params.period, &now, &label);
        let metadata = SnapshotMetadata {
            category: params.category.clone(),
            depth: Some(i64::from(params.depth)),
            year: Some(i64::from(params.period.year)),
            month: Some(i64::from(params.period.month)),
            timestamp: Some(now.to_rfc3339()),
            summary: Some(summary.clone()),
            files: Some(files.clone()),
            report_directory: Some(dir_name),
            previous_report_directory: previous.as_ref().map(|p| p.directory_name()),
            diff_label: Some(label.clone()),
            summary_differences: Some(diff.summary.clone()),
            usage_changes: Some(diff.usage_counts()),
        };

        let directory = store.persist(&NewSnapshot {
            period: params.period,
            run_timestamp: now,
            label: &label,
            document,
            metadata: &metadata,
        })?;
        info!(directory = %directory.display(), label = %label, "Persisted snapshot");

        let heading = match &previous {
            Some(previous) => format!(
                "Changes compared to previous report ({}):",
                previous.directory_name()
            ),
            None => "Changes since baseline (no previous report found):".to_string(),
        };
        let rendered = render_comparison(&heading, &summary, &files, &diff);
        fs::write(directory.join("changes_summary.txt"), rendered)
            .context("Failed to write changes_summary.txt")?;

        if params.force_monthly || is_first_day_of_month(now) {
            let reference = params.period.previous();
            match store.earliest_in_month(reference) {
                Some(reference_snapshot) => {
                    let monthly = DiffEngine::compare(&summary, &files, Some(&reference_snapshot));
                    let heading = format!(
                        "Month-over-month changes compared to earliest report from {} ({}):",
                        reference,
                        reference_snapshot.directory_name()
                    );
                    let rendered = render_comparison(&heading, &summary, &files, &monthly);
                    fs::write(directory.join("previous_month_summary.txt"), rendered)
                        .context("Failed to write previous_month_summary.txt")?;
                }
                None => {
                    info!(month = %reference, "No stored report for the reference month, skipping monthly summary");
                }
            }
        }

        Ok(CaptureOutcome {
            directory,
            usage_changes: diff.total_usage_changes(),
        })
    }
}
