//! Snapshot Store
//!
//! Owns one category's snapshot directory tree. The read side is a set of
//! pure queries over whatever directories exist: loading a single snapshot,
//! resolving the latest one, and resolving the earliest one of a reporting
//! month. The write side creates new snapshot directories with
//! not-already-exists semantics, which keeps the tree append-only: existing
//! snapshots are never rewritten, so repeated runs cannot corrupt history.
//!
//! Read failures are contained. A directory with corrupt or missing metadata
//! falls back to re-extracting the persisted raw document, and a directory
//! that yields nothing usable is skipped without aborting enumeration of the
//! others. Only the write side fails loudly, since silently dropping a
//! capture would leave a gap in history.

use crate::extract::ReportExtractor;
use crate::models::{Snapshot, SnapshotMetadata};
use crate::period::ReportingPeriod;
use crate::timestamp::parse_timestamp;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const METADATA_PATTERN: &str = "metadata_*.json";
const DOCUMENT_PATTERN: &str = "report_*.html";

/// A capture ready to be written out.
pub struct NewSnapshot<'a> {
    pub period: ReportingPeriod,
    pub run_timestamp: DateTime<Utc>,
    pub label: &'a str,
    pub document: &'a str,
    pub metadata: &'a SnapshotMetadata,
}

pub struct SnapshotStore {
    root: PathBuf,
    extractor: ReportExtractor,
}

impl SnapshotStore {
    /// Open the store rooted at one category's snapshot directory. The
    /// directory does not need to exist yet; queries over a missing root
    /// simply return nothing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extractor: ReportExtractor::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory name a capture with these parameters persists under.
    pub fn directory_name(
        period: &ReportingPeriod,
        run_timestamp: &DateTime<Utc>,
        label: &str,
    ) -> String {
        format!(
            "{}-{:02}_{}_{}",
            period.year,
            period.month,
            run_timestamp.format("%Y%m%d_%H%M%S"),
            label
        )
    }

    /// Reconstruct a snapshot from one directory.
    ///
    /// The persisted structured record is preferred; when its summary or
    /// files are missing they are re-extracted from the persisted raw
    /// document. The timestamp falls back from recorded metadata to the
    /// document file's mtime to the directory's mtime. Returns `None` for
    /// anything that is not a readable snapshot directory.
    pub fn load_snapshot(&self, dir: &Path) -> Option<Snapshot> {
        if !dir.is_dir() {
            return None;
        }

        let metadata_path = first_match(dir, METADATA_PATTERN);
        let metadata: SnapshotMetadata = metadata_path
            .as_deref()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|content| {
                serde_json::from_str::<SnapshotMetadata>(&content)
                    .map_err(|error| {
                        warn!(
                            directory = %dir.display(),
                            %error,
                            "Unreadable snapshot metadata, falling back to raw document"
                        );
                    })
                    .ok()
            })
            .unwrap_or_default();

        let document_path = first_match(dir, DOCUMENT_PATTERN);
        let document = document_path
            .as_deref()
            .and_then(|path| fs::read_to_string(path).ok());

        let summary = match metadata.summary.clone() {
            Some(summary) => summary,
            None => document
                .as_deref()
                .map(|doc| self.extractor.extract_summary(doc))
                .unwrap_or_default(),
        };
        let files = match metadata.files.clone() {
            Some(files) => files,
            None => document
                .as_deref()
                .map(|doc| self.extractor.extract_files(doc))
                .unwrap_or_default(),
        };

        let timestamp = metadata
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| document_path.as_deref().and_then(modified_time))
            .or_else(|| modified_time(dir));

        Some(Snapshot {
            path: dir.to_path_buf(),
            metadata,
            summary,
            files,
            timestamp,
        })
    }

    /// The snapshot with the maximum timestamp, ties broken arbitrarily.
    pub fn latest(&self) -> Option<Snapshot> {
        self.snapshots().into_iter().max_by_key(|s| s.timestamp)
    }

    /// The earliest snapshot whose metadata records the given reporting
    /// period. Snapshots without a parseable period are not candidates.
    pub fn earliest_in_month(&self, period: ReportingPeriod) -> Option<Snapshot> {
        self.snapshots()
            .into_iter()
            .filter(|s| {
                s.metadata.year == Some(i64::from(period.year))
                    && s.metadata.month == Some(i64::from(period.month))
            })
            .min_by_key(|s| s.timestamp)
    }

    /// Every loadable snapshot under the root that has an established
    /// timestamp. Unreadable directories are skipped, never fatal.
    fn snapshots(&self) -> Vec<Snapshot> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let snapshot = self.load_snapshot(&path)?;
                if snapshot.timestamp.is_none() {
                    debug!(directory = %path.display(), "Snapshot without timestamp excluded");
                    return None;
                }
                Some(snapshot)
            })
            .collect()
    }

    /// Write a new snapshot directory: the raw document verbatim, a
    /// convenience copy, and the structured metadata record. An already
    /// existing directory is a fatal error surfaced to the caller.
    pub fn persist(&self, snapshot: &NewSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create store root {}", self.root.display()))?;

        let dir_name =
            Self::directory_name(&snapshot.period, &snapshot.run_timestamp, snapshot.label);
        let dir = self.root.join(&dir_name);
        fs::create_dir(&dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;

        let stamp = snapshot.run_timestamp.format("%Y%m%d_%H%M%S");

        let document_path = dir.join(format!("report_{}.html", stamp));
        fs::write(&document_path, snapshot.document).with_context(|| {
            format!("Failed to write report document {}", document_path.display())
        })?;
        fs::write(dir.join("latest.html"), snapshot.document)
            .context("Failed to write latest.html")?;

        let metadata_path = dir.join(format!("metadata_{}.json", stamp));
        let metadata_json = serde_json::to_string_pretty(snapshot.metadata)
            .context("Failed to serialize snapshot metadata")?;
        fs::write(&metadata_path, metadata_json).with_context(|| {
            format!("Failed to write snapshot metadata {}", metadata_path.display())
        })?;

        Ok(dir)
    }
}

/// Lexicographically first file in `dir` matching `pattern`.
///
/// The directory portion is escaped: snapshot directory names carry the
/// bracketed change label, which would otherwise read as a glob character
/// class.
fn first_match(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(pattern);
    glob(&pattern.to_string_lossy()).ok()?.flatten().min()
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}
