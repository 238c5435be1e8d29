//! Core Data Models
//!
//! This module defines the primary data structures used throughout the media
//! usage tracking system, covering the full pipeline from an extracted report
//! to the persisted snapshot record.
//!
//! ## Data Flow
//!
//! 1. **Extraction**: [`SummaryStats`] and [`MediaFile`] (with nested
//!    [`PageUsage`] rows) come out of the report extractor
//! 2. **Persistence**: [`SnapshotMetadata`] is the structured record written
//!    next to the raw document inside each snapshot directory
//! 3. **Queries**: [`Snapshot`] is the loaded form the store hands to the
//!    diff engine and renderer
//!
//! All persisted types support serialization/deserialization, and every
//! counter is optional: a value the source document did not yield is absent,
//! not zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// The five aggregate counters of one report.
///
/// Each field is `None` when the corresponding pattern did not match the
/// source document. Extraction is best-effort; absence is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub files_viewed: Option<i64>,
    pub files_used: Option<i64>,
    pub pages_used: Option<i64>,
    pub wikis: Option<i64>,
    pub views: Option<i64>,
}

/// One media file appearing in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub title: String,
    /// Canonical file link. This is the file's identity key across snapshots.
    pub url: String,
    pub views: Option<i64>,
    #[serde(default)]
    pub usages: Vec<PageUsage>,
}

/// One specific page on one specific wiki using the parent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUsage {
    pub wiki: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub views: Option<i64>,
}

/// Identity key for a usage, used for diffing.
///
/// Two usages are the same usage if and only if this tuple matches exactly.
/// This is stricter than matching on the media file alone, since the same
/// file can be used by many distinct pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageKey {
    pub wiki: String,
    pub page_title: String,
    pub page_url: Option<String>,
    pub media_url: String,
}

impl UsageKey {
    pub fn new(file: &MediaFile, usage: &PageUsage) -> Self {
        Self {
            wiki: usage.wiki.clone(),
            page_title: usage.title.clone(),
            page_url: usage.url.clone(),
            media_url: file.url.clone(),
        }
    }
}

/// Signed differences of the summary counters between two snapshots.
///
/// A delta is present only when both sides carried the counter; a missing
/// baseline is never treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDeltas {
    pub files_used: Option<i64>,
    pub pages_used: Option<i64>,
    pub views: Option<i64>,
}

/// Usage-level change counts recorded in snapshot metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
}

/// The structured record persisted as `metadata_<ts>.json` inside a snapshot
/// directory.
///
/// Deserialization is tolerant: every field defaults when missing, and the
/// period fields accept both numbers and numeric strings, so records written
/// by earlier tool versions still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotMetadata {
    pub category: String,
    #[serde(deserialize_with = "int_or_string")]
    pub depth: Option<i64>,
    #[serde(deserialize_with = "int_or_string")]
    pub year: Option<i64>,
    #[serde(deserialize_with = "int_or_string")]
    pub month: Option<i64>,
    pub timestamp: Option<String>,
    pub summary: Option<SummaryStats>,
    pub files: Option<Vec<MediaFile>>,
    pub report_directory: Option<String>,
    pub previous_report_directory: Option<String>,
    pub diff_label: Option<String>,
    pub summary_differences: Option<SummaryDeltas>,
    pub usage_changes: Option<UsageChangeCounts>,
}

/// One loaded snapshot: an immutable, timestamped capture of a report.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The snapshot directory, used for display and previous-link references.
    pub path: PathBuf,
    pub metadata: SnapshotMetadata,
    pub summary: SummaryStats,
    pub files: Vec<MediaFile>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The directory name, as referenced from other snapshots' metadata.
    pub fn directory_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn int_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => crate::normalize::parse_count(s),
        _ => None,
    }))
}
