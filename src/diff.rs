//! Snapshot Differencing
//!
//! Computes what changed between a freshly extracted report and a reference
//! snapshot: signed deltas on the summary counters, set-deltas on media files
//! keyed by url, and set-deltas on individual page usages keyed by the full
//! [`UsageKey`] tuple.
//!
//! Files whose identity persists but whose views or usages moved are not
//! reported at the file-set level; only presence or absence of the identity
//! key matters there. A url change is an independent add plus remove, never
//! inferred as a rename. With no reference snapshot at all, the summary
//! deltas are unknown and the added sets cover the whole current report.

use crate::models::{
    MediaFile, Snapshot, SummaryDeltas, SummaryStats, UsageChangeCounts, UsageKey,
};
use std::collections::{BTreeMap, HashMap};

/// One page usage that appeared or disappeared, carried with the media title
/// for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageChange {
    pub wiki: String,
    pub page_title: String,
    pub page_url: Option<String>,
    pub media_url: String,
    pub media_title: String,
}

impl UsageChange {
    fn sort_key(&self) -> (&str, &str, &str) {
        (&self.wiki, &self.page_title, &self.media_title)
    }
}

/// The complete difference between two snapshots.
///
/// Added and removed media files are sorted by url; added and removed usages
/// by `(wiki, page_title, media_title)`, so rendering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    pub summary: SummaryDeltas,
    pub files_added: Vec<MediaFile>,
    pub files_removed: Vec<MediaFile>,
    pub usages_added: Vec<UsageChange>,
    pub usages_removed: Vec<UsageChange>,
}

impl SnapshotDiff {
    /// The compact change magnitude: how many usages appeared or disappeared.
    pub fn total_usage_changes(&self) -> usize {
        self.usages_added.len() + self.usages_removed.len()
    }

    pub fn usage_counts(&self) -> UsageChangeCounts {
        UsageChangeCounts {
            added: self.usages_added.len(),
            removed: self.usages_removed.len(),
            total: self.total_usage_changes(),
        }
    }

    /// True when every computed delta is zero or absent and no file or usage
    /// appeared or disappeared.
    pub fn is_unchanged(&self) -> bool {
        [
            self.summary.files_used,
            self.summary.pages_used,
            self.summary.views,
        ]
        .iter()
        .all(|delta| delta.unwrap_or(0) == 0)
            && self.files_added.is_empty()
            && self.files_removed.is_empty()
            && self.usages_added.is_empty()
            && self.usages_removed.is_empty()
    }
}

pub struct DiffEngine;

impl DiffEngine {
    /// Compare the current extraction against zero or one reference snapshot.
    pub fn compare(
        current_summary: &SummaryStats,
        current_files: &[MediaFile],
        previous: Option<&Snapshot>,
    ) -> SnapshotDiff {
        let empty_summary = SummaryStats::default();
        let (previous_summary, previous_files): (&SummaryStats, &[MediaFile]) = match previous {
            Some(snapshot) => (&snapshot.summary, &snapshot.files),
            None => (&empty_summary, &[]),
        };

        let summary = SummaryDeltas {
            files_used: delta(current_summary.files_used, previous_summary.files_used),
            pages_used: delta(current_summary.pages_used, previous_summary.pages_used),
            views: delta(current_summary.views, previous_summary.views),
        };

        let current_index = file_index(current_files);
        let previous_index = file_index(previous_files);

        let files_added = missing_from(&current_index, &previous_index);
        let files_removed = missing_from(&previous_index, &current_index);

        let current_usages = usage_index(current_files);
        let previous_usages = usage_index(previous_files);

        let usages_added = usage_difference(&current_usages, &previous_usages);
        let usages_removed = usage_difference(&previous_usages, &current_usages);

        SnapshotDiff {
            summary,
            files_added,
            files_removed,
            usages_added,
            usages_removed,
        }
    }
}

fn delta(current: Option<i64>, previous: Option<i64>) -> Option<i64> {
    match (current, previous) {
        (Some(current), Some(previous)) => Some(current - previous),
        _ => None,
    }
}

/// Index files by their identity key. Entries without a url carry no
/// identity and are ignored; a duplicated url keeps the later entry.
fn file_index(files: &[MediaFile]) -> BTreeMap<&str, &MediaFile> {
    files
        .iter()
        .filter(|file| !file.url.is_empty())
        .map(|file| (file.url.as_str(), file))
        .collect()
}

/// Files present in `index` but absent from `other`, in url order.
fn missing_from(index: &BTreeMap<&str, &MediaFile>, other: &BTreeMap<&str, &MediaFile>) -> Vec<MediaFile> {
    index
        .iter()
        .filter(|(url, _)| !other.contains_key(*url))
        .map(|(_, file)| (*file).clone())
        .collect()
}

/// Usage keys of every file, flattened across the snapshot.
fn usage_index(files: &[MediaFile]) -> HashMap<UsageKey, UsageChange> {
    let mut index = HashMap::new();
    for file in files.iter().filter(|file| !file.url.is_empty()) {
        for usage in &file.usages {
            let key = UsageKey::new(file, usage);
            index.entry(key).or_insert_with(|| UsageChange {
                wiki: usage.wiki.clone(),
                page_title: usage.title.clone(),
                page_url: usage.url.clone(),
                media_url: file.url.clone(),
                media_title: file.title.clone(),
            });
        }
    }
    index
}

fn usage_difference(
    index: &HashMap<UsageKey, UsageChange>,
    other: &HashMap<UsageKey, UsageChange>,
) -> Vec<UsageChange> {
    let mut changes: Vec<UsageChange> = index
        .iter()
        .filter(|(key, _)| !other.contains_key(*key))
        .map(|(_, change)| change.clone())
        .collect();
    changes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    changes
}
