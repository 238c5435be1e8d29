//! Report Document Extraction
//!
//! Turns one rendered report document into structured data: the aggregate
//! [`SummaryStats`] and the list of [`MediaFile`] entries with their nested
//! per-page [`PageUsage`] rows.
//!
//! Extraction is deliberately permissive. The document is whatever markup the
//! upstream statistics tool finished rendering; it is scanned with a handful
//! of patterns rather than parsed as a full document tree, and any field that
//! does not match becomes absent instead of failing the capture. Malformed or
//! empty input degrades to empty results, never to an error.

use crate::models::{MediaFile, PageUsage, SummaryStats};
use crate::normalize::parse_count;
use regex::Regex;
use std::sync::LazyLock;

/// Canonical shape of a media file link. A table row containing one of these
/// is a file header row; every other link is a page link.
const FILE_LINK_MARKER: &str = "commons.wikimedia.org/wiki/File";

static FILES_VIEWED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d,]+)\s+files were viewed,\s*out of\s*([\d,]+)\s+used").unwrap()
});
static PAGES_WIKIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d,]+)\s+pages on\s+([\d,]+)\s+wikis").unwrap());
static FILE_VIEWS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d,]+)\s+file views").unwrap());
static RESULTS_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table[^>]*table-striped[^>]*>(.*?)</table>").unwrap());
static ROW_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tr(?:\s[^>]*)?>").unwrap());
static CELL_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<t[dh](?:\s[^>]*)?>").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

pub struct ReportExtractor;

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract everything this module knows how to read from a document.
    pub fn extract(&self, document: &str) -> (SummaryStats, Vec<MediaFile>) {
        (self.extract_summary(document), self.extract_files(document))
    }

    /// Extract the aggregate counters.
    ///
    /// Each pattern captures at most once, first match wins; repeated matches
    /// later in the document are ignored. All five fields are always present
    /// in the result, possibly as `None`.
    pub fn extract_summary(&self, document: &str) -> SummaryStats {
        let text = visible_text(document);
        let mut stats = SummaryStats::default();

        if let Some(captures) = FILES_VIEWED_RE.captures(&text) {
            stats.files_viewed = parse_count(&captures[1]);
            stats.files_used = parse_count(&captures[2]);
        }
        if let Some(captures) = PAGES_WIKIS_RE.captures(&text) {
            stats.pages_used = parse_count(&captures[1]);
            stats.wikis = parse_count(&captures[2]);
        }
        if let Some(captures) = FILE_VIEWS_RE.captures(&text) {
            stats.views = parse_count(&captures[1]);
        }

        stats
    }

    /// Extract the file/usage table.
    ///
    /// Rows are consumed in document order as a single left-to-right pass.
    /// A row carrying a canonical file link opens a new file entry; every
    /// following row without one is a usage row grouped under the most
    /// recently opened file. Rows before the first file header, and usage
    /// rows with neither a wiki nor a page title, are skipped.
    pub fn extract_files(&self, document: &str) -> Vec<MediaFile> {
        let Some(table) = RESULTS_TABLE_RE
            .captures(document)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        else {
            return Vec::new();
        };

        let mut files: Vec<MediaFile> = Vec::new();

        for row in ROW_OPEN_RE.split(table).skip(1) {
            let cells = cell_texts(row);

            if let Some((url, title)) = file_link(row) {
                let views = cells.get(2).and_then(|text| parse_count(text));
                files.push(MediaFile {
                    title,
                    url,
                    views,
                    usages: Vec::new(),
                });
                continue;
            }

            let Some(current) = files.last_mut() else {
                continue;
            };

            let wiki = cells.first().cloned().unwrap_or_default();
            let (title, url) = match page_link(row) {
                Some((url, title)) => (title, Some(url)),
                None => (cells.get(1).cloned().unwrap_or_default(), None),
            };
            if wiki.is_empty() && title.is_empty() {
                continue;
            }

            let views = cells.get(2).and_then(|text| parse_count(text));
            current.usages.push(PageUsage {
                wiki,
                title,
                url,
                views,
            });
        }

        files
    }
}

/// The first canonical file link in a row, as `(url, title)`.
fn file_link(row: &str) -> Option<(String, String)> {
    LINK_RE
        .captures_iter(row)
        .find(|captures| captures[1].contains(FILE_LINK_MARKER))
        .map(|captures| (captures[1].to_string(), visible_text(&captures[2])))
}

/// The first non-file link in a row, as `(url, title)`.
fn page_link(row: &str) -> Option<(String, String)> {
    LINK_RE
        .captures_iter(row)
        .find(|captures| !captures[1].contains(FILE_LINK_MARKER))
        .map(|captures| (captures[1].to_string(), visible_text(&captures[2])))
}

/// Trimmed visible text of each cell in a row, in order.
fn cell_texts(row: &str) -> Vec<String> {
    CELL_OPEN_RE
        .split(row)
        .skip(1)
        .map(visible_text)
        .collect()
}

/// Markup reduced to its visible text: tags dropped, common entities
/// decoded, whitespace collapsed.
fn visible_text(markup: &str) -> String {
    let stripped = TAG_RE.replace_all(markup, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
