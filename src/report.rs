//! Comparison Report Rendering
//!
//! Turns a [`SnapshotDiff`] into the deterministic multi-line text written
//! into a snapshot directory, and produces the compact change label embedded
//! in the directory name. The orchestration layer around this tool picks the
//! label up for its own run summaries, so its format is stable.

use crate::diff::SnapshotDiff;
use crate::models::{MediaFile, SummaryStats};

/// Compact encoding of change magnitude, derived from the number of usage
/// additions and removals.
pub fn change_label(total_usage_changes: usize) -> String {
    if total_usage_changes > 0 {
        format!("[+{}]", total_usage_changes)
    } else {
        "[0]".to_string()
    }
}

/// Render the full comparison report.
///
/// The line sequence is fixed: the heading, one line per summary counter,
/// then a bulleted breakdown for each non-empty set delta. When nothing
/// changed at all an explicit line says so; an absent diff must never look
/// like a diff that was not run.
pub fn render_comparison(
    heading: &str,
    current_summary: &SummaryStats,
    current_files: &[MediaFile],
    diff: &SnapshotDiff,
) -> String {
    let files_total = current_summary
        .files_used
        .unwrap_or(current_files.len() as i64);

    let mut lines = vec![
        heading.to_string(),
        format!(
            "- Media files used: {} (current total: {})",
            format_delta(diff.summary.files_used),
            files_total
        ),
        format!(
            "- Pages using media: {} (current total: {})",
            format_delta(diff.summary.pages_used),
            format_total(current_summary.pages_used)
        ),
        format!(
            "- File views: {} (current total: {})",
            format_delta(diff.summary.views),
            format_total(current_summary.views)
        ),
    ];

    if diff.is_unchanged() {
        lines.push("No changes detected.".to_string());
    } else {
        push_file_section(&mut lines, "Added media files:", &diff.files_added);
        push_file_section(&mut lines, "Removed media files:", &diff.files_removed);
        push_usage_section(&mut lines, "Added page usages:", &diff.usages_added);
        push_usage_section(&mut lines, "Removed page usages:", &diff.usages_removed);
    }

    lines.join("\n") + "\n"
}

fn push_file_section(lines: &mut Vec<String>, title: &str, files: &[MediaFile]) {
    if files.is_empty() {
        return;
    }
    lines.push(format!("  {}", title));
    for file in files {
        let title = if file.title.is_empty() {
            &file.url
        } else {
            &file.title
        };
        lines.push(format!("    - {} ({})", title, file.url));
    }
}

fn push_usage_section(lines: &mut Vec<String>, title: &str, usages: &[crate::diff::UsageChange]) {
    if usages.is_empty() {
        return;
    }
    lines.push(format!("  {}", title));
    for usage in usages {
        lines.push(format!(
            "    - {}: {} ({})",
            usage.wiki, usage.page_title, usage.media_title
        ));
    }
}

fn format_delta(delta: Option<i64>) -> String {
    match delta {
        Some(value) if value > 0 => format!("+{}", value),
        Some(value) => value.to_string(),
        None => "unknown".to_string(),
    }
}

fn format_total(value: Option<i64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "unknown".to_string(),
    }
}
