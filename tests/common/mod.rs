#![allow(dead_code)]

use anyhow::Result;
use glam_usage::models::{MediaFile, PageUsage, SummaryStats};
use std::fs;
use std::path::{Path, PathBuf};

/// A small but realistic rendered report document: summary sections plus a
/// results table with two files and three usage rows.
pub fn sample_document() -> String {
    concat!(
        "<html><body>",
        "<div id=\"status\">1,234 files in category tree</div>",
        "<div>56 files were viewed, out of 78 used</div>",
        "<div>90 pages on 12 wikis</div>",
        "<div>4,567 file views in 2024-03</div>",
        "<div id=\"output\">",
        "<table class='table table-striped'>",
        "<tr><th>Wiki</th><th>Page</th><th>Views</th></tr>",
        "<tr><td><a href=\"https://commons.wikimedia.org/wiki/File:Alpha.jpg\">File:Alpha.jpg</a></td><td></td><td>1,500</td></tr>",
        "<tr><td>en.wikipedia.org</td><td><a href=\"https://en.wikipedia.org/wiki/Alpha_page\">Alpha page</a></td><td>1,000</td></tr>",
        "<tr><td>de.wikipedia.org</td><td><a href=\"https://de.wikipedia.org/wiki/Alpha_Seite\">Alpha Seite</a></td><td>500</td></tr>",
        "<tr><td><a href=\"https://commons.wikimedia.org/wiki/File:Beta.png\">File:Beta.png</a></td><td></td><td>250</td></tr>",
        "<tr><td>en.wikipedia.org</td><td><a href=\"https://en.wikipedia.org/wiki/Beta_page\">Beta page</a></td><td>250</td></tr>",
        "</table>",
        "</div>",
        "</body></html>"
    )
    .to_string()
}

/// A variant of [`sample_document`] where one file and one usage are new and
/// the Beta file is gone.
pub fn changed_document() -> String {
    concat!(
        "<html><body>",
        "<div>57 files were viewed, out of 79 used</div>",
        "<div>92 pages on 12 wikis</div>",
        "<div>4,800 file views in 2024-04</div>",
        "<div id=\"output\">",
        "<table class='table table-striped'>",
        "<tr><th>Wiki</th><th>Page</th><th>Views</th></tr>",
        "<tr><td><a href=\"https://commons.wikimedia.org/wiki/File:Alpha.jpg\">File:Alpha.jpg</a></td><td></td><td>1,600</td></tr>",
        "<tr><td>en.wikipedia.org</td><td><a href=\"https://en.wikipedia.org/wiki/Alpha_page\">Alpha page</a></td><td>1,100</td></tr>",
        "<tr><td>de.wikipedia.org</td><td><a href=\"https://de.wikipedia.org/wiki/Alpha_Seite\">Alpha Seite</a></td><td>500</td></tr>",
        "<tr><td><a href=\"https://commons.wikimedia.org/wiki/File:Gamma.svg\">File:Gamma.svg</a></td><td></td><td>300</td></tr>",
        "<tr><td>fr.wikipedia.org</td><td><a href=\"https://fr.wikipedia.org/wiki/Gamma_page\">Gamma page</a></td><td>300</td></tr>",
        "</table>",
        "</div>",
        "</body></html>"
    )
    .to_string()
}

/// Write a bare snapshot directory containing only a metadata record.
pub fn write_snapshot_dir(
    root: &Path,
    name: &str,
    metadata_json: &str,
) -> Result<PathBuf> {
    let dir = root.join(name);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("metadata_20240301_000000.json"), metadata_json)?;
    Ok(dir)
}

pub fn media_file(url: &str, title: &str, usages: Vec<PageUsage>) -> MediaFile {
    MediaFile {
        title: title.to_string(),
        url: url.to_string(),
        views: None,
        usages,
    }
}

pub fn page_usage(wiki: &str, title: &str) -> PageUsage {
    PageUsage {
        wiki: wiki.to_string(),
        title: title.to_string(),
        url: None,
        views: None,
    }
}

pub fn summary(files_used: i64, pages_used: i64, views: i64) -> SummaryStats {
    SummaryStats {
        files_viewed: None,
        files_used: Some(files_used),
        pages_used: Some(pages_used),
        wikis: None,
        views: Some(views),
    }
}
