use glam_usage::period::ReportingPeriod;
use glam_usage::store::{NewSnapshot, SnapshotStore};
use tempfile::TempDir;

mod common;

fn metadata_json(year: &str, month: &str, timestamp: &str) -> String {
    format!(
        r#"{{
            "category": "Test category",
            "depth": 12,
            "year": {year},
            "month": {month},
            "timestamp": "{timestamp}",
            "summary": {{"files_viewed": 1, "files_used": 2, "pages_used": 3, "wikis": 1, "views": 4}},
            "files": []
        }}"#
    )
}

#[test]
fn test_latest_picks_maximum_timestamp() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    // Written in an order that differs from both name order and time order.
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240302_000000_[0]",
        &metadata_json("2024", "3", "2024-03-02T00:00:00+00:00"),
    )?;
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240310_000000_[0]",
        &metadata_json("2024", "3", "2024-03-10T00:00:00+00:00"),
    )?;
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240305_000000_[0]",
        &metadata_json("2024", "3", "2024-03-05T00:00:00+00:00"),
    )?;

    let latest = store.latest().expect("latest snapshot");
    assert_eq!(latest.directory_name(), "2024-03_20240310_000000_[0]");
    Ok(())
}

#[test]
fn test_earliest_in_month_filters_period() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    // An earlier capture of a different month must not be a candidate.
    common::write_snapshot_dir(
        temp.path(),
        "2024-02_20240201_000000_[0]",
        &metadata_json("2024", "2", "2024-02-01T00:00:00+00:00"),
    )?;
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240305_000000_[0]",
        &metadata_json("2024", "3", "2024-03-05T00:00:00+00:00"),
    )?;
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240312_000000_[0]",
        &metadata_json("2024", "3", "2024-03-12T00:00:00+00:00"),
    )?;

    let earliest = store
        .earliest_in_month(ReportingPeriod::new(2024, 3))
        .expect("earliest snapshot");
    assert_eq!(earliest.directory_name(), "2024-03_20240305_000000_[0]");
    Ok(())
}

#[test]
fn test_earliest_in_month_accepts_string_period() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240305_000000_[0]",
        &metadata_json("\"2024\"", "\"03\"", "2024-03-05T00:00:00+00:00"),
    )?;

    assert!(store.earliest_in_month(ReportingPeriod::new(2024, 3)).is_some());
    Ok(())
}

#[test]
fn test_corrupt_metadata_does_not_abort_enumeration() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    common::write_snapshot_dir(temp.path(), "2024-03_broken", "{ not json")?;
    common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240305_000000_[0]",
        &metadata_json("2024", "3", "2024-03-05T00:00:00+00:00"),
    )?;

    // The broken directory has no parseable period, so the query still
    // resolves using the readable one.
    let earliest = store
        .earliest_in_month(ReportingPeriod::new(2024, 3))
        .expect("earliest snapshot");
    assert_eq!(earliest.directory_name(), "2024-03_20240305_000000_[0]");
    Ok(())
}

#[test]
fn test_load_falls_back_to_raw_document() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    let dir = common::write_snapshot_dir(
        temp.path(),
        "2024-03_20240305_000000_[0]",
        r#"{"year": 2024, "month": 3, "timestamp": "2024-03-05T00:00:00+00:00"}"#,
    )?;
    std::fs::write(
        dir.join("report_20240305_000000.html"),
        common::sample_document(),
    )?;

    let snapshot = store.load_snapshot(&dir).expect("loadable snapshot");
    assert_eq!(snapshot.summary.files_used, Some(78));
    assert_eq!(snapshot.files.len(), 2);
    Ok(())
}

#[test]
fn test_missing_root_yields_no_snapshots() {
    let store = SnapshotStore::new("/nonexistent/store/path");
    assert!(store.latest().is_none());
    assert!(store
        .earliest_in_month(ReportingPeriod::new(2024, 3))
        .is_none());
}

#[test]
fn test_persist_refuses_to_overwrite() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    let period = ReportingPeriod::new(2024, 3);
    let run_timestamp = chrono::Utc::now();
    let metadata = Default::default();
    let snapshot = NewSnapshot {
        period,
        run_timestamp,
        label: "[0]",
        document: "<html></html>",
        metadata: &metadata,
    };

    store.persist(&snapshot)?;
    assert!(store.persist(&snapshot).is_err());
    Ok(())
}

#[test]
fn test_persist_writes_expected_layout() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = SnapshotStore::new(temp.path());

    let metadata = Default::default();
    let dir = store.persist(&NewSnapshot {
        period: ReportingPeriod::new(2024, 3),
        run_timestamp: chrono::Utc::now(),
        label: "[+2]",
        document: "<html>report</html>",
        metadata: &metadata,
    })?;

    let name = dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("2024-03_"));
    assert!(name.ends_with("_[+2]"));
    assert!(dir.join("latest.html").exists());

    let entries: Vec<String> = std::fs::read_dir(&dir)?
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(entries.iter().any(|n| n.starts_with("report_") && n.ends_with(".html")));
    assert!(entries.iter().any(|n| n.starts_with("metadata_") && n.ends_with(".json")));
    Ok(())
}
