use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

#[test]
fn test_record_and_latest_roundtrip() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("report.html");
    std::fs::write(&input, common::sample_document())?;
    let store = temp.path().join("reports");

    Command::cargo_bin("glam-usage")?
        .args(["record", "--json"])
        .arg("--input")
        .arg(&input)
        .arg("--store")
        .arg(&store)
        .args(["--category", "test-category"])
        .args(["--category-name", "Test category"])
        .args(["--year", "2024", "--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"usageChanges\": 3"));

    Command::cargo_bin("glam-usage")?
        .arg("latest")
        .arg("--store")
        .arg(&store)
        .args(["--category", "test-category"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest snapshot: 2024-03_"));

    Ok(())
}

#[test]
fn test_record_missing_input_fails() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    Command::cargo_bin("glam-usage")?
        .args(["record", "--input"])
        .arg(temp.path().join("missing.html"))
        .arg("--store")
        .arg(temp.path().join("reports"))
        .args(["--category", "test-category"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read report document"));

    Ok(())
}

#[test]
fn test_latest_without_snapshots_fails() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    Command::cargo_bin("glam-usage")?
        .arg("latest")
        .arg("--store")
        .arg(temp.path().join("empty"))
        .args(["--category", "test-category"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No snapshots found"));

    Ok(())
}

#[test]
fn test_record_rejects_year_without_month() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("report.html");
    std::fs::write(&input, common::sample_document())?;

    Command::cargo_bin("glam-usage")?
        .args(["record", "--input"])
        .arg(&input)
        .args(["--year", "2024"])
        .assert()
        .failure();

    Ok(())
}

#[test]
fn test_compare_renders_report() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = temp.path().join("reports");

    let first_input = temp.path().join("first.html");
    std::fs::write(&first_input, common::sample_document())?;
    let second_input = temp.path().join("second.html");
    std::fs::write(&second_input, common::changed_document())?;

    let record = |input: &std::path::Path| -> anyhow::Result<()> {
        Command::cargo_bin("glam-usage")?
            .args(["record", "--input"])
            .arg(input)
            .arg("--store")
            .arg(&store)
            .args(["--category", "test-category"])
            .args(["--year", "2024", "--month", "3"])
            .assert()
            .success();
        Ok(())
    };

    record(&first_input)?;
    std::thread::sleep(std::time::Duration::from_millis(1100));
    record(&second_input)?;

    let mut dirs: Vec<_> = std::fs::read_dir(store.join("test-category"))?
        .flatten()
        .map(|e| e.path())
        .collect();
    dirs.sort();
    assert_eq!(dirs.len(), 2);

    Command::cargo_bin("glam-usage")?
        .arg("compare")
        .arg(&dirs[1])
        .arg(&dirs[0])
        .assert()
        .success()
        .stdout(predicate::str::contains("- File views: +233 (current total: 4800)"))
        .stdout(predicate::str::contains("Added media files:"));

    Ok(())
}
