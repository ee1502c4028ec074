//! Integration tests for the bmitrack binary.
//!
//! These tests verify end-to-end behavior including:
//! - Compute-only and compute-and-save workflows
//! - History and statistics output
//! - CSV export
//! - Error reporting and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bmitrack"))
}

fn add(data_dir: &std::path::Path, user: &str, weight: &str, height: &str, at: &str) {
    cli()
        .arg("add")
        .arg(user)
        .arg("--weight")
        .arg(weight)
        .arg("--height")
        .arg(height)
        .arg("--at")
        .arg(at)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI calculator and history tracker"));
}

#[test]
fn test_calc_does_not_create_database() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli()
        .arg("calc")
        .arg("--weight")
        .arg("70")
        .arg("--height")
        .arg("1.75")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 22.86"))
        .stdout(predicate::str::contains("Category: Normal"));

    assert!(!data_dir.exists());
}

#[test]
fn test_calc_rejects_zero_height() {
    cli()
        .arg("calc")
        .arg("--weight")
        .arg("70")
        .arg("--height")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_add_creates_database() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("add")
        .arg("alice")
        .arg("--weight")
        .arg("70")
        .arg("--height")
        .arg("1.75")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved record for alice (BMI 22.86, Normal)"));

    assert!(data_dir.join("bmi_app.db").exists());
}

#[test]
fn test_add_negative_weight_saves_nothing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("add")
        .arg("alice")
        .arg("--weight")
        .arg("-70")
        .arg("--height")
        .arg("1.75")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight_kg must be positive"));

    cli()
        .arg("users")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No users yet"));
}

#[test]
fn test_alice_history_and_stats() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    add(&data_dir, "alice", "70", "1.75", "2024-01-01T08:00:00Z");
    add(&data_dir, "alice", "72", "1.75", "2024-01-08T08:00:00Z");

    cli()
        .arg("history")
        .arg("alice")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01 08:00:00"))
        .stdout(predicate::str::contains("22.86"))
        .stdout(predicate::str::contains("23.51"))
        .stdout(predicate::str::contains(
            "Mean BMI: 23.18  Min BMI: 22.86  Max BMI: 23.51",
        ));

    cli()
        .arg("stats")
        .arg("alice")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 2"));
}

#[test]
fn test_history_json_is_ordered() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    add(&data_dir, "bob", "90", "1.80", "2024-03-01T00:00:00Z");
    add(&data_dir, "bob", "85", "1.80", "2024-02-01T00:00:00Z");

    let output = cli()
        .arg("history")
        .arg("bob")
        .arg("--json")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let records: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["weight_kg"], 85.0);
    assert_eq!(records[1]["weight_kg"], 90.0);
    assert_eq!(records[1]["category"], "Overweight");
}

#[test]
fn test_history_without_records_shows_na() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("history")
        .arg("nobody")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean BMI: N/A"));
}

#[test]
fn test_stats_without_records_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("stats")
        .arg("nobody")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No records for user 'nobody'"));
}

#[test]
fn test_stats_json() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    add(&data_dir, "erin", "20", "1", "2024-01-01T00:00:00Z");
    add(&data_dir, "erin", "25", "1", "2024-01-02T00:00:00Z");
    add(&data_dir, "erin", "30", "1", "2024-01-03T00:00:00Z");

    let output = cli()
        .arg("stats")
        .arg("erin")
        .arg("--json")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["mean"], 25.0);
    assert_eq!(summary["min"], 20.0);
    assert_eq!(summary["max"], 30.0);
}

#[test]
fn test_users_listed_case_insensitively() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    add(&data_dir, "bob", "80", "1.8", "2024-01-01T00:00:00Z");
    add(&data_dir, "Alice", "60", "1.6", "2024-01-01T00:00:00Z");

    cli()
        .arg("users")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout("Alice\nbob\n");
}

#[test]
fn test_export_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let csv_path = temp_dir.path().join("alice.csv");

    add(&data_dir, "alice", "70", "1.75", "2024-01-01T08:00:00Z");
    add(&data_dir, "alice", "72", "1.75", "2024-01-08T08:00:00Z");

    cli()
        .arg("export")
        .arg("alice")
        .arg("--output")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 records"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<&str> = csv_content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "user_id,timestamp,weight_kg,height_m,bmi,category");
    assert!(lines[1].starts_with("alice,2024-01-01T08:00:00Z,70.0,1.75,"));
    assert!(lines[2].starts_with("alice,2024-01-08T08:00:00Z,72.0,1.75,"));
}

#[test]
fn test_export_default_file_name() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    add(&data_dir, "alice", "70", "1.75", "2024-01-01T08:00:00Z");

    cli()
        .current_dir(temp_dir.path())
        .arg("export")
        .arg("alice")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    assert!(temp_dir.path().join("alice_bmi_history.csv").exists());
}

#[test]
fn test_export_without_records_writes_nothing() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("nobody.csv");

    cli()
        .arg("export")
        .arg("nobody")
        .arg("--output")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));

    assert!(!csv_path.exists());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    add(&data_dir, "alice", "70", "1.75", "2024-01-01T08:00:00Z");

    cli()
        .arg("export")
        .arg("alice")
        .arg("--output")
        .arg(temp_dir.path().join("missing").join("out.csv"))
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_timestamp_rejected() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("add")
        .arg("alice")
        .arg("--weight")
        .arg("70")
        .arg("--height")
        .arg("1.75")
        .arg("--at")
        .arg("yesterday")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}
