// Integration tests for trace loading, `ventana info` and `ventana plot`

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;
use ventana::workload::{Capacity, Workload};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_swf_fixture_loads_with_declared_capacity() {
    let workload = Workload::from_file(fixture("sample.swf")).unwrap();
    assert_eq!(workload.jobs().len(), 25);
    assert_eq!(workload.declared_capacity(), Some(10));
    let capacity = workload.resolve_capacity(Capacity::Auto);
    assert!((workload.mean_utilisation(capacity) - 0.7).abs() < 1e-9);
}

#[test]
fn test_csv_round_trip_preserves_job_sequence() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("jobs.csv");

    let workload = Workload::from_file(fixture("sample.swf")).unwrap();
    workload.to_csv(&path).unwrap();
    let reloaded = Workload::from_file(&path).unwrap();

    assert_eq!(workload.jobs().len(), reloaded.jobs().len());
    for (a, b) in workload.jobs().iter().zip(reloaded.jobs()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.submit_time, b.submit_time);
        assert_eq!(a.run_time, b.run_time);
        assert_eq!(a.res, b.res);
    }
}

#[test]
fn test_info_reports_summary() {
    let mut cmd = Command::cargo_bin("ventana").unwrap();
    cmd.arg("info").arg(fixture("sample.swf"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("jobs:"))
        .stdout(predicate::str::contains("mean utilisation: 0.7000"));
}

#[test]
fn test_info_missing_file_fails() {
    let mut cmd = Command::cargo_bin("ventana").unwrap();
    cmd.arg("info").arg("absent.swf");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn test_plot_writes_svg() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("chart.svg");

    Command::cargo_bin("ventana")
        .unwrap()
        .arg("plot")
        .arg(fixture("sample.swf"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("<svg"));
}

#[test]
fn test_plot_with_details_writes_svg() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("chart.svg");

    Command::cargo_bin("ventana")
        .unwrap()
        .arg("plot")
        .arg(fixture("sample.swf"))
        .arg("--details")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}
