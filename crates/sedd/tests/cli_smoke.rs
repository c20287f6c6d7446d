//! CLI smoke tests
//!
//! Drives the `sedd` binary end to end: config resolution, input parsing,
//! text and JSON reports, and failure exit codes.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn sedd_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sedd").expect("sedd binary should be built");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("SEDD_LOG_LEVEL");
    cmd
}

/// `zeros` silent outcomes followed by `alternating` 0,1,0,... outcomes.
fn switching_stream(zeros: usize, alternating: usize) -> String {
    let mut parts: Vec<&str> = vec!["0"; zeros];
    parts.extend((0..alternating).map(|i| if i % 2 == 0 { "0" } else { "1" }));
    parts.join(" ")
}

// =============================================================================
// config
// =============================================================================

#[test]
fn config_prints_defaults() {
    sedd_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("bit_width = 32"))
        .stdout(predicate::str::contains("window_size = 128"))
        .stdout(predicate::str::contains("magnitude = 0.37"));
}

#[test]
fn config_applies_flag_overrides() {
    sedd_cmd()
        .args(["config", "--window-size", "256", "--bit-width", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("window_size = 256"))
        .stdout(predicate::str::contains("bit_width = 12"));
}

#[test]
fn config_rejects_non_power_of_two_window() {
    sedd_cmd()
        .args(["config", "--window-size", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("power of two"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sedd.toml");
    std::fs::write(&path, "window_size = 64\nmagnitude = 0.5\n").unwrap();

    sedd_cmd()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("window_size = 64"))
        .stdout(predicate::str::contains("magnitude = 0.5"));
}

#[test]
fn missing_config_file_fails() {
    sedd_cmd()
        .args(["config", "--config", "/nonexistent/sedd.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/sedd.toml"));
}

// =============================================================================
// scan
// =============================================================================

#[test]
fn scan_file_reports_drift() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.txt");
    std::fs::write(&path, switching_stream(74, 64)).unwrap();

    sedd_cmd()
        .args(["scan", "--window-size", "64"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("drift at index"))
        .stdout(predicate::str::contains("samples: 138, drifts: 1"));
}

#[test]
fn scan_stdin_json_report() {
    let output = sedd_cmd()
        .args(["scan", "--window-size", "64", "--format", "json"])
        .write_stdin(switching_stream(74, 64))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["samples"], 138);
    let drifts = report["drifts"].as_array().unwrap();
    assert_eq!(drifts.len(), 1);
    let index = drifts[0]["index"].as_u64().unwrap();
    assert!((74..138).contains(&index), "index {index}");
    assert_eq!(report["detector"]["drifts_detected"], 1);
    assert_eq!(report["detector"]["config"]["window_size"], 64);
}

#[test]
fn scan_constant_stream_has_no_drift() {
    let stream = vec!["1"; 400].join("\n");
    sedd_cmd()
        .arg("scan")
        .write_stdin(stream)
        .assert()
        .success()
        .stdout(predicate::str::contains("drift at index").not())
        .stdout(predicate::str::contains("samples: 400, drifts: 0, phase: sliding"));
}

#[test]
fn scan_accepts_commas_and_dash_for_stdin() {
    sedd_cmd()
        .args(["scan", "-"])
        .write_stdin("0,1,1,0\n1, 0")
        .assert()
        .success()
        .stdout(predicate::str::contains("samples: 6, drifts: 0, phase: filling"));
}

#[test]
fn scan_rejects_invalid_sample() {
    sedd_cmd()
        .arg("scan")
        .write_stdin("0 1 maybe 1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid sample"))
        .stderr(predicate::str::contains("position 2"));
}

#[test]
fn scan_missing_input_file_fails() {
    sedd_cmd()
        .args(["scan", "/nonexistent/stream.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
}

#[test]
fn invalid_log_level_fails() {
    sedd_cmd()
        .args(["--log-level", "chatty", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log level"));
}

#[test]
fn log_file_receives_drift_event() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("logs").join("sedd.log");

    sedd_cmd()
        .args(["--log-level", "info", "--log-json", "--log-file"])
        .arg(&log)
        .args(["scan", "--window-size", "64"])
        .write_stdin(switching_stream(74, 64))
        .assert()
        .success();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("spectral entropy drift detected"), "{contents}");
}
