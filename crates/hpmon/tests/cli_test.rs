//! Integration tests for the `hpmon` CLI binary.
//!
//! Nothing here needs a printer: pages come from fixtures and the sampling
//! tests point at a port where nothing listens.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Build a [`Command`] for the `hpmon` binary with env isolation.
///
/// Clears the `HPMON_*` variables, points config directories at a
/// nonexistent path, and runs inside `dir` so no stray `conf.toml` is found.
fn hpmon_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hpmon");
    cmd.current_dir(dir)
        .env("HOME", "/tmp/hpmon-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hpmon-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HPMON_CONFIG")
        .env_remove("HPMON_CA_CERT")
        .env_remove("HPMON_RRDFILE")
        .env_remove("HPMON_LOGFILE")
        .env_remove("HPMON_TIMEOUT_SECS")
        .env_remove("HPMON_PRINTER__HOST")
        .env_remove("HPMON_PRINTER__PORT")
        .env_remove("HPMON_THROTTLE__MIN_INTERVAL_SECS");
    cmd
}

/// A working directory with a `conf.toml` aimed at a closed local port.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let conf = format!(
        r#"ca-cert = "{ca}"
rrdfile = "{rrd}"
timeout-secs = 5

[printer]
host = "127.0.0.1"
port = 1
"#,
        ca = fixture("printer-ca.pem").display(),
        rrd = dir.path().join("usage.rrd").display(),
    );
    std::fs::write(dir.path().join("conf.toml"), conf).unwrap();
    dir
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("sample")
                .and(predicate::str::contains("probe"))
                .and(predicate::str::contains("extract")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hpmon"));
}

#[test]
fn test_invalid_output_format_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .args(["-o", "yaml", "extract", "page.html"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_subcommand_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .arg("graph")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    for shell in ["bash", "zsh", "fish"] {
        hpmon_cmd(dir.path())
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("hpmon"));
    }
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_missing_config_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .args(["--config", "/etc/hpmon/printer.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/hpmon/printer.toml"));
}

#[test]
fn test_config_show_finds_local_file() {
    let dir = workspace();
    hpmon_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("rrdfile")
                .and(predicate::str::contains("127.0.0.1"))
                .and(predicate::str::contains("min-interval-secs = 3300")),
        );
}

#[test]
fn test_env_overrides_config_file() {
    let dir = workspace();
    hpmon_cmd(dir.path())
        .env("HPMON_PRINTER__HOST", "printer.lan")
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("printer.lan"));
}

#[test]
fn test_missing_host_is_rejected_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("conf.toml"),
        "ca-cert = \"ca.pem\"\nrrdfile = \"usage.rrd\"\n",
    )
    .unwrap();
    hpmon_cmd(dir.path())
        .arg("sample")
        .assert()
        .code(10)
        .stderr(predicate::str::contains("printer.host"));
    assert!(!dir.path().join("usage.rrd").exists());
}

// ── Extract ─────────────────────────────────────────────────────────

#[test]
fn test_extract_saved_page() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .arg("extract")
        .arg(fixture("usage.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1000").and(predicate::str::contains("500")));
}

#[test]
fn test_extract_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = hpmon_cmd(dir.path())
        .args(["-o", "json", "extract"])
        .arg(fixture("usage.html"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["simplex"], 1000);
    assert_eq!(value["duplex"], 500);
}

#[test]
fn test_extract_plain() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .args(["-o", "plain", "extract"])
        .arg(fixture("usage.html"))
        .assert()
        .success()
        .stdout("1000 500\n");
}

#[test]
fn test_extract_page_without_usage_table() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("login.html");
    std::fs::write(&page, "<html><body><form id=\"login\"></form></body></html>").unwrap();

    hpmon_cmd(dir.path())
        .arg("extract")
        .arg(&page)
        .assert()
        .code(8)
        .stderr(predicate::str::contains("simplex"));
}

#[test]
fn test_extract_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    hpmon_cmd(dir.path())
        .args(["extract", "no-such-page.html"])
        .assert()
        .code(8);
}

// ── Sampling and store views ────────────────────────────────────────

#[test]
fn test_unreachable_printer_still_bootstraps_store() {
    let dir = workspace();
    hpmon_cmd(dir.path()).arg("sample").assert().code(7);
    assert!(dir.path().join("usage.rrd").is_file());

    hpmon_cmd(dir.path())
        .args(["-o", "plain", "info"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("3600 1435708800")
                .and(predicate::str::contains("letter-simplex U"))
                .and(predicate::str::contains("letter-duplex U")),
        );
}

#[test]
fn test_probe_does_not_create_store() {
    let dir = workspace();
    hpmon_cmd(dir.path()).arg("probe").assert().code(7);
    assert!(!dir.path().join("usage.rrd").exists());
}

#[test]
fn test_info_without_store_is_a_store_error() {
    let dir = workspace();
    hpmon_cmd(dir.path())
        .arg("info")
        .assert()
        .code(9)
        .stderr(predicate::str::contains("usage.rrd"));
}

#[test]
fn test_fetch_empty_store_reports_unknown_rows() {
    let dir = workspace();
    hpmon_cmd(dir.path()).arg("sample").assert().code(7);

    let output = hpmon_cmd(dir.path())
        .args(["-o", "json", "fetch"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let series: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(series["cf"], "AVERAGE");
    assert_eq!(series["resolution"], 3600);
    let rows = series["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 168);
    assert!(rows.iter().all(|r| r["values"] == serde_json::json!([null, null])));
}

#[test]
fn test_log_file_receives_cycle_lines() {
    let dir = workspace();
    let log = dir.path().join("hpmon.log");
    hpmon_cmd(dir.path())
        .arg("--log-file")
        .arg(&log)
        .arg("sample")
        .assert()
        .code(7);

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("Starting hpmon"), "log was:\n{text}");
    assert!(text.contains("ERROR"), "log was:\n{text}");
}
