//! Integration tests for the `omnilogic` CLI binary.
//!
//! Everything runs against the captured payloads in `tests/fixtures`,
//! with config directories pointed at a throwaway location.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

/// Build a [`Command`] for the `omnilogic` binary with env isolation.
fn omnilogic_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("omnilogic");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("OMNILOGIC_PROFILE")
        .env_remove("OMNILOGIC_HOST")
        .env_remove("OMNILOGIC_PORT")
        .env_remove("OMNILOGIC_POLL_INTERVAL")
        .env_remove("OMNILOGIC_TIMEOUT")
        .env_remove("OMNILOGIC_OUTPUT");
    cmd
}

fn payload_args() -> [String; 4] {
    [
        "--config".into(),
        fixture("config.xml"),
        "--telemetry".into(),
        fixture("telemetry.xml"),
    ]
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("index")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Index ───────────────────────────────────────────────────────────

#[test]
fn test_index_table() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .arg("index")
        .args(payload_args())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Filter Pump")
                .and(predicate::str::contains("ON 60%"))
                .and(predicate::str::contains("Landscape Lights")),
        );
}

#[test]
fn test_index_plain_lists_every_id() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["index", "-o", "plain"])
        .args(payload_args())
        .output()
        .unwrap();
    assert!(output.status.success());

    let mut ids: Vec<i64> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().parse().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 3, 4, 5, 6, 9, 16, 17, 18, 42]);
}

#[test]
fn test_index_filters_by_kind() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["index", "--kind", "sensor", "-o", "plain"])
        .args(payload_args())
        .assert()
        .success()
        .stdout(predicate::str::diff("16\n17\n18\n"));
}

#[test]
fn test_index_json_carries_both_axes() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["index", "-o", "json"])
        .args(payload_args())
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let filter = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["msp_config"]["system_id"] == 3)
        .unwrap();
    assert_eq!(filter["msp_config"]["bow_id"], 1);
    assert_eq!(filter["telemetry"]["speed"], 60);

    let sensor = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["msp_config"]["system_id"] == 16)
        .unwrap();
    assert!(sensor["telemetry"].is_null());
}

// ── Show ────────────────────────────────────────────────────────────

#[test]
fn test_show_solar_sensor_reads_solar_heater() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["show", "17", "-o", "json"])
        .args(payload_args())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["readings"]["reading"], 91);
    assert_eq!(view["available"], true);
}

#[test]
fn test_show_heater_equipment_and_filter_readings() {
    let home = tempfile::tempdir().unwrap();
    let show = |id: &str| -> serde_json::Value {
        let output = omnilogic_cmd(home.path())
            .args(["show", id, "-o", "json"])
            .args(payload_args())
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", combined_output(&output));
        serde_json::from_slice(&output.stdout).unwrap()
    };

    assert_eq!(show("6")["readings"]["heating"], true);
    assert_eq!(show("3")["readings"]["last_speed"], 60);
    assert_eq!(show("0")["readings"]["service_mode"], false);
}

#[test]
fn test_show_unknown_device_exits_not_found() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["show", "9999"])
        .args(payload_args())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("9999"));
}

#[test]
fn test_missing_payload_file_fails() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["index", "--config", "/nonexistent/config.xml", "--telemetry"])
        .arg(fixture("telemetry.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/config.xml"));
}

#[test]
fn test_malformed_payload_is_a_data_error() {
    let home = tempfile::tempdir().unwrap();
    let bad = home.path().join("bad.xml");
    std::fs::write(&bad, "<MSPConfig><Backyard>").unwrap();

    let output = omnilogic_cmd(home.path())
        .arg("index")
        .arg("--config")
        .arg(&bad)
        .arg("--telemetry")
        .arg(fixture("telemetry.xml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9));
}

// ── Walk ────────────────────────────────────────────────────────────

#[test]
fn test_walk_starts_at_backyard() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["walk", "-o", "plain", "--config"])
        .arg(fixture("config.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout.lines().collect();
    assert_eq!(ids.first(), Some(&"0"));
    assert_eq!(ids.len(), 11);
}

// ── Send ────────────────────────────────────────────────────────────

#[test]
fn test_send_applies_prediction() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["send", "3"])
        .args(payload_args())
        .args(["speed", "75"])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied").and(predicate::str::contains("ON 75%")));
}

#[test]
fn test_send_out_of_range_speed_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["send", "3"])
        .args(payload_args())
        .args(["speed", "5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_send_to_unknown_device_exits_not_found() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["send", "9999"])
        .args(payload_args())
        .arg("on")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ── Watch / diagnostics ─────────────────────────────────────────────

#[test]
fn test_watch_prints_initial_update() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["watch", "--max-updates", "0"])
        .args(payload_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("11 entries"));
}

#[test]
fn test_diagnostics_include_raw_payloads() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .arg("diagnostics")
        .args(payload_args())
        .output()
        .unwrap();
    assert!(output.status.success());

    let dump: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dump["entries"], 11);
    assert!(
        dump["configuration_payload"]
            .as_str()
            .unwrap()
            .contains("<MSPConfig>")
    );
    assert_eq!(dump["status"]["last_update_success"], true);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    omnilogic_cmd(home.path())
        .args(["--host", "192.168.1.50", "config", "init", "--name", "home"])
        .assert()
        .success();

    omnilogic_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_profile = \"home\"")
                .and(predicate::str::contains("192.168.1.50")),
        );
}

#[test]
fn test_config_init_rejects_bad_timeout() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["--host", "pool.local", "--timeout", "30", "config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_set_default_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["config", "set-default", "cabin"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("cabin"));
}

#[test]
fn test_unknown_profile_flag_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = omnilogic_cmd(home.path())
        .args(["--profile", "cabin", "diagnostics"])
        .args(payload_args())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("cabin"));
}
