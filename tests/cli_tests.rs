#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("WORKLIST_CONFIG", "does-not-exist.toml")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_add_and_show_tasks() {
    run_cli("add 120 2025-01-06 2025-01-10 Write the report\nshow\nquit\n")
        .success()
        .stdout(str_contains("Added task id=1."))
        .stdout(str_contains("Write the report"));
}

#[test]
fn cli_rejects_bad_due_date() {
    run_cli("add 120 2025-01-06 someday Task\nquit\n")
        .success()
        .stdout(str_contains("invalid due date"));
}

#[test]
fn cli_forecast_prints_daily_hours() {
    run_cli("add 480 2025-01-06 2025-01-10 Report\nforecast 2025-01-06 09:00\nquit\n")
        .success()
        .stdout(str_contains("2025-01-08"))
        .stdout(str_contains("96.0"));
}

#[test]
fn cli_vacation_and_heatmap() {
    run_cli(
        "add 400 2025-01-06 2025-01-10 Essay\nvacation add 2025-01-08\nvacation add 2025-01-08\nvacation remove 2025-01-09\nvacation list\nheatmap 2025-01-06 09:00\nquit\n",
    )
    .success()
    .stdout(str_contains("Vacation marked on 2025-01-08."))
    .stdout(str_contains("2025-01-08 is already a day off."))
    .stdout(str_contains("No vacation on 2025-01-09."))
    .stdout(str_contains("Jan 06*"));
}

#[test]
fn cli_done_and_log_commands() {
    run_cli("add 60 2025-01-06 ASAP Call\nlog 1 20\ndone 1\ndone 7\nquit\n")
        .success()
        .stdout(str_contains("40 min remaining"))
        .stdout(str_contains("Task 1 finished."))
        .stdout(str_contains("task 7 not found"));
}

#[test]
fn cli_holiday_import() {
    let feed = NamedTempFile::new().unwrap();
    fs::write(
        feed.path(),
        r#"{"holidays":[{"observedDate":"2025-02-17","provinces":[{"id":"BC"}]}]}"#,
    )
    .unwrap();
    let script = format!("holidays import {} BC\nquit\n", feed.path().display());
    run_cli(&script)
        .success()
        .stdout(str_contains("Imported 1 holidays for BC."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().display().to_string();
    let script = format!(
        "add 30 2025-01-06 2025-01-07 Persisted\nsave json {path}\ndelete 1\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains(&format!("Saved to {path}.")));
    assert!(
        output.matches("Persisted").count() >= 3,
        "task should be listed after add, and again after load:\n{output}"
    );
}
