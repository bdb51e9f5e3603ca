//! Tests for the `focusplay` binary.
//!
//! Only commands that finish on their own are exercised here; foreground
//! sessions are covered by the engine integration tests.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::Utc;
use predicates::prelude::*;

use focusplay::profile::{Profile, PROFILES_FILE_NAME};
use focusplay::session::{SESSION_FILE_NAME, STALE_AFTER_SECS};
use focusplay::stats::{today, Stats, STATS_FILE_NAME};
use focusplay::types::SessionSnapshot;

fn focusplay(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("focusplay").unwrap();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn write_record(data_dir: &Path, snapshot: &SessionSnapshot) {
    fs::write(
        data_dir.join(SESSION_FILE_NAME),
        serde_json::to_string_pretty(snapshot).unwrap(),
    )
    .unwrap();
}

fn fresh_snapshot(remaining_sec: u32) -> SessionSnapshot {
    let mut snapshot = SessionSnapshot::new("deep-work", 1500, remaining_sec);
    snapshot.saved_at = Utc::now().timestamp();
    snapshot
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("focusplay")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("resume"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("clear"))
        .stdout(predicate::str::contains("profiles"));
}

#[test]
fn test_status_without_session() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved session"));
}

#[test]
fn test_status_shows_saved_session() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), &fresh_snapshot(1200));

    focusplay(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("deep-work"))
        .stdout(predicate::str::contains("20:00 of 25:00"))
        .stdout(predicate::str::contains("Elapsed: 05:00"));
}

#[test]
fn test_status_shows_stats() {
    let dir = tempfile::tempdir().unwrap();
    let mut stats = Stats::default();
    stats.record_completion(today());
    stats.record_completion(today());
    fs::write(
        dir.path().join(STATS_FILE_NAME),
        serde_json::to_string(&stats).unwrap(),
    )
    .unwrap();

    focusplay(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Today: 2 sessions · Streak: 1 day"));
}

#[test]
fn test_status_without_stats_shows_zero() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Today: 0 sessions · Streak: 0 days"));
}

#[test]
fn test_status_discards_stale_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = fresh_snapshot(1200);
    snapshot.saved_at -= STALE_AFTER_SECS + 1;
    write_record(dir.path(), &snapshot);

    focusplay(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved session"));

    assert!(!dir.path().join(SESSION_FILE_NAME).exists());
}

#[test]
fn test_clear_removes_session() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), &fresh_snapshot(600));

    focusplay(dir.path())
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));

    assert!(!dir.path().join(SESSION_FILE_NAME).exists());
}

#[test]
fn test_resume_without_session_fails() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .arg("resume")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved session"));
}

#[test]
fn test_start_rejects_out_of_range_minutes() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .args(["start", "--minutes", "0"])
        .assert()
        .failure();
}

#[test]
fn test_start_unknown_profile_needs_minutes() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .args(["start", "--profile", "made-up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile 'made-up'"));
}

#[test]
fn test_profiles_lists_defaults_and_seeds_file() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("deep-work"))
        .stdout(predicate::str::contains("1:30:00"))
        .stdout(predicate::str::contains("pomodoro"))
        .stdout(predicate::str::contains("short-break"));

    assert!(dir.path().join(PROFILES_FILE_NAME).exists());
}

#[test]
fn test_profiles_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();

    focusplay(dir.path())
        .args(["profiles", "add", "lofi", "-m", "45", "--music", "/music/lofi", "--shuffle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved profile lofi"));

    let stored: Vec<Profile> = serde_json::from_str(
        &fs::read_to_string(dir.path().join(PROFILES_FILE_NAME)).unwrap(),
    )
    .unwrap();
    let lofi = stored.iter().find(|p| p.id == "lofi").unwrap();
    assert_eq!(lofi.duration_sec, 2700);
    assert!(lofi.shuffle);

    focusplay(dir.path())
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("♪ shuffle /music/lofi"));

    focusplay(dir.path())
        .args(["profiles", "remove", "lofi"])
        .assert()
        .success();

    focusplay(dir.path())
        .args(["profiles", "remove", "lofi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile not found"));
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{ oops").unwrap();

    focusplay(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("focusplay")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("focusplay"));
}
