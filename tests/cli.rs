//! Command-line integration tests
//!
//! None of these reach a backend: each runs against an empty data
//! directory and exercises paths that fail or finish before any request.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trackr(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trackr").unwrap();
    cmd.env("TRACKR_DATA_DIR", data_dir.path())
        .env_remove("TRACKR_API_URL")
        .env_remove("TRACKR_PASSWORD")
        .env_remove("TRACKR_LOG");
    cmd
}

#[test]
fn help_lists_command_groups() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("budget"));
}

#[test]
fn settings_show_uses_data_dir() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8000"))
        .stdout(predicate::str::contains(dir.path().to_string_lossy().as_ref()))
        .stdout(predicate::str::contains("Logged in:        no"));
}

#[test]
fn settings_changes_are_persisted() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["settings", "api-url", "https://finance.example.com/"])
        .assert()
        .success();
    trackr(&dir)
        .args(["settings", "currency", "€"])
        .assert()
        .success();

    trackr(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://finance.example.com"))
        .stdout(predicate::str::contains("Currency:       €"));
}

#[test]
fn api_url_override_is_not_saved() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["--api-url", "https://other.example.com", "settings", "theme", "dark"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(saved.contains("http://localhost:8000"));
    assert!(saved.contains("dark"));
    assert!(!saved.contains("other.example.com"));
}

#[test]
fn invalid_api_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["settings", "api-url", "localhost:8000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http"));
}

#[test]
fn expense_list_requires_login() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["expense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn upload_rejects_unsupported_file_before_any_request() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "just some notes\nnothing tabular here\n").unwrap();

    trackr(&dir)
        .args(["upload", "direct"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a supported statement"));
}

#[test]
fn upload_rejects_empty_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("statement.csv");
    std::fs::write(&file, "").unwrap();

    trackr(&dir)
        .args(["upload", "preview"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn upload_show_without_preview() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["upload", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("preview"));
}

#[test]
fn upload_discard_without_preview() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["upload", "discard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending preview."));
}

#[test]
fn logout_when_signed_out() {
    let dir = TempDir::new().unwrap();
    trackr(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}
