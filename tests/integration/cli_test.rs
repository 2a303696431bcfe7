//! Integration tests for the ttywrite binary

use std::fs;
use std::process::Command;

use predicates::prelude::*;
use tempfile::TempDir;

use ttywrite::session::SessionRecord;

use crate::helpers::{make_tty, set_atime, write_config, write_utmp};

/// Helper to run ttywrite and capture output
fn run_ttywrite(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ttywrite"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("TTYWRITE_LOG")
        .output()
        .expect("Failed to execute ttywrite");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn ttywrite() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("ttywrite").unwrap();
    cmd.env_remove("TTYWRITE_LOG");
    cmd
}

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn help_exits_0_and_shows_usage() {
    let (stdout, _stderr, exit_code) = run_ttywrite(&["--help"]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Send a message to another user"));
    assert!(stdout.contains("<USER>"));
    assert!(stdout.contains("[TTYNAME]"));
}

#[test]
fn snapshot_cli_help() {
    let (stdout, stderr, exit_code) = run_ttywrite(&["--help"]);
    let output = format!(
        "=== ttywrite --help ===\nExit code: {}\n\n--- stdout ---\n{}\n--- stderr ---\n{}",
        exit_code, stdout, stderr
    );
    insta::assert_snapshot!("cli_help", output);
}

#[test]
fn version_exits_0() {
    ttywrite()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(concat!(
            "ttywrite ",
            env!("CARGO_PKG_VERSION")
        )));
}

// ============================================================================
// Usage Errors
// ============================================================================

#[test]
fn no_arguments_is_a_usage_error() {
    let (_stdout, stderr, exit_code) = run_ttywrite(&[]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("required arguments"));
    assert!(stderr.contains("<USER>"));
}

#[test]
fn too_many_arguments_is_a_usage_error() {
    ttywrite()
        .args(["bob", "pts/3", "pts/4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    ttywrite()
        .args(["--shout", "bob"])
        .assert()
        .code(2);
}

// ============================================================================
// Runtime Failures
// ============================================================================

#[test]
fn target_not_logged_in() {
    let dir = TempDir::new().unwrap();
    let dev_dir = dir.path().join("dev");
    fs::create_dir_all(&dev_dir).unwrap();
    let utmp = write_utmp(dir.path(), &[SessionRecord::login("carol", "pts/5")]);
    let config = write_config(dir.path(), &utmp, &dev_dir);

    ttywrite()
        .arg("--config")
        .arg(&config)
        .arg("bob")
        .write_stdin("never delivered\n")
        .assert()
        .code(1)
        .stderr(predicate::str::diff("ttywrite: bob is not logged in\n"));
}

#[test]
fn explicit_tty_not_in_table() {
    let dir = TempDir::new().unwrap();
    let dev_dir = dir.path().join("dev");
    make_tty(&dev_dir, "pts/3", 0o620);
    let utmp = write_utmp(dir.path(), &[SessionRecord::login("bob", "pts/3")]);
    let config = write_config(dir.path(), &utmp, &dev_dir);

    ttywrite()
        .arg("--config")
        .arg(&config)
        .args(["bob", "/dev/pts/9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bob is not logged in on pts/9"));
}

#[test]
fn missing_session_table_names_the_file() {
    let dir = TempDir::new().unwrap();
    let utmp = dir.path().join("no-such-utmp");
    let config = write_config(dir.path(), &utmp, dir.path());

    ttywrite()
        .arg("--config")
        .arg(&config)
        .arg("bob")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no-such-utmp"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[sessions\n").unwrap();

    ttywrite()
        .arg("--config")
        .arg(&config)
        .arg("bob")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

// ============================================================================
// End to End
// ============================================================================

#[test]
fn relays_stdin_to_target_terminal() {
    let dir = TempDir::new().unwrap();
    let dev_dir = dir.path().join("dev");
    let bob_tty = make_tty(&dev_dir, "pts/3", 0o620);
    let utmp = write_utmp(dir.path(), &[SessionRecord::login("bob", "pts/3")]);
    let config = write_config(dir.path(), &utmp, &dev_dir);

    ttywrite()
        .arg("--config")
        .arg(&config)
        .arg("bob")
        .write_stdin("are you there?\n\x1b[31mred\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&bob_tty).unwrap();
    // Piped stdio: the sender has no terminal
    assert!(written.starts_with("\r\n\x07\x07\x07Message from "));
    let header = written.lines().nth(1).unwrap();
    assert!(header.contains(" on <no tty> at "), "got: {:?}", header);
    assert!(written.ends_with("are you there?\r\n^[[31mred\r\nEOF\r\n"));
}

#[test]
fn several_sessions_warn_and_pick_most_recent() {
    let dir = TempDir::new().unwrap();
    let dev_dir = dir.path().join("dev");
    let idle = make_tty(&dev_dir, "pts/3", 0o620);
    let active = make_tty(&dev_dir, "pts/4", 0o620);
    set_atime(&idle, 1_000);
    set_atime(&active, 2_000);
    let utmp = write_utmp(
        dir.path(),
        &[
            SessionRecord::login("bob", "pts/3"),
            SessionRecord::login("bob", "pts/4"),
        ],
    );
    let config = write_config(dir.path(), &utmp, &dev_dir);

    ttywrite()
        .arg("--config")
        .arg(&config)
        .arg("bob")
        .env_remove("TTYWRITE_LOG")
        .write_stdin("hi\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "ttywrite: bob is logged in more than once; writing to pts/4\n",
        ))
        .stderr(predicate::str::contains("candidates=2"));

    assert!(fs::read_to_string(&idle).unwrap().is_empty());
    assert!(fs::read_to_string(&active).unwrap().ends_with("hi\r\nEOF\r\n"));
}
