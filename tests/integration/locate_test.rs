//! Locating a destination against a real utmp file and device directory.

use tempfile::TempDir;

use ttywrite::device::Devices;
use ttywrite::session::{Locator, SessionKind, SessionRecord, UtmpFile, WriteControl};
use ttywrite::WriteError;

use crate::helpers::{credentials, is_root, make_tty, write_utmp};

struct Fixture {
    _dir: TempDir,
    sessions: UtmpFile,
    devices: Devices,
}

/// `ttys` are (name, mode) pairs created under a fresh device directory.
fn fixture(records: &[SessionRecord], ttys: &[(&str, u32)]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let dev_dir = dir.path().join("dev");
    for (name, mode) in ttys {
        make_tty(&dev_dir, name, *mode);
    }
    let utmp = write_utmp(dir.path(), records);
    Fixture {
        sessions: UtmpFile::new(utmp),
        devices: Devices::new(dev_dir, credentials()),
        _dir: dir,
    }
}

fn control(src_tty: &str, dst: &str) -> WriteControl {
    WriteControl::new(credentials().uid, "alice", src_tty, dst)
}

// ============================================================================
// Best-session selection
// ============================================================================

#[test]
fn picks_the_only_interactive_session_with_messages_on() {
    if is_root() {
        return;
    }
    let fx = fixture(
        &[
            SessionRecord::new(SessionKind::LoginProcess, "bob", "tty1"),
            SessionRecord::login("bob", "pts/4"),
            SessionRecord::login("bob", "pts/3"),
            SessionRecord::login("carol", "pts/5"),
        ],
        &[
            ("tty1", 0o620),
            ("pts/4", 0o600),
            ("pts/3", 0o620),
            ("pts/5", 0o620),
        ],
    );
    let mut ctl = control("pts/1", "bob");

    let sel = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut ctl, None)
        .unwrap();
    assert_eq!(sel.tty, "pts/3");
    assert_eq!(sel.sessions, 3);
    assert_eq!(ctl.dst_tty.as_deref(), Some("pts/3"));
}

#[test]
fn sessions_whose_device_is_gone_are_skipped() {
    let fx = fixture(
        &[
            SessionRecord::login("bob", "pts/8"),
            SessionRecord::login("bob", "pts/3"),
        ],
        &[("pts/3", 0o620)],
    );
    let sel = Locator::new(&fx.sessions, &fx.devices)
        .select_best(&control("pts/1", "bob"))
        .unwrap();
    assert_eq!(sel.tty, "pts/3");
    assert_eq!(sel.candidates, 1);
}

#[test]
fn user_without_entries_is_not_logged_in() {
    let fx = fixture(&[SessionRecord::login("carol", "pts/5")], &[("pts/5", 0o620)]);
    let err = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut control("pts/1", "bob"), None)
        .unwrap_err();
    assert!(matches!(err, WriteError::NotLoggedIn { ref user } if user == "bob"));
}

#[test]
fn all_terminals_refusing_messages() {
    if is_root() {
        return;
    }
    let fx = fixture(
        &[
            SessionRecord::login("bob", "pts/3"),
            SessionRecord::login("bob", "pts/4"),
        ],
        &[("pts/3", 0o600), ("pts/4", 0o600)],
    );
    let err = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut control("pts/1", "bob"), None)
        .unwrap_err();
    assert_eq!(err.to_string(), "bob has messages disabled");
}

#[test]
fn writing_to_yourself_falls_back_to_own_terminal() {
    if is_root() {
        return;
    }
    let fx = fixture(
        &[
            SessionRecord::login("alice", "pts/1"),
            SessionRecord::login("alice", "pts/2"),
        ],
        &[("pts/1", 0o620), ("pts/2", 0o600)],
    );
    let sel = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut control("pts/1", "alice"), None)
        .unwrap();
    assert_eq!(sel.tty, "pts/1");
    assert!(sel.self_write);
}

// ============================================================================
// Explicit terminal
// ============================================================================

#[test]
fn explicit_terminal_with_dev_prefix() {
    let fx = fixture(
        &[
            SessionRecord::login("bob", "pts/3"),
            SessionRecord::login("bob", "pts/4"),
        ],
        &[("pts/3", 0o620), ("pts/4", 0o620)],
    );
    let mut ctl = control("pts/1", "bob");
    let sel = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut ctl, Some("/dev/pts/4"))
        .unwrap();
    assert_eq!(sel.tty, "pts/4");
    assert_eq!(sel.warning("bob"), None);
}

#[test]
fn explicit_terminal_of_someone_else() {
    let fx = fixture(
        &[
            SessionRecord::login("bob", "pts/3"),
            SessionRecord::login("carol", "pts/4"),
        ],
        &[("pts/3", 0o620), ("pts/4", 0o620)],
    );
    let err = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut control("pts/1", "bob"), Some("pts/4"))
        .unwrap_err();
    assert_eq!(err.to_string(), "bob is not logged in on pts/4");
}

#[test]
fn explicit_terminal_missing_from_dev_reports_path() {
    let fx = fixture(&[SessionRecord::login("bob", "pts/3")], &[]);
    let err = Locator::new(&fx.sessions, &fx.devices)
        .locate(&mut control("pts/1", "bob"), Some("pts/3"))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("pts/3"), "got: {}", msg);
    assert!(matches!(err, WriteError::Stat { .. }));
}
