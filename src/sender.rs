//! Who is writing, and from which terminal.
//!
//! Everything here must be resolved before the destination terminal is
//! opened: once the relay starts, stdout no longer points at the sender.

use std::ffi::CStr;

use crate::device::{strip_dev_prefix, Devices};
use crate::error::WriteError;
use crate::session::{SessionKind, SessionSource, NO_TTY};

/// Placeholder for any name that cannot be resolved.
pub const UNKNOWN: &str = "???";

/// The sending user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub uid: u32,
    /// Name of the user who logged in to this session, falling back to `pw_name`
    pub login: String,
    /// Name the uid maps to in the password database
    pub pw_name: String,
    /// Sender's terminal without `/dev/`, if any standard stream is one
    pub tty: Option<String>,
}

impl Sender {
    /// Identify the running process.
    ///
    /// `sessions` answers for the login name when the kernel has no audit
    /// login uid for this session.
    pub fn identify(uid: u32, sessions: &dyn SessionSource) -> Result<Self, WriteError> {
        let pw_name = passwd_name(uid).unwrap_or_else(|| UNKNOWN.to_string());
        let login = login_name()
            .or_else(|| stdin_login(sessions))
            .unwrap_or_else(|| pw_name.clone());
        let tty = own_terminal()?;
        Ok(Self {
            uid,
            login,
            pw_name,
            tty,
        })
    }

    /// Terminal name for greetings and self-write checks.
    pub fn tty_name(&self) -> &str {
        self.tty.as_deref().unwrap_or(NO_TTY)
    }

    /// Refuse to write when the sender's own terminal has messages off,
    /// so the recipient can always answer.
    pub fn check_own_terminal(&self, devices: &Devices) -> Result<(), WriteError> {
        let Some(tty) = self.tty.as_deref() else {
            return Ok(());
        };
        if !devices.check(tty)?.writable {
            return Err(WriteError::SenderWriteOff);
        }
        Ok(())
    }
}

/// First of stdin, stdout, stderr that is a terminal.
fn own_terminal() -> Result<Option<String>, WriteError> {
    let streams = [
        (atty::Stream::Stdin, libc::STDIN_FILENO),
        (atty::Stream::Stdout, libc::STDOUT_FILENO),
        (atty::Stream::Stderr, libc::STDERR_FILENO),
    ];
    let Some(fd) = streams
        .iter()
        .find(|(stream, _)| atty::is(*stream))
        .map(|(_, fd)| *fd)
    else {
        return Ok(None);
    };

    let name = tty_name(fd).ok_or(WriteError::NoTtyName)?;
    Ok(Some(strip_dev_prefix(&name).to_string()))
}

/// Terminal device a descriptor is open on, as `ttyname` reports it.
pub fn tty_name(fd: libc::c_int) -> Option<String> {
    let target = std::fs::read_link(format!("/proc/self/fd/{}", fd)).ok()?;
    let name = target.to_str()?;
    // Pipes and sockets link to pseudo paths like "pipe:[1234]"
    name.starts_with('/').then(|| name.to_string())
}

/// Password database name for a uid.
pub fn passwd_name(uid: u32) -> Option<String> {
    let mut buf = vec![0 as libc::c_char; 1024];
    loop {
        // SAFETY: passwd is plain data; getpwuid_r fills it with pointers into buf.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }
        // SAFETY: pw_name points into buf, which is still alive.
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

/// Name of the user who logged in to this session, which survives `su`.
///
/// Read from the audit login uid; `None` when it was never set.
pub fn login_name() -> Option<String> {
    let raw = std::fs::read_to_string("/proc/self/loginuid").ok()?;
    let uid: u32 = raw.trim().parse().ok()?;
    if uid == u32::MAX {
        return None;
    }
    passwd_name(uid)
}

/// Login recorded in the session table for the terminal on stdin.
fn stdin_login(sessions: &dyn SessionSource) -> Option<String> {
    if !atty::is(atty::Stream::Stdin) {
        return None;
    }
    let name = tty_name(libc::STDIN_FILENO)?;
    session_login(sessions, strip_dev_prefix(&name))
}

/// User logged in on `tty` according to the session table.
///
/// Only login and user-process entries count, the ones `getutline` returns.
pub fn session_login(sessions: &dyn SessionSource, tty: &str) -> Option<String> {
    let records = match sessions.records() {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(error = %e, "no session table for login lookup");
            return None;
        }
    };
    records
        .iter()
        .filter(|r| matches!(r.kind, SessionKind::UserProcess | SessionKind::LoginProcess))
        .find(|r| r.line.matches(tty) && !r.user.is_empty())
        .map(|r| r.user.to_string_lossy().into_owned())
}

/// Local host name, or `None` if it cannot be read.
pub fn hostname() -> Option<String> {
    let mut buf = vec![0u8; 256];
    // SAFETY: buf is writable for buf.len() bytes.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    // Truncated names are not guaranteed to be NUL-terminated
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(end);
    let name = String::from_utf8_lossy(&buf).into_owned();
    (!name.is_empty()).then_some(name)
}
