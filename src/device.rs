//! Terminal device lookup and message-permission checks.

use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::error::WriteError;

/// Longest device path the kernel accepts, terminating NUL included.
pub const PATH_MAX: usize = libc::PATH_MAX as usize;

/// Group-write permission bit: set when the terminal accepts messages.
const S_IWGRP: u32 = 0o020;

/// The metadata of a terminal device that matters for writing to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMeta {
    pub mode: u32,
    pub gid: u32,
    /// Last access time, seconds since the epoch
    pub atime: i64,
}

/// Source of terminal device metadata.
///
/// The real implementation stats the filesystem; tests substitute a table.
pub trait DeviceProbe {
    fn stat(&self, path: &Path) -> io::Result<DeviceMeta>;
}

/// Stats devices on the local filesystem.
pub struct SysProbe;

impl DeviceProbe for SysProbe {
    fn stat(&self, path: &Path) -> io::Result<DeviceMeta> {
        let meta = std::fs::metadata(path)?;
        Ok(DeviceMeta {
            mode: meta.mode(),
            gid: meta.gid(),
            atime: meta.atime(),
        })
    }
}

/// Identity of the process that wants to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    /// Real user id
    pub uid: u32,
    /// Effective group id
    pub egid: u32,
}

impl Credentials {
    /// Credentials of the running process.
    pub fn current() -> Self {
        // SAFETY: getuid and getegid cannot fail and touch no memory.
        let (uid, egid) = unsafe { (libc::getuid(), libc::getegid()) };
        Self { uid, egid }
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}

/// Whether the process runs with a group it was not started with, as a
/// setgid install does.
pub fn group_elevated() -> bool {
    // SAFETY: getgid and getegid cannot fail and touch no memory.
    unsafe { libc::getgid() != libc::getegid() }
}

/// Result of validating a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalStatus {
    /// Whether the caller may write to this terminal
    pub writable: bool,
    /// Last access time of the device, seconds since the epoch
    pub atime: i64,
}

/// Resolves terminal names under a device directory and validates them.
pub struct Devices {
    dev_dir: PathBuf,
    probe: Box<dyn DeviceProbe>,
    creds: Credentials,
}

impl Devices {
    /// Validate devices on the real filesystem.
    pub fn new(dev_dir: impl Into<PathBuf>, creds: Credentials) -> Self {
        Self::with_probe(dev_dir, creds, Box::new(SysProbe))
    }

    /// Create with a specific probe (for testing).
    pub fn with_probe(
        dev_dir: impl Into<PathBuf>,
        creds: Credentials,
        probe: Box<dyn DeviceProbe>,
    ) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            probe,
            creds,
        }
    }

    /// Full device path for a terminal name.
    pub fn path_for(&self, tty: &str) -> Result<PathBuf, WriteError> {
        device_path(&self.dev_dir, tty)
    }

    /// Check that a terminal exists and whether messages to it are allowed.
    ///
    /// Root can always write. Anyone else needs the group-write bit set and
    /// an effective group matching the device's group.
    pub fn check(&self, tty: &str) -> Result<TerminalStatus, WriteError> {
        let path = self.path_for(tty)?;
        let meta = self
            .probe
            .stat(&path)
            .map_err(|source| WriteError::Stat { path, source })?;

        let writable = self.creds.is_root()
            || (meta.mode & S_IWGRP != 0 && self.creds.egid == meta.gid);

        Ok(TerminalStatus {
            writable,
            atime: meta.atime,
        })
    }
}

/// Join a terminal name onto the device directory, enforcing [`PATH_MAX`].
pub fn device_path(dev_dir: &Path, tty: &str) -> Result<PathBuf, WriteError> {
    // dir + '/' + name + NUL
    let needed = dev_dir.as_os_str().len() + 1 + tty.len() + 1;
    if needed > PATH_MAX {
        return Err(WriteError::PathTooLong {
            tty: tty.to_string(),
        });
    }
    Ok(dev_dir.join(tty))
}

/// Strip a leading `/dev/` from a terminal name, as `ttyname` and users
/// sometimes supply it.
pub fn strip_dev_prefix(tty: &str) -> &str {
    tty.strip_prefix("/dev/").unwrap_or(tty)
}
