//! Login session records and their fixed-width fields.

use std::borrow::Cow;
use std::fmt;

/// Width of the user and line fields in a glibc utmp record.
pub const UT_NAMESIZE: usize = 32;
pub const UT_LINESIZE: usize = 32;
pub const UT_HOSTSIZE: usize = 256;

/// A fixed-capacity byte field that is NUL padded but not NUL terminated
/// when full.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedField<const N: usize>([u8; N]);

impl<const N: usize> FixedField<N> {
    /// Copy at most `N` bytes from `bytes`, zero-padding the rest.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = [0u8; N];
        let len = bytes.len().min(N);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self(buf)
    }

    /// Content up to the first NUL, or all `N` bytes if there is none.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..end]
    }

    /// The raw `N` bytes, padding included.
    pub fn raw(&self) -> &[u8; N] {
        &self.0
    }

    /// Bounded comparison: equal iff the first `N` bytes of `s` (up to its
    /// own NUL, if any) are exactly this field's content.
    pub fn matches(&self, s: &str) -> bool {
        let s = s.as_bytes();
        let s = &s[..s.iter().position(|&b| b == 0).unwrap_or(s.len())];
        &s[..s.len().min(N)] == self.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl<const N: usize> Default for FixedField<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> fmt::Debug for FixedField<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> fmt::Display for FixedField<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// The `ut_type` tag of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Empty,
    RunLevel,
    BootTime,
    NewTime,
    OldTime,
    InitProcess,
    LoginProcess,
    /// A normal interactive login
    UserProcess,
    DeadProcess,
    Accounting,
    Unknown(i16),
}

impl SessionKind {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            0 => Self::Empty,
            1 => Self::RunLevel,
            2 => Self::BootTime,
            3 => Self::NewTime,
            4 => Self::OldTime,
            5 => Self::InitProcess,
            6 => Self::LoginProcess,
            7 => Self::UserProcess,
            8 => Self::DeadProcess,
            9 => Self::Accounting,
            other => Self::Unknown(other),
        }
    }

    pub fn to_raw(self) -> i16 {
        match self {
            Self::Empty => 0,
            Self::RunLevel => 1,
            Self::BootTime => 2,
            Self::NewTime => 3,
            Self::OldTime => 4,
            Self::InitProcess => 5,
            Self::LoginProcess => 6,
            Self::UserProcess => 7,
            Self::DeadProcess => 8,
            Self::Accounting => 9,
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_interactive(self) -> bool {
        self == Self::UserProcess
    }
}

/// One entry of the active-sessions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub kind: SessionKind,
    pub pid: i32,
    /// Terminal name relative to the device directory, e.g. `pts/3`
    pub line: FixedField<UT_LINESIZE>,
    pub user: FixedField<UT_NAMESIZE>,
    pub host: FixedField<UT_HOSTSIZE>,
    /// Time the entry was written, seconds since the epoch
    pub time: i64,
}

impl SessionRecord {
    pub fn new(kind: SessionKind, user: &str, line: &str) -> Self {
        Self {
            kind,
            pid: 0,
            line: FixedField::from_bytes(line.as_bytes()),
            user: FixedField::from_bytes(user.as_bytes()),
            host: FixedField::default(),
            time: 0,
        }
    }

    /// An interactive login of `user` on `line`.
    pub fn login(user: &str, line: &str) -> Self {
        Self::new(SessionKind::UserProcess, user, line)
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = FixedField::from_bytes(host.as_bytes());
        self
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }
}
