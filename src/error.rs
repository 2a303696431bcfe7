//! Errors raised while locating or writing to a terminal.

use std::path::PathBuf;

/// Everything that can stop a write.
///
/// All of these are fatal: the binary prints the message and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("{user} is not logged in")]
    NotLoggedIn { user: String },

    #[error("{user} is not logged in on {tty}")]
    NotLoggedInOn { user: String, tty: String },

    #[error("{user} has messages disabled")]
    MessagesDisabled { user: String },

    #[error("{user} has messages disabled on {tty}")]
    MessagesDisabledOn { user: String, tty: String },

    #[error("tty path {tty} too long")]
    PathTooLong { tty: String },

    #[error("can't find your tty's name")]
    NoTtyName,

    #[error("you have write permission turned off")]
    SenderWriteOff,

    #[error("{}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    SessionTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write to terminal failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad class of a [`WriteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Target not logged in, bad terminal name
    Validation,
    /// Sender or target refuses messages
    Permission,
    /// Stat, open, read or write failure
    Io,
}

impl WriteError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotLoggedIn { .. }
            | Self::NotLoggedInOn { .. }
            | Self::PathTooLong { .. }
            | Self::NoTtyName => ErrorKind::Validation,
            Self::MessagesDisabled { .. }
            | Self::MessagesDisabledOn { .. }
            | Self::SenderWriteOff => ErrorKind::Permission,
            Self::Stat { .. } | Self::Open { .. } | Self::SessionTable { .. } | Self::Io(_) => {
                ErrorKind::Io
            }
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
