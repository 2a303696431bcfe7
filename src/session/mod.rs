//! Locating the terminal a message should go to.
//!
//! - [`record`] - session records and fixed-width field comparison
//! - [`utmp`] - the on-disk session table
//! - [`locator`] - explicit-terminal confirmation and best-terminal selection

pub mod locator;
pub mod record;
pub mod utmp;

pub use locator::{Locator, Selection};
pub use record::{FixedField, SessionKind, SessionRecord};
pub use utmp::UtmpFile;

use crate::error::WriteError;

/// Placeholder terminal name when the sender has no terminal at all.
pub const NO_TTY: &str = "<no tty>";

/// A table of active login sessions.
pub trait SessionSource {
    /// All records, in table order.
    fn records(&self) -> Result<Vec<SessionRecord>, WriteError>;
}

impl SessionSource for Vec<SessionRecord> {
    fn records(&self) -> Result<Vec<SessionRecord>, WriteError> {
        Ok(self.clone())
    }
}

/// State carried from locating the target into writing to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteControl {
    pub src_uid: u32,
    /// The sender's login name
    pub src_login: String,
    /// The sender's terminal, without `/dev/`, or [`NO_TTY`]
    pub src_tty: String,
    pub dst_login: String,
    /// Resolved target terminal, set by [`Locator::locate`]
    pub dst_tty: Option<String>,
}

impl WriteControl {
    pub fn new(
        src_uid: u32,
        src_login: impl Into<String>,
        src_tty: impl Into<String>,
        dst_login: impl Into<String>,
    ) -> Self {
        Self {
            src_uid,
            src_login: src_login.into(),
            src_tty: src_tty.into(),
            dst_login: dst_login.into(),
            dst_tty: None,
        }
    }
}
