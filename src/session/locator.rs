//! Session Locator: turn a username (and maybe a terminal) into one
//! writable terminal.

use tracing::{debug, info, warn};

use super::{SessionSource, WriteControl};
use crate::device::{strip_dev_prefix, Devices};
use crate::error::WriteError;

/// The terminal chosen for a write, with what the scan saw along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Terminal name relative to the device directory
    pub tty: String,
    /// Session table entries for the target user
    pub sessions: usize,
    /// Entries that qualified as a destination
    pub candidates: usize,
    /// The sender's own terminal was picked as the last resort
    pub self_write: bool,
}

impl Selection {
    /// Non-fatal notice when the user had several qualifying terminals.
    pub fn warning(&self, user: &str) -> Option<String> {
        (self.candidates > 1).then(|| {
            format!(
                "{} is logged in more than once; writing to {}",
                user, self.tty
            )
        })
    }
}

/// Finds the destination terminal in a session table.
pub struct Locator<'a> {
    sessions: &'a dyn SessionSource,
    devices: &'a Devices,
}

impl<'a> Locator<'a> {
    pub fn new(sessions: &'a dyn SessionSource, devices: &'a Devices) -> Self {
        Self { sessions, devices }
    }

    /// Resolve the destination into `ctl.dst_tty`.
    ///
    /// With an explicit terminal the user must be logged in on exactly that
    /// line; otherwise the best of the user's terminals is chosen.
    pub fn locate(
        &self,
        ctl: &mut WriteControl,
        tty: Option<&str>,
    ) -> Result<Selection, WriteError> {
        let selection = match tty {
            Some(tty) => self.confirm_explicit(ctl, strip_dev_prefix(tty))?,
            None => self.select_best(ctl)?,
        };
        info!(user = %ctl.dst_login, tty = %selection.tty, "destination selected");
        ctl.dst_tty = Some(selection.tty.clone());
        Ok(selection)
    }

    /// Whether the table has an entry for `user` on `tty`.
    pub fn is_logged_in_on(&self, user: &str, tty: &str) -> Result<bool, WriteError> {
        Ok(self
            .sessions
            .records()?
            .iter()
            .any(|r| r.user.matches(user) && r.line.matches(tty)))
    }

    /// Check an explicitly named terminal.
    pub fn confirm_explicit(
        &self,
        ctl: &WriteControl,
        tty: &str,
    ) -> Result<Selection, WriteError> {
        if !self.is_logged_in_on(&ctl.dst_login, tty)? {
            return Err(WriteError::NotLoggedInOn {
                user: ctl.dst_login.clone(),
                tty: tty.to_string(),
            });
        }

        let status = self.devices.check(tty)?;
        if ctl.src_uid != 0 && !status.writable {
            return Err(WriteError::MessagesDisabledOn {
                user: ctl.dst_login.clone(),
                tty: tty.to_string(),
            });
        }

        Ok(Selection {
            tty: tty.to_string(),
            sessions: 1,
            candidates: 1,
            self_write: false,
        })
    }

    /// Pick the user's most recently used terminal that accepts messages.
    ///
    /// The sender's own terminal is never a candidate; it is only used when
    /// nothing else qualifies. Ties on access time keep the earlier entry.
    pub fn select_best(&self, ctl: &WriteControl) -> Result<Selection, WriteError> {
        let privileged = ctl.src_uid == 0;
        let mut sessions = 0;
        let mut candidates = 0;
        let mut user_is_me = false;
        let mut best: Option<(i64, String)> = None;

        for record in self.sessions.records()? {
            if !record.user.matches(&ctl.dst_login) {
                continue;
            }
            sessions += 1;

            let line = record.line.to_string_lossy().into_owned();
            let status = match self.devices.check(&line) {
                Ok(status) => status,
                Err(e) => {
                    debug!(tty = %line, error = %e, "skipping bad terminal");
                    continue;
                }
            };
            if !privileged && !status.writable {
                debug!(tty = %line, "skipping terminal with messages off");
                continue;
            }
            if record.line.matches(&ctl.src_tty) {
                user_is_me = true;
                continue;
            }
            if !record.kind.is_interactive() {
                debug!(tty = %line, kind = ?record.kind, "skipping non-login entry");
                continue;
            }

            candidates += 1;
            debug!(
                tty = %line,
                atime = status.atime,
                login_time = record.time,
                pid = record.pid,
                "candidate terminal"
            );
            let newer = best.as_ref().map_or(true, |(atime, _)| status.atime > *atime);
            if newer {
                best = Some((status.atime, line));
            }
        }

        if sessions == 0 {
            return Err(WriteError::NotLoggedIn {
                user: ctl.dst_login.clone(),
            });
        }

        if candidates > 1 {
            if let Some((_, tty)) = &best {
                warn!(user = %ctl.dst_login, tty = %tty, candidates, "logged in more than once");
            }
        }

        match best {
            Some((_, tty)) => Ok(Selection {
                tty,
                sessions,
                candidates,
                self_write: false,
            }),
            None if user_is_me => Ok(Selection {
                tty: ctl.src_tty.clone(),
                sessions,
                candidates,
                self_write: true,
            }),
            None => Err(WriteError::MessagesDisabled {
                user: ctl.dst_login.clone(),
            }),
        }
    }
}
