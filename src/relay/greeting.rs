//! The header shown to the recipient before the message body.

use chrono::{DateTime, Local};

use crate::sender::{hostname, Sender, UNKNOWN};

/// Three bells, on a fresh line, to get the recipient's attention.
const ALERT: &str = "\r\n\x07\x07\x07";

/// Everything the greeting line says about the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub login: String,
    pub pw_name: String,
    pub host: String,
    pub tty: String,
    /// Local time of day, `HH:MM`
    pub time: String,
}

impl Greeting {
    /// Greeting for `sender` on this host, stamped with the current time.
    pub fn for_sender(sender: &Sender) -> Self {
        Self {
            login: sender.login.clone(),
            pw_name: sender.pw_name.clone(),
            host: hostname().unwrap_or_else(|| UNKNOWN.to_string()),
            tty: sender.tty_name().to_string(),
            time: timestamp(&Local::now()),
        }
    }

    /// The full header, CRLF terminated.
    pub fn render(&self) -> String {
        let as_clause = if self.login != self.pw_name {
            format!(" (as {})", self.pw_name)
        } else {
            String::new()
        };
        format!(
            "{}Message from {}@{}{} on {} at {} ...\r\n",
            ALERT, self.login, self.host, as_clause, self.tty, self.time
        )
    }
}

/// Hour and minute of `now`.
pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}
