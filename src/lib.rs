//! ttywrite - send a message to another user's terminal
//!
//! The crate is split in two stages that run one after another:
//!
//! - [`session`] locates the target user's terminal from the login session
//!   table and validates that it accepts messages.
//! - [`relay`] opens that terminal, writes a greeting and copies input lines
//!   to it with control characters made visible.
//!
//! [`sender`] gathers who is writing and from where, [`device`] validates
//! terminal devices, and [`config`] holds the paths and limits both stages use.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod relay;
pub mod sender;
pub mod session;

pub use config::Config;
pub use error::{ErrorKind, WriteError};
pub use session::{Locator, WriteControl};
