//! Command-line definition, shared by the binary and the man page generator.

use std::path::PathBuf;

use clap::Parser;

/// Version string with build metadata.
#[cfg(not(feature = "release"))]
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("TTYWRITE_BUILD_DATE"),
    ")"
);

#[cfg(feature = "release")]
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TTYWRITE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "ttywrite",
    version = VERSION,
    about = "Send a message to another user",
    after_help = "Type the message and finish with end-of-file (Ctrl-D) or interrupt (Ctrl-C)."
)]
pub struct Cli {
    /// User to write to
    #[arg(value_name = "USER")]
    pub user: String,

    /// Terminal to write to, with or without a /dev/ prefix
    #[arg(value_name = "TTYNAME")]
    pub ttyname: Option<String>,

    /// Read configuration from FILE
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
