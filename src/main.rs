//! ttywrite binary: locate the target terminal and relay stdin to it.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ttywrite::cli::Cli;
use ttywrite::device::{self, Credentials, Devices};
use ttywrite::relay::{self, Greeting, Relay, TerminationFlag};
use ttywrite::sender::Sender;
use ttywrite::session::{Locator, UtmpFile, WriteControl};
use ttywrite::{Config, WriteError};

const PROG: &str = env!("CARGO_BIN_NAME");

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = match e.downcast_ref::<WriteError>() {
                Some(err) => {
                    tracing::debug!(kind = ?err.kind(), "write failed");
                    eprintln!("{}: {}", PROG, err);
                    err.exit_code()
                }
                None => {
                    eprintln!("{}: {:#}", PROG, e);
                    1
                }
            };
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_logging(&config.log.level);

    if device::group_elevated() && config.pin_system_paths() {
        tracing::warn!("ignoring configured session table and device directory");
    }

    let creds = Credentials::current();
    let devices = Devices::new(&config.devices.dev_dir, creds);
    let sessions = UtmpFile::new(&config.sessions.utmp_path);

    // Names must be resolved before stdout stops pointing at the sender
    let sender = Sender::identify(creds.uid, &sessions)?;
    sender.check_own_terminal(&devices)?;

    let mut ctl = WriteControl::new(sender.uid, &sender.login, sender.tty_name(), &cli.user);
    let selection = Locator::new(&sessions, &devices).locate(&mut ctl, cli.ttyname.as_deref())?;
    if let Some(warning) = selection.warning(&ctl.dst_login) {
        eprintln!("{}: {}", PROG, warning);
    }

    let greeting = Greeting::for_sender(&sender);
    let destination = relay::open_destination(&devices, &selection.tty)?;

    let flag = TerminationFlag::new();
    flag.install()
        .context("failed to install signal handlers")?;

    let mut relay = Relay::new(destination, flag, config.relay.line_limit);
    let summary = relay.run(&greeting, io::stdin().lock())?;
    tracing::debug!(
        chunks = summary.chunks,
        interrupted = summary.interrupted,
        "message finished"
    );
    Ok(())
}

/// Log to stderr. `TTYWRITE_LOG` overrides the configured level.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("TTYWRITE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_target(false),
        )
        .init();
}
