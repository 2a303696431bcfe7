//! Termination flag raised by SIGINT and SIGHUP.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT};

/// Signals that end a conversation.
pub const TERMINATION_SIGNALS: [i32; 2] = [SIGINT, SIGHUP];

/// Set once the sender asks to stop. The relay loop polls it after every read.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Raise this flag on SIGINT and SIGHUP. The handler only stores to the
    /// flag.
    ///
    /// Reads interrupted by these signals are not restarted, so a read blocked
    /// on the sender's terminal returns at once and the relay sees the flag.
    pub fn install(&self) -> io::Result<()> {
        for signal in TERMINATION_SIGNALS {
            signal_hook::flag::register(signal, Arc::clone(&self.0))?;
            disable_restart(signal)?;
        }
        Ok(())
    }
}

/// Clear `SA_RESTART` on the handler currently installed for `signal`.
fn disable_restart(signal: i32) -> io::Result<()> {
    // SAFETY: sigaction is plain data; the handler itself is left untouched.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(signal, std::ptr::null(), &mut action) != 0 {
            return Err(io::Error::last_os_error());
        }
        action.sa_flags &= !libc::SA_RESTART;
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
