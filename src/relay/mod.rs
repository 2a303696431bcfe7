//! Message Relay: write a greeting, then the sender's lines, then `EOF`.
//!
//! - `escape`: control-character filter applied to every line
//! - `greeting`: the header identifying the sender
//! - `signals`: SIGINT/SIGHUP termination flag

pub mod escape;
pub mod greeting;
pub mod signals;

pub use escape::{escape, Escaper};
pub use greeting::Greeting;
pub use signals::TerminationFlag;

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::device::Devices;
use crate::error::WriteError;

/// Written after the last line, however the conversation ended.
pub const TRAILER: &[u8] = b"EOF\r\n";

/// How a relay run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    /// Input chunks written to the destination
    pub chunks: usize,
    /// Stopped by the termination flag rather than end of input
    pub interrupted: bool,
}

/// Open the destination terminal write-only.
pub fn open_destination(devices: &Devices, tty: &str) -> Result<File, WriteError> {
    let path = devices.path_for(tty)?;
    OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(|source| WriteError::Open { path, source })
}

/// Copies input to a destination terminal.
pub struct Relay<W: Write> {
    out: W,
    flag: TerminationFlag,
    /// Bytes per read, including room for a terminator
    line_limit: usize,
}

impl<W: Write> Relay<W> {
    pub fn new(out: W, flag: TerminationFlag, line_limit: usize) -> Self {
        Self {
            out,
            flag,
            line_limit: line_limit.max(2),
        }
    }

    /// Greeting, body, trailer.
    pub fn run<R: BufRead>(
        &mut self,
        greeting: &Greeting,
        input: R,
    ) -> Result<RelaySummary, WriteError> {
        self.greet(greeting)?;
        let summary = self.pump(input)?;
        self.finish()?;
        Ok(summary)
    }

    pub fn greet(&mut self, greeting: &Greeting) -> Result<(), WriteError> {
        self.out.write_all(greeting.render().as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Relay lines until end of input or until the termination flag is set.
    ///
    /// The flag is checked after each read returns, before anything from
    /// that read is written.
    pub fn pump<R: BufRead>(&mut self, mut input: R) -> Result<RelaySummary, WriteError> {
        let mut escaper = Escaper::new();
        let mut line = Vec::with_capacity(self.line_limit);
        let mut escaped = Vec::with_capacity(self.line_limit * 2);
        let mut summary = RelaySummary {
            chunks: 0,
            interrupted: false,
        };

        loop {
            let n = match self.read_chunk(&mut input, &mut line) {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "reading input failed; ending message");
                    0
                }
            };
            if self.flag.is_set() {
                debug!("termination requested");
                summary.interrupted = true;
                break;
            }
            if n == 0 {
                break;
            }

            escaped.clear();
            escaper.push(&line, &mut escaped);
            self.out.write_all(&escaped)?;
            self.out.flush()?;
            summary.chunks += 1;
        }

        escaped.clear();
        escaper.finish(&mut escaped);
        if !escaped.is_empty() {
            self.out.write_all(&escaped)?;
        }
        Ok(summary)
    }

    pub fn finish(&mut self) -> Result<(), WriteError> {
        self.out.write_all(TRAILER)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Read up to one line, at most `line_limit - 1` bytes.
    ///
    /// Interrupted reads are retried unless the termination flag went up.
    fn read_chunk<R: BufRead>(&self, input: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
        let max = self.line_limit - 1;
        buf.clear();

        while buf.len() < max {
            let available = match input.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    if self.flag.is_set() {
                        break;
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }

            let room = &available[..available.len().min(max - buf.len())];
            let (take, complete) = match room.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (room.len(), false),
            };
            buf.extend_from_slice(&room[..take]);
            input.consume(take);
            if complete {
                break;
            }
        }
        Ok(buf.len())
    }
}
