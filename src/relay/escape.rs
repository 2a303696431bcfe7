//! Output filter that makes control characters visible.
//!
//! The destination is a terminal in someone else's session, so nothing the
//! sender types may reach it as a raw control sequence:
//!
//! - printable ASCII, tab and printable Unicode pass through
//! - `\n` becomes `\r\n`
//! - other ASCII controls become caret notation (`^G`, `^[`, `^?`)
//! - C1 controls, invisible format characters (bidi overrides, zero-width
//!   marks), line and paragraph separators, and bytes that are not UTF-8
//!   become `\ooo` octal

use std::io::Write;

/// Longest UTF-8 sequence; an incomplete tail shorter than this is held
/// back until the next chunk.
const MAX_UTF8_LEN: usize = 4;

/// Streaming escaper.
///
/// Input may arrive in arbitrary chunks; a multibyte character split
/// across two chunks is reassembled before it is judged.
#[derive(Debug, Default)]
pub struct Escaper {
    pending: Vec<u8>,
}

impl Escaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape `input` into `out`.
    pub fn push(&mut self, input: &[u8], out: &mut Vec<u8>) {
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            input
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(input);
            joined = buf;
            &joined
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    escape_str(valid, out);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to() bytes are known-good UTF-8
                    escape_str(std::str::from_utf8(valid).unwrap_or_default(), out);
                    match e.error_len() {
                        Some(len) => {
                            after[..len].iter().for_each(|&b| octal(b, out));
                            rest = &after[len..];
                        }
                        None if after.len() < MAX_UTF8_LEN => {
                            self.pending.extend_from_slice(after);
                            return;
                        }
                        None => {
                            after.iter().for_each(|&b| octal(b, out));
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush a held-back incomplete character as octal escapes.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        for b in self.pending.drain(..) {
            octal(b, out);
        }
    }
}

/// Escape a complete buffer in one go.
pub fn escape(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    let mut escaper = Escaper::new();
    escaper.push(input, &mut out);
    escaper.finish(&mut out);
    out
}

fn escape_str(s: &str, out: &mut Vec<u8>) {
    for c in s.chars() {
        match c {
            '\n' => out.extend_from_slice(b"\r\n"),
            '\t' => out.push(b'\t'),
            c if c.is_ascii_control() => {
                out.push(b'^');
                out.push(c as u8 ^ 0x40);
            }
            c if c.is_ascii() => out.push(c as u8),
            c if !is_printable(c) => {
                let mut buf = [0u8; MAX_UTF8_LEN];
                c.encode_utf8(&mut buf).bytes().for_each(|b| octal(b, out));
            }
            c => {
                let mut buf = [0u8; MAX_UTF8_LEN];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Whether a non-ASCII character may be shown as itself.
///
/// Rejects C1 controls (Cc), format characters (Cf) and the line and
/// paragraph separators (Zl, Zp). Format characters draw nothing but can
/// reorder or hide the text around them.
fn is_printable(c: char) -> bool {
    !(c.is_control() || is_format(c) || matches!(c, '\u{2028}' | '\u{2029}'))
}

/// Unicode general category Cf.
fn is_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    )
}

fn octal(b: u8, out: &mut Vec<u8>) {
    // Writing into a Vec cannot fail
    let _ = write!(out, "\\{:03o}", b);
}
