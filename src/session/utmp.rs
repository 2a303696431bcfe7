//! Reader for the glibc binary utmp file.
//!
//! Each record is a fixed 384-byte `struct utmp` in native byte order:
//!
//! | offset | field        | size |
//! |--------|--------------|------|
//! | 0      | `ut_type`    | 2 (+2 pad) |
//! | 4      | `ut_pid`     | 4    |
//! | 8      | `ut_line`    | 32   |
//! | 40     | `ut_id`      | 4    |
//! | 44     | `ut_user`    | 32   |
//! | 76     | `ut_host`    | 256  |
//! | 332    | `ut_exit`    | 4    |
//! | 336    | `ut_session` | 4    |
//! | 340    | `ut_tv`      | 8    |
//! | 348    | `ut_addr_v6` | 16   |
//! | 364    | unused       | 20   |

use std::path::PathBuf;

use super::record::{FixedField, SessionKind, SessionRecord, UT_HOSTSIZE, UT_LINESIZE, UT_NAMESIZE};
use super::SessionSource;
use crate::error::WriteError;

/// Size of one on-disk record.
pub const RECORD_SIZE: usize = 384;

const TYPE_OFFSET: usize = 0;
const PID_OFFSET: usize = 4;
const LINE_OFFSET: usize = 8;
const USER_OFFSET: usize = 44;
const HOST_OFFSET: usize = 76;
const TV_SEC_OFFSET: usize = 340;

/// The utmp file on disk.
#[derive(Debug, Clone)]
pub struct UtmpFile {
    path: PathBuf,
}

impl UtmpFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSource for UtmpFile {
    fn records(&self) -> Result<Vec<SessionRecord>, WriteError> {
        let data = std::fs::read(&self.path).map_err(|source| WriteError::SessionTable {
            path: self.path.clone(),
            source,
        })?;
        let records = parse(&data);
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "read session table"
        );
        Ok(records)
    }
}

/// Decode every complete record in `data`. A trailing partial record, as
/// seen while another process is appending, is ignored.
pub fn parse(data: &[u8]) -> Vec<SessionRecord> {
    data.chunks_exact(RECORD_SIZE).map(decode).collect()
}

fn decode(raw: &[u8]) -> SessionRecord {
    SessionRecord {
        kind: SessionKind::from_raw(i16::from_ne_bytes([raw[TYPE_OFFSET], raw[TYPE_OFFSET + 1]])),
        pid: read_i32(raw, PID_OFFSET),
        line: FixedField::from_bytes(&raw[LINE_OFFSET..LINE_OFFSET + UT_LINESIZE]),
        user: FixedField::from_bytes(&raw[USER_OFFSET..USER_OFFSET + UT_NAMESIZE]),
        host: FixedField::from_bytes(&raw[HOST_OFFSET..HOST_OFFSET + UT_HOSTSIZE]),
        time: i64::from(read_i32(raw, TV_SEC_OFFSET)),
    }
}

fn read_i32(raw: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&raw[offset..offset + 4]);
    i32::from_ne_bytes(buf)
}

/// Encode a record in the on-disk layout.
pub fn encode(record: &SessionRecord) -> [u8; RECORD_SIZE] {
    let mut raw = [0u8; RECORD_SIZE];
    raw[TYPE_OFFSET..TYPE_OFFSET + 2].copy_from_slice(&record.kind.to_raw().to_ne_bytes());
    raw[PID_OFFSET..PID_OFFSET + 4].copy_from_slice(&record.pid.to_ne_bytes());
    raw[LINE_OFFSET..LINE_OFFSET + UT_LINESIZE].copy_from_slice(record.line.raw());
    raw[USER_OFFSET..USER_OFFSET + UT_NAMESIZE].copy_from_slice(record.user.raw());
    raw[HOST_OFFSET..HOST_OFFSET + UT_HOSTSIZE].copy_from_slice(record.host.raw());
    // ut_tv.tv_sec is 32 bits in the on-disk format
    raw[TV_SEC_OFFSET..TV_SEC_OFFSET + 4].copy_from_slice(&(record.time as i32).to_ne_bytes());
    raw
}
