//! Native directory enumeration, drive probing and link reading.
//!
//! Each backend exposes the same three items:
//! - `NativeDir`, an iterator of `Result<NativeEntry>` with `.` and `..` already
//!   dropped. A name that is not valid Unicode comes through as
//!   `DirError::NonUnicodeName` and the stream carries on; a failed read comes
//!   through as `DirError::Io` and ends the stream.
//! - `probe_drive(letter) -> bool`
//! - `read_reparse_target(path, resolver)`, the OS half of reparse resolution

use crate::fs::{Attributes, FileTime};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::{NativeDir, probe_drive, read_reparse_target};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::{NativeDir, probe_drive, read_reparse_target};

/// One raw entry as the OS reported it, before it is joined onto its directory.
#[derive(Debug)]
pub(crate) struct NativeEntry {
    pub(crate) file_name: String,
    pub(crate) attributes: Attributes,
    pub(crate) creation_time: FileTime,
    pub(crate) access_time: FileTime,
    pub(crate) write_time: FileTime,
    pub(crate) size: u64,
}

/// `.` and `..` never leave the backend.
#[inline]
pub(crate) fn is_dot_entry(name: &[u8]) -> bool {
    matches!(name, b"." | b"..")
}
