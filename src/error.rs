use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

/**
 An error type for directory enumeration and reparse point resolution.

 Every fallible operation in the crate reports one of these to its immediate
 caller. Nothing is retried internally; whether to warn-and-continue or abort
 is left to the caller (see [`crate::walk::Walker`] for the warn-and-continue case).
*/
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DirError {
    /// An allocation or growth request failed. Partially built structures are
    /// torn down before this is returned.
    #[error("out of memory while building directory listing")]
    OutOfMemory,

    /// The directory itself does not exist.
    #[error("no such directory: {}", path.display())]
    NotFound { path: PathBuf },

    /// The drive the path lives on is not ready, so no OS call was attempted.
    #[error("drive not ready, refusing to touch {}", path.display())]
    UnsafeAccess { path: PathBuf },

    /// The reparse buffer carried an unknown or unsupported tag, or its
    /// declared lengths disagree with the bytes actually returned.
    #[error("cannot decode reparse point (tag {tag:#010x}): {reason}")]
    ReparseDecode { tag: u32, reason: String },

    /// The decoded target does not fit the caller-supplied output bound.
    #[error("link target needs {needed} bytes but only {capacity} are available")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// The path exists but carries no reparse data.
    #[error("{} is not a reparse point", path.display())]
    NotAReparsePoint { path: PathBuf },

    /// A directory entry whose name cannot be represented as a `str`: a
    /// non-UTF-8 name on POSIX, an unpaired surrogate on Windows. Such entries
    /// are left out of listings and reported with this error instead.
    #[error("file name is not valid Unicode: {}", path.display())]
    NonUnicodeName { path: PathBuf },

    /// A wildcard pattern could not be compiled into a matcher.
    #[error("invalid wildcard pattern: {0}")]
    InvalidPattern(String),

    /// Any other OS failure, tagged with the path it happened on.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DirError {
    /// Wraps an OS error, promoting "not found" style failures to [`DirError::NotFound`].
    pub(crate) fn from_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::OutOfMemory => Self::OutOfMemory,
            _ => Self::Io { path, source },
        }
    }

    pub(crate) fn decode<S: Into<String>>(tag: u32, reason: S) -> Self {
        Self::ReparseDecode {
            tag,
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`DirError::OutOfMemory`].
    #[must_use]
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory)
    }

    /// Returns `true` for [`DirError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<TryReserveError> for DirError {
    #[inline]
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// A failure attached to one directory or entry during a recursive walk.
///
/// The walk records these and keeps going.
#[derive(Debug)]
pub struct TraversalError {
    /// The path that could not be read or resolved
    pub path: PathBuf,
    /// What went wrong
    pub error: DirError,
}

impl core::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = DirError::from_io("missing", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!err.is_out_of_memory());
    }

    #[test]
    fn reserve_failure_maps_to_out_of_memory() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve(usize::MAX).map_err(DirError::from).unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn non_unicode_name_shows_the_path() {
        let err = DirError::NonUnicodeName { path: PathBuf::from("dir/bad") };
        assert_eq!(err.to_string(), "file name is not valid Unicode: dir/bad");
    }

    #[test]
    fn decode_error_reports_tag_in_hex() {
        let err = DirError::decode(0x8000_0017, "unsupported tag");
        assert_eq!(
            err.to_string(),
            "cannot decode reparse point (tag 0x80000017): unsupported tag"
        );
    }
}
