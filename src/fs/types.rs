use crate::DirError;

///Generic result type for directory entry operations
pub type Result<T> = core::result::Result<T, DirError>;

/// Number of entries a fresh [`DirHandle`](crate::fs::DirHandle) or scan result can hold before growing.
pub const INITIAL_CAPACITY: usize = 100;

/// Multiplier applied to the capacity whenever the next insert would overflow it.
pub const GROWTH_FACTOR: usize = 5;

/// Size reported for directories and for entries whose size could not be read.
///
/// Distinct from `0`, which is a real, empty file.
pub const SIZE_UNKNOWN: u64 = u64::MAX;

/// Upper bound (in bytes) on a decoded link target.
///
/// Matches the extended-length path limit of the Win32 API.
pub const MAX_TARGET_LEN: usize = 32_767;

/// Size of the buffer handed to the "get reparse data" control request.
pub const MAX_REPARSE_BUFFER: usize = 16 * 1024;
