//! Directory enumeration: entries, handles, sorting and path handling.

pub(crate) mod access_guard;
mod attributes;
mod dir_entry;
mod dir_handle;
mod entry_buffer;
mod file_time;
mod path_spec;
mod scanner;
mod sort;
mod types;

pub use access_guard::{DEFAULT_PROBE_TIMEOUT, DriveProbe, NativeProbe, SafeAccessGuard, drive_letter, is_unc};
pub use attributes::Attributes;
pub use dir_entry::DirEntry;
pub use dir_handle::{DirHandle, DirRecord};
pub use entry_buffer::EntryBuffer;
pub use file_time::FileTime;
pub use path_spec::{PathSpec, split_path_spec};
pub use scanner::{Comparator, Selector, scan_dir};
pub(crate) use scanner::{Scanned, scan};
pub use sort::{SortSpec, SortStrategy};
pub use types::{GROWTH_FACTOR, INITIAL_CAPACITY, MAX_REPARSE_BUFFER, MAX_TARGET_LEN, Result, SIZE_UNKNOWN};
