//! Directory enumeration in the `opendir`/`readdir`/`scandir` style, with
//! Windows semantics where they matter.
//!
//! - [`DirHandle`] snapshots a directory (wildcard filtered, optionally sorted
//!   once) and hands entries out through a cursor that can seek and rewind.
//! - [`fs::scan_dir`] reads a whole directory in one call with an optional
//!   selector and comparator.
//! - [`reparse`] decodes NTFS reparse points (symlinks, junctions, WSL links
//!   and AppX execution aliases) with every offset bounds-checked.
//! - [`fs::SafeAccessGuard`] keeps the engine away from drives that are not
//!   ready, so a missing network share or an empty card reader cannot stall it.
//! - [`walk::Walker`] walks a tree recursively, surviving link cycles and
//!   per-directory failures.
//!
//! On POSIX hosts the same API is backed by `readdir`/`fstatat`/`readlink`;
//! symlinks are reported as reparse points there.
//!
//! ```no_run
//! use dirscan::{DirLister, OpenOptions, fs::SortStrategy};
//!
//! let lister = DirLister::new();
//! let options = OpenOptions::new().pattern("*.rs").sort_by(SortStrategy::FilesFirst).resolve_links(true);
//! let handle = lister.open_with("src", &options)?;
//! for entry in &handle {
//!     println!("{entry}");
//! }
//! # Ok::<(), dirscan::DirError>(())
//! ```

mod config;
mod error;
pub mod fs;
mod lister;
pub mod reparse;
mod sys;
pub mod util;
pub mod walk;

pub use config::OpenOptions;
pub use error::{DirError, TraversalError};
pub use fs::{DirEntry, DirHandle, DirRecord, Result};
pub use lister::{DirLister, close_dir, read_dir, rewind_dir, seek_dir};
pub use reparse::{ReparsePointResolver, ReparseTarget};
pub use walk::{WalkReport, Walker};
