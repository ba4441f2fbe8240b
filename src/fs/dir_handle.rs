use crate::fs::{DirEntry, EntryBuffer, Result, SafeAccessGuard};
use crate::reparse::ReparsePointResolver;
use crate::sys::{NativeDir, NativeEntry};
use crate::util::join_path;
use crate::{DirError, OpenOptions};
use std::path::PathBuf;

/// One record handed out by [`DirHandle::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirRecord<'handle> {
    /// 1-based position of the record in the snapshot
    pub index: u64,
    pub entry: &'handle DirEntry,
}

/**
 An open directory: a snapshot of its entries plus a read cursor.

 Everything is enumerated, filtered and (optionally) sorted up front in
 [`DirHandle::open`]; `read`, `seek` and `rewind` only move the cursor, so
 changes on disk after opening are never observed.

 ```no_run
 use dirscan::{OpenOptions, fs::{DirHandle, SafeAccessGuard, SortStrategy}};

 let guard = SafeAccessGuard::new();
 let mut handle = DirHandle::open("/var/log", &OpenOptions::new().sort_by(SortStrategy::Name), &guard)?;
 while let Some(record) = handle.read() {
     println!("{:>4} {}", record.index, record.entry);
 }
 handle.close();
 # Ok::<(), dirscan::DirError>(())
 ```
*/
#[derive(Debug)]
pub struct DirHandle {
    entries: Vec<DirEntry>,
    cursor: usize,
    directory: Box<str>,
    /// Entries left out because their names are not valid Unicode
    skipped: Vec<PathBuf>,
}

impl DirHandle {
    /**
    Opens `directory` and reads every entry matching the options' pattern.

    The drive is checked with `guard` before any OS call. Entry names are the
    directory joined to the file name. When the options ask for it, the
    snapshot is sorted once here, and reparse points are resolved; a failed
    resolution is logged and leaves that entry's link empty.

    An existing directory with nothing matching yields an empty handle.
    Entries whose names are not valid Unicode are left out and listed by
    [`skipped`](Self::skipped).

    # Errors
    - [`DirError::UnsafeAccess`](crate::DirError::UnsafeAccess) if the drive is not ready
    - [`DirError::NotFound`](crate::DirError::NotFound) if the directory does not exist
    - [`DirError::InvalidPattern`](crate::DirError::InvalidPattern) for a pattern that cannot be matched
    - [`DirError::OutOfMemory`](crate::DirError::OutOfMemory) if the snapshot cannot grow;
      everything gathered so far is released first
    - [`DirError::Io`](crate::DirError::Io) for any other OS failure, including
      one partway through reading the directory
    */
    pub fn open(directory: &str, options: &OpenOptions, guard: &SafeAccessGuard) -> Result<Self> {
        guard.check(directory)?;
        let native = NativeDir::open(directory, options.pattern_str())?;
        let (mut buffer, skipped) = snapshot(directory, native)?;

        let sort = options.sort_spec();
        if sort.is_sorted() {
            buffer.sort_by(sort.comparator());
        }
        let mut entries = buffer.into_vec();

        if options.resolves_links() {
            let resolver = ReparsePointResolver::new();
            for entry in entries.iter_mut().filter(|e| e.is_reparse_point()) {
                if let Err(err) = entry.resolve_link(&resolver) {
                    tracing::debug!(entry = entry.name(), %err, "leaving link unresolved");
                }
            }
        }

        tracing::debug!(
            directory,
            count = entries.len(),
            skipped = skipped.len(),
            sort = %sort.strategy(),
            "opened directory"
        );
        Ok(Self {
            entries,
            cursor: 0,
            directory: directory.into(),
            skipped,
        })
    }

    /// Returns the entry under the cursor and advances, or `None` once the
    /// snapshot is exhausted.
    pub fn read(&mut self) -> Option<DirRecord<'_>> {
        let entry = self.entries.get(self.cursor)?;
        self.cursor += 1;
        Some(DirRecord {
            index: self.cursor as u64,
            entry,
        })
    }

    /// Moves the cursor to `position`, clamped to the snapshot length.
    pub fn seek(&mut self, position: usize) {
        self.cursor = position.min(self.entries.len());
    }

    /// Where the next [`read`](Self::read) will start.
    #[must_use]
    pub const fn tell(&self) -> usize {
        self.cursor
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Releases the snapshot.
    pub fn close(self) {
        tracing::trace!(directory = &*self.directory, "closed directory");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole snapshot, regardless of the cursor.
    #[must_use]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// The directory as it was passed to [`open`](Self::open).
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Full paths of the entries left out because their names are not valid
    /// Unicode.
    #[must_use]
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<DirEntry> {
        self.entries
    }
}

impl IntoIterator for DirHandle {
    type Item = DirEntry;
    type IntoIter = std::vec::IntoIter<DirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'handle> IntoIterator for &'handle DirHandle {
    type Item = &'handle DirEntry;
    type IntoIter = core::slice::Iter<'handle, DirEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Drains a native stream into a buffer. Undecodable names are set aside,
/// every other error ends the snapshot.
fn snapshot<I>(directory: &str, native: I) -> Result<(EntryBuffer, Vec<PathBuf>)>
where
    I: IntoIterator<Item = Result<NativeEntry>>,
{
    let mut buffer = EntryBuffer::new()?;
    let mut skipped = Vec::new();
    for raw in native {
        match raw {
            Ok(raw) => buffer.push(into_entry(directory, raw)?)?,
            Err(DirError::NonUnicodeName { path }) => {
                tracing::debug!(path = %path.display(), "skipping entry whose name is not valid Unicode");
                skipped.push(path);
            }
            Err(err) => {
                tracing::debug!(directory, %err, "directory read failed");
                return Err(err);
            }
        }
    }
    Ok((buffer, skipped))
}

fn into_entry(directory: &str, raw: NativeEntry) -> Result<DirEntry> {
    let (name, file_name_index) = join_path(directory, &raw.file_name)?;
    Ok(DirEntry {
        name,
        file_name_index,
        link: None,
        is_special_link: false,
        attributes: raw.attributes,
        creation_time: raw.creation_time,
        access_time: raw.access_time,
        write_time: raw.write_time,
        size: raw.size,
    })
}
