use crate::OpenOptions;
use crate::fs::{DirEntry, DirHandle, EntryBuffer, Result, SafeAccessGuard};
use core::cmp::Ordering;
use std::path::PathBuf;

/// Decides whether an entry makes it into a scan result.
pub type Selector<'a> = &'a dyn Fn(&DirEntry) -> bool;

/// Orders the entries of a scan result.
pub type Comparator<'a> = &'a dyn Fn(&DirEntry, &DirEntry) -> Ordering;

/**
 Reads a whole directory in one call, `scandir(3)` style.

 Every entry is offered to `selector` (all are kept when it is `None`), the
 survivors are copied into a fresh array and sorted with `comparator` if one
 is given. The handle used underneath is closed on every path out of here.

 ```no_run
 use dirscan::fs::{scan_dir, DirEntry, SafeAccessGuard};

 let guard = SafeAccessGuard::new();
 let only_dirs = |e: &DirEntry| e.is_dir();
 let by_size = |a: &DirEntry, b: &DirEntry| a.raw_size().cmp(&b.raw_size());
 let dirs = scan_dir("/usr", Some(&only_dirs), Some(&by_size), &guard)?;
 # Ok::<(), dirscan::DirError>(())
 ```

 # Errors
 Anything [`DirHandle::open`] reports, or
 [`DirError::OutOfMemory`](crate::DirError::OutOfMemory) while copying; partial
 results are dropped before returning.
*/
pub fn scan_dir(
    directory: &str,
    selector: Option<Selector<'_>>,
    comparator: Option<Comparator<'_>>,
    guard: &SafeAccessGuard,
) -> Result<Vec<DirEntry>> {
    scan(directory, selector, comparator, guard).map(|scanned| scanned.entries)
}

/// A scan result plus the entries [`DirHandle::skipped`] set aside.
pub(crate) struct Scanned {
    pub(crate) entries: Vec<DirEntry>,
    pub(crate) skipped: Vec<PathBuf>,
}

pub(crate) fn scan(
    directory: &str,
    selector: Option<Selector<'_>>,
    comparator: Option<Comparator<'_>>,
    guard: &SafeAccessGuard,
) -> Result<Scanned> {
    let handle = DirHandle::open(directory, &OpenOptions::new(), guard)?;
    let selected = select(&handle, selector);
    let skipped = handle.skipped().to_vec();
    handle.close();

    let mut selected = selected?;
    if let Some(compare) = comparator {
        selected.sort_by(compare);
    }
    Ok(Scanned {
        entries: selected.into_vec(),
        skipped,
    })
}

fn select(handle: &DirHandle, selector: Option<Selector<'_>>) -> Result<EntryBuffer> {
    let mut selected = EntryBuffer::new()?;
    for entry in handle {
        if selector.is_none_or(|keep| keep(entry)) {
            selected.push(entry.try_clone()?)?;
        }
    }
    Ok(selected)
}
