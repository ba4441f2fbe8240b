use crate::{
    OpenOptions,
    fs::{
        Comparator, DirEntry, DirHandle, DirRecord, PathSpec, Result, SafeAccessGuard, Selector, SortSpec,
        scan_dir, split_path_spec,
    },
    reparse::{ReparsePointResolver, ReparseTarget},
};
use std::path::Path;

/**
 The public face of the engine: one guard, one resolver, and the
 `open`/`read`/`scan`/`resolve` operations that use them.

 The guard's drive cache lives as long as the lister, so a drive is probed at
 most once per lister. Share the lister (it is `Sync`) rather than creating
 one per call.

 ```no_run
 use dirscan::{DirLister, fs::SortSpec, fs::SortStrategy};

 let lister = DirLister::new();
 let spec = lister.split_path_spec(r"C:\Windows\*.exe")?;
 let mut handle = lister.open_dir(&spec.directory, SortSpec::new(SortStrategy::Name), &spec.pattern)?;
 while let Some(record) = dirscan::read_dir(&mut handle) {
     if record.entry.is_reparse_point() {
         let target = lister.resolve_reparse_point(record.entry.as_path())?;
         println!("{} -> {}", record.entry, target.target);
     }
 }
 dirscan::close_dir(handle);
 # Ok::<(), dirscan::DirError>(())
 ```
*/
#[derive(Debug, Default)]
pub struct DirLister {
    guard: SafeAccessGuard,
    resolver: ReparsePointResolver,
}

impl DirLister {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `guard` (and whatever it has cached) for every readiness check.
    #[must_use]
    pub fn with_guard(guard: SafeAccessGuard) -> Self {
        Self {
            guard,
            resolver: ReparsePointResolver::new(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ReparsePointResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /**
    See [`split_path_spec`].

    # Errors
    As [`split_path_spec`].
    */
    pub fn split_path_spec(&self, input: &str) -> Result<PathSpec> {
        split_path_spec(input, &self.guard)
    }

    /**
    Opens `directory` for reading entries matching `pattern`, sorted once by `sort`.

    # Errors
    As [`DirHandle::open`].
    */
    pub fn open_dir(&self, directory: &str, sort: SortSpec, pattern: &str) -> Result<DirHandle> {
        self.open_with(directory, &OpenOptions::new().sort(sort).pattern(pattern))
    }

    /**
    Opens `directory` with the full set of options.

    # Errors
    As [`DirHandle::open`].
    */
    pub fn open_with(&self, directory: &str, options: &OpenOptions) -> Result<DirHandle> {
        DirHandle::open(directory, options, &self.guard)
    }

    /**
    See [`scan_dir`](crate::fs::scan_dir).

    # Errors
    As [`scan_dir`](crate::fs::scan_dir).
    */
    pub fn scan_dir(
        &self,
        directory: &str,
        selector: Option<Selector<'_>>,
        comparator: Option<Comparator<'_>>,
    ) -> Result<Vec<DirEntry>> {
        scan_dir(directory, selector, comparator, &self.guard)
    }

    /**
    Resolves the reparse point at `path`.

    # Errors
    As [`ReparsePointResolver::resolve`].
    */
    pub fn resolve_reparse_point<P: AsRef<Path>>(&self, path: P) -> Result<ReparseTarget> {
        self.resolver.resolve(path)
    }

    /// `true` unless `path` sits on a drive that is not ready.
    #[must_use]
    pub fn is_drive_ready(&self, path: &str) -> bool {
        self.guard.is_safe(path)
    }

    #[must_use]
    pub const fn guard(&self) -> &SafeAccessGuard {
        &self.guard
    }
}

/// Next record of `handle`, or `None` at the end.
pub fn read_dir(handle: &mut DirHandle) -> Option<DirRecord<'_>> {
    handle.read()
}

/// Moves the read cursor, clamped to the number of entries.
pub fn seek_dir(handle: &mut DirHandle, offset: usize) {
    handle.seek(offset);
}

pub fn rewind_dir(handle: &mut DirHandle) {
    handle.rewind();
}

/// Releases the handle and everything it owns.
pub fn close_dir(handle: DirHandle) {
    handle.close();
}
