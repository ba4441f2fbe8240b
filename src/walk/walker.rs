use crate::{
    DirError, TraversalError,
    fs::{Comparator, DirEntry, Result, SafeAccessGuard, Scanned, SortSpec, scan},
    reparse::ReparsePointResolver,
    util::Wildcard,
    walk::{DirEntryFilter, walker_builder::WalkerBuilder},
};
use core::num::NonZeroU32;
use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// An entry found by a walk, with how deep below the root it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub entry: DirEntry,
    /// 1 for entries of the root itself
    pub depth: u32,
}

/// Everything a walk produced: the entries, and the failures it stepped over.
#[derive(Debug, Default)]
pub struct WalkReport {
    pub entries: Vec<WalkEntry>,
    pub errors: Vec<TraversalError>,
}

impl WalkReport {
    /// Just the entries, in walk order.
    #[must_use]
    pub fn into_entries(self) -> Vec<DirEntry> {
        self.entries.into_iter().map(|found| found.entry).collect()
    }
}

/**
 Recursive, depth-first directory walker.

 Each directory is read with [`scan_dir`](crate::fs::scan_dir) and visited in the configured sort
 order. Junctions and symlinks to directories are only entered when following
 links is enabled; every directory is entered at most once (by canonical
 path), so link cycles terminate. A directory that cannot be read, a link
 that cannot be resolved, or an entry whose name is not valid Unicode is
 recorded in [`WalkReport::errors`] and the walk carries on.

 ```no_run
 use dirscan::walk::Walker;

 let walker = Walker::init("/etc").pattern("*.conf").max_depth(Some(2)).build()?;
 let report = walker.traverse()?;
 for found in &report.entries {
     println!("{}", found.entry);
 }
 for error in &report.errors {
     eprintln!("{error}");
 }
 # Ok::<(), dirscan::DirError>(())
 ```
*/
#[derive(Debug)]
pub struct Walker {
    /// Directory the walk starts from
    pub(crate) root: Box<str>,
    /// File name matcher for reported entries
    pub(crate) wildcard: Wildcard,
    pub(crate) sort: SortSpec,
    pub(crate) max_depth: Option<NonZeroU32>,
    pub(crate) follow_links: bool,
    pub(crate) keep_dirs: bool,
    pub(crate) resolve_links: bool,
    /// Optional custom filter function for advanced entry filtering
    pub(crate) filter: Option<DirEntryFilter>,
    pub(crate) guard: SafeAccessGuard,
    pub(crate) resolver: ReparsePointResolver,
}

/// State for one call to [`Walker::traverse`].
struct Walk<'walker> {
    walker: &'walker Walker,
    /// Canonical paths of the directories already entered
    visited: DashSet<PathBuf>,
    report: WalkReport,
}

impl Walker {
    /// Create a new Walker instance.
    #[must_use]
    #[inline]
    pub fn init<A: AsRef<str>>(root: A) -> WalkerBuilder {
        WalkerBuilder::new(root)
    }

    /// Returns a reference to the underlying root
    #[inline]
    #[must_use]
    pub fn root_dir(&self) -> &str {
        &self.root
    }

    /// The guard shared by every directory read of the walk.
    #[must_use]
    pub const fn guard(&self) -> &SafeAccessGuard {
        &self.guard
    }

    /**
    Walks the tree below the root.

    # Errors
    Only failures on the root itself are returned (not ready, missing, not a
    directory). Everything below it ends up in [`WalkReport::errors`].
    */
    pub fn traverse(&self) -> Result<WalkReport> {
        let compare = self.sort.comparator();
        let comparator: Option<Comparator<'_>> = self.sort.is_sorted().then_some(&compare as Comparator<'_>);

        let scanned = scan(&self.root, None, comparator, &self.guard)?;
        let mut walk = Walk {
            walker: self,
            visited: DashSet::new(),
            report: WalkReport::default(),
        };
        walk.first_visit(Path::new(&*self.root));
        walk.process(scanned, 1, comparator);

        tracing::debug!(
            root = &*self.root,
            found = walk.report.entries.len(),
            errors = walk.report.errors.len(),
            directories = walk.visited.len(),
            "walk finished"
        );
        Ok(walk.report)
    }

    /// Reported entries: files, plus directories when asked for, that pass
    /// both the wildcard and the custom filter.
    fn should_report(&self, entry: &DirEntry) -> bool {
        (self.keep_dirs || !entry.is_dir())
            && self.wildcard.is_match(entry.file_name())
            && self.filter.is_none_or(|keep| keep(entry))
    }

    fn should_descend(&self, entry: &DirEntry, depth: u32) -> bool {
        entry.is_dir()
            && (self.follow_links || !entry.is_reparse_point())
            && self.max_depth.is_none_or(|max| depth < max.get())
    }
}

impl Walk<'_> {
    /// `false` if this directory (or another path to it) was entered already.
    fn first_visit(&self, directory: &Path) -> bool {
        let key = std::fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());
        self.visited.insert(key)
    }

    fn process(&mut self, scanned: Scanned, depth: u32, comparator: Option<Comparator<'_>>) {
        self.report.errors.extend(scanned.skipped.into_iter().map(|path| TraversalError {
            path: path.clone(),
            error: DirError::NonUnicodeName { path },
        }));
        for mut entry in scanned.entries {
            if self.walker.resolve_links && entry.is_reparse_point() {
                if let Err(error) = entry.resolve_link(&self.walker.resolver) {
                    self.report.errors.push(TraversalError {
                        path: entry.as_path().to_path_buf(),
                        error,
                    });
                }
            }

            let descend_into = self
                .walker
                .should_descend(&entry, depth)
                .then(|| entry.name().to_owned());
            if self.walker.should_report(&entry) {
                self.report.entries.push(WalkEntry { entry, depth });
            }
            if let Some(directory) = descend_into {
                self.descend(&directory, depth + 1, comparator);
            }
        }
    }

    fn descend(&mut self, directory: &str, depth: u32, comparator: Option<Comparator<'_>>) {
        if !self.first_visit(Path::new(directory)) {
            tracing::debug!(directory, "already visited, skipping");
            return;
        }
        match scan(directory, None, comparator, &self.walker.guard) {
            Ok(scanned) => self.process(scanned, depth, comparator),
            Err(error) => {
                tracing::debug!(directory, %error, "could not read directory");
                self.report.errors.push(TraversalError {
                    path: directory.into(),
                    error,
                });
            }
        }
    }
}
