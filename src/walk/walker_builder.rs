use crate::{
    fs::{Result, SafeAccessGuard, SortSpec},
    reparse::ReparsePointResolver,
    util::Wildcard,
    walk::{DirEntryFilter, walker::Walker},
};
use core::num::NonZeroU32;

/**
 A builder for a [`Walker`] with customisable options.

 Sets the file name pattern, per-directory sort order, maximum depth, whether
 junctions and symlinks to directories are followed, whether directories
 themselves are reported, whether reparse points are resolved, and an optional
 custom filter.
*/
pub struct WalkerBuilder {
    pub(crate) root: String,
    pub(crate) pattern: Option<String>,
    pub(crate) sort: SortSpec,
    pub(crate) max_depth: Option<NonZeroU32>,
    pub(crate) follow_links: bool,
    pub(crate) keep_dirs: bool,
    pub(crate) resolve_links: bool,
    pub(crate) filter: Option<DirEntryFilter>,
    pub(crate) guard: Option<SafeAccessGuard>,
    pub(crate) resolver: ReparsePointResolver,
}

impl WalkerBuilder {
    /**
      Creates a new `WalkerBuilder` with required fields.

      # Arguments
      `root` - The directory to start walking from
    */
    pub fn new<A: AsRef<str>>(root: A) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            pattern: None,
            sort: SortSpec::UNSORTED,
            max_depth: None,
            follow_links: false,
            keep_dirs: false,
            resolve_links: true,
            filter: None,
            guard: None,
            resolver: ReparsePointResolver::new(),
        }
    }

    /// Set the file name wildcard (`*`, `?`), defaults to everything
    #[must_use]
    pub fn pattern<P: AsRef<str>>(mut self, pattern: P) -> Self {
        self.pattern = Some(pattern.as_ref().into());
        self
    }

    /// Set the order entries of each directory are visited in, defaults to OS order
    #[must_use]
    pub const fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Set maximum search depth. `Some(1)` lists the root only, `Some(0)` and `None` mean unlimited
    #[must_use]
    pub const fn max_depth(mut self, max_depth: Option<u32>) -> Self {
        match max_depth {
            None => self,
            Some(num) => {
                self.max_depth = NonZeroU32::new(num);
                self
            }
        }
    }

    /// Sets whether to descend into junctions and directory symlinks (default: false).
    ///
    /// Every directory is visited at most once, so this cannot loop forever.
    #[must_use]
    pub const fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Set whether to keep directories in results, defaults to false
    #[must_use]
    pub const fn keep_dirs(mut self, keep_dirs: bool) -> Self {
        self.keep_dirs = keep_dirs;
        self
    }

    /// Set whether reparse points get their `link` filled in, defaults to true
    #[must_use]
    pub const fn resolve_links(mut self, resolve_links: bool) -> Self {
        self.resolve_links = resolve_links;
        self
    }

    /// Set a custom filter
    #[must_use]
    pub const fn filter(mut self, filter: Option<DirEntryFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Use an existing guard (and its drive cache) instead of a fresh one
    #[must_use]
    pub fn guard(mut self, guard: SafeAccessGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Bound link targets with a custom resolver
    #[must_use]
    pub const fn resolver(mut self, resolver: ReparsePointResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /**
    Builds a [`Walker`] with the configured options.

    # Errors
    [`DirError::InvalidPattern`](crate::DirError::InvalidPattern) if the pattern cannot be compiled.
    */
    pub fn build(self) -> Result<Walker> {
        let wildcard = Wildcard::new(self.pattern.as_deref().unwrap_or("*"))?;
        Ok(Walker {
            root: self.root.into_boxed_str(),
            wildcard,
            sort: self.sort,
            max_depth: self.max_depth,
            follow_links: self.follow_links,
            keep_dirs: self.keep_dirs,
            resolve_links: self.resolve_links,
            filter: self.filter,
            guard: self.guard.unwrap_or_default(),
            resolver: self.resolver,
        })
    }
}
