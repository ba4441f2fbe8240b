use crate::fs::{SortSpec, SortStrategy};

/**
 Options for [`DirHandle::open`](crate::fs::DirHandle::open).

 ```
 use dirscan::{OpenOptions, fs::SortStrategy};

 let options = OpenOptions::new()
     .pattern("*.log")
     .sort_by(SortStrategy::Name)
     .reverse(true);
 assert_eq!(options.pattern_str(), "*.log");
 assert!(options.sort_spec().is_reversed());
 ```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub(crate) pattern: String,
    pub(crate) sort: SortSpec,
    pub(crate) resolve_links: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            pattern: "*".into(),
            sort: SortSpec::UNSORTED,
            resolve_links: false,
        }
    }
}

impl OpenOptions {
    /// Match everything, leave OS order, no link resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File name wildcard, `*` by default.
    #[must_use]
    pub fn pattern<P: AsRef<str>>(mut self, pattern: P) -> Self {
        pattern.as_ref().clone_into(&mut self.pattern);
        self
    }

    /// Replace the whole sort spec.
    #[must_use]
    pub const fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Keep the modifiers, change the strategy.
    #[must_use]
    pub const fn sort_by(mut self, strategy: SortStrategy) -> Self {
        self.sort = SortSpec::new(strategy)
            .reverse(self.sort.is_reversed())
            .exact_case(self.sort.is_exact_case());
        self
    }

    #[must_use]
    pub const fn reverse(mut self, reverse: bool) -> Self {
        self.sort = self.sort.reverse(reverse);
        self
    }

    #[must_use]
    pub const fn exact_case(mut self, exact_case: bool) -> Self {
        self.sort = self.sort.exact_case(exact_case);
        self
    }

    /// Resolve every reparse point while enumerating. Failures are logged and
    /// leave that entry's `link` empty.
    #[must_use]
    pub const fn resolve_links(mut self, resolve_links: bool) -> Self {
        self.resolve_links = resolve_links;
        self
    }

    #[must_use]
    pub fn pattern_str(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub const fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    #[must_use]
    pub const fn resolves_links(&self) -> bool {
        self.resolve_links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_keeps_modifiers() {
        let options = OpenOptions::new().reverse(true).exact_case(true).sort_by(SortStrategy::DirsFirst);
        let spec = options.sort_spec();
        assert_eq!(spec.strategy(), SortStrategy::DirsFirst);
        assert!(spec.is_reversed() && spec.is_exact_case());
    }

    #[test]
    fn defaults_match_everything_unsorted() {
        let options = OpenOptions::default();
        assert_eq!(options.pattern_str(), "*");
        assert!(!options.sort_spec().is_sorted());
        assert!(!options.resolves_links());
    }
}
