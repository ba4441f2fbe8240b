use crate::fs::DirEntry;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

/// How entries are ordered after enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortStrategy {
    /// Leave the order the OS returned.
    #[default]
    Unsorted,
    /// By base name.
    Name,
    /// Non-directories before directories, then by name.
    FilesFirst,
    /// Directories before non-directories, then by name.
    DirsFirst,
}

impl FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "unsorted" => Ok(Self::Unsorted),
            "name" => Ok(Self::Name),
            "files" | "files-first" => Ok(Self::FilesFirst),
            "dirs" | "dirs-first" | "directories-first" => Ok(Self::DirsFirst),
            other => Err(format!("unknown sort strategy '{other}'")),
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsorted => "none",
            Self::Name => "name",
            Self::FilesFirst => "files",
            Self::DirsFirst => "dirs",
        })
    }
}

/**
 A sort strategy plus its `reverse` and `exact-case` modifiers.

 Immutable once built and passed around by value; comparators capture their
 own copy, so nothing global changes between sorts.

 ```
 use dirscan::fs::{Attributes, DirEntry, SortSpec, SortStrategy};

 let mut entries = vec![
     DirEntry::new("d/b.txt", Attributes::NORMAL).unwrap(),
     DirEntry::new("d/sub", Attributes::DIRECTORY).unwrap(),
     DirEntry::new("d/A.txt", Attributes::NORMAL).unwrap(),
 ];
 SortSpec::new(SortStrategy::DirsFirst).sort(&mut entries);
 let names: Vec<_> = entries.iter().map(|e| e.file_name()).collect();
 assert_eq!(names, ["sub", "A.txt", "b.txt"]);
 ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    strategy: SortStrategy,
    reverse: bool,
    exact_case: bool,
}

impl SortSpec {
    /// Unsorted, the order the OS hands back.
    pub const UNSORTED: Self = Self::new(SortStrategy::Unsorted);

    #[must_use]
    pub const fn new(strategy: SortStrategy) -> Self {
        Self {
            strategy,
            reverse: false,
            exact_case: false,
        }
    }

    /// Flip every non-equal comparison.
    #[must_use]
    pub const fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Compare names case-sensitively.
    #[must_use]
    pub const fn exact_case(mut self, exact_case: bool) -> Self {
        self.exact_case = exact_case;
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.reverse
    }

    #[must_use]
    pub const fn is_exact_case(&self) -> bool {
        self.exact_case
    }

    /// `false` only for [`SortStrategy::Unsorted`].
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        !matches!(self.strategy, SortStrategy::Unsorted)
    }

    /**
    Compares two entries.

    The order is total: names that are equal ignoring case fall back to a
    byte comparison, then to the full path, so only identical entries compare
    equal. The reverse flag is applied once, here, to the final result.
    */
    #[must_use]
    pub fn compare(&self, a: &DirEntry, b: &DirEntry) -> Ordering {
        let ordering = match self.strategy {
            SortStrategy::Unsorted => return Ordering::Equal,
            SortStrategy::Name => self.by_name(a, b),
            // false < true, so plain files come first
            SortStrategy::FilesFirst => a.is_dir().cmp(&b.is_dir()).then_with(|| self.by_name(a, b)),
            SortStrategy::DirsFirst => b.is_dir().cmp(&a.is_dir()).then_with(|| self.by_name(a, b)),
        };
        apply_reverse(ordering, self.reverse)
    }

    /// Builds a comparator closure capturing this spec.
    #[must_use]
    pub fn comparator(self) -> impl Fn(&DirEntry, &DirEntry) -> Ordering {
        move |a: &DirEntry, b: &DirEntry| self.compare(a, b)
    }

    /// Sorts a slice once, in place. A no-op for [`SortStrategy::Unsorted`].
    pub fn sort(&self, entries: &mut [DirEntry]) {
        if self.is_sorted() {
            entries.sort_by(|a, b| self.compare(a, b));
        }
    }

    fn by_name(&self, a: &DirEntry, b: &DirEntry) -> Ordering {
        let (left, right) = (a.file_name(), b.file_name());
        let ordering = if self.exact_case {
            left.cmp(right)
        } else {
            compare_ignore_case(left, right).then_with(|| left.cmp(right))
        };
        ordering.then_with(|| a.name().cmp(b.name()))
    }
}

impl From<SortStrategy> for SortSpec {
    fn from(strategy: SortStrategy) -> Self {
        Self::new(strategy)
    }
}

/// The single place reversal happens, so no family can invert twice.
#[inline]
const fn apply_reverse(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse { ordering.reverse() } else { ordering }
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::Attributes;

    fn file(name: &str) -> DirEntry {
        DirEntry::new(format!("root/{name}"), Attributes::NORMAL).unwrap()
    }

    fn dir(name: &str) -> DirEntry {
        DirEntry::new(format!("root/{name}"), Attributes::DIRECTORY).unwrap()
    }

    fn sample() -> Vec<DirEntry> {
        vec![
            file("beta.txt"),
            dir("Zeta"),
            file("Alpha.txt"),
            dir("alpha_dir"),
            file("alpha.txt"),
            dir("middle"),
            file("zz"),
        ]
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(DirEntry::file_name).collect()
    }

    const STRATEGIES: [SortStrategy; 3] = [SortStrategy::Name, SortStrategy::FilesFirst, SortStrategy::DirsFirst];

    #[test]
    fn name_sort_ignores_case_by_default() {
        let mut entries = sample();
        SortSpec::new(SortStrategy::Name).sort(&mut entries);
        assert_eq!(
            names(&entries),
            ["Alpha.txt", "alpha.txt", "alpha_dir", "beta.txt", "middle", "Zeta", "zz"]
        );
    }

    #[test]
    fn exact_case_puts_uppercase_first() {
        let mut entries = sample();
        SortSpec::new(SortStrategy::Name).exact_case(true).sort(&mut entries);
        assert_eq!(
            names(&entries),
            ["Alpha.txt", "Zeta", "alpha.txt", "alpha_dir", "beta.txt", "middle", "zz"]
        );
    }

    #[test]
    fn files_first_and_dirs_first_mirror_each_other() {
        let mut files_first = sample();
        SortSpec::new(SortStrategy::FilesFirst).sort(&mut files_first);
        assert_eq!(
            names(&files_first),
            ["Alpha.txt", "alpha.txt", "beta.txt", "zz", "alpha_dir", "middle", "Zeta"]
        );

        let mut dirs_first = sample();
        SortSpec::new(SortStrategy::DirsFirst).sort(&mut dirs_first);
        assert_eq!(
            names(&dirs_first),
            ["alpha_dir", "middle", "Zeta", "Alpha.txt", "alpha.txt", "beta.txt", "zz"]
        );
    }

    #[test]
    fn reverse_is_exact_mirror_for_every_strategy() {
        for strategy in STRATEGIES {
            for exact in [false, true] {
                let spec = SortSpec::new(strategy).exact_case(exact);
                let mut forward = sample();
                spec.sort(&mut forward);
                let mut backward = sample();
                spec.reverse(true).sort(&mut backward);
                backward.reverse();
                assert_eq!(names(&forward), names(&backward), "{strategy} exact={exact}");
            }
        }
    }

    #[test]
    fn order_is_total_and_sorting_is_idempotent() {
        let entries = sample();
        for strategy in STRATEGIES {
            for reverse in [false, true] {
                let spec = SortSpec::new(strategy).reverse(reverse);
                for a in &entries {
                    assert_eq!(spec.compare(a, a), Ordering::Equal);
                    for b in &entries {
                        // antisymmetry
                        assert_eq!(spec.compare(a, b), spec.compare(b, a).reverse());
                        for c in &entries {
                            if spec.compare(a, b).is_lt() && spec.compare(b, c).is_lt() {
                                assert!(spec.compare(a, c).is_lt(), "transitivity broke for {strategy}");
                            }
                        }
                    }
                }
                let mut once = entries.clone();
                spec.sort(&mut once);
                let mut twice = once.clone();
                spec.sort(&mut twice);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn unsorted_keeps_scan_order() {
        let mut entries = sample();
        SortSpec::UNSORTED.reverse(true).sort(&mut entries);
        assert_eq!(names(&entries), names(&sample()));
    }

    #[test]
    fn name_comparison_uses_base_name_only() {
        let spec = SortSpec::new(SortStrategy::Name);
        let a = DirEntry::new("zzz/apple", Attributes::NORMAL).unwrap();
        let b = DirEntry::new("aaa/banana", Attributes::NORMAL).unwrap();
        assert_eq!(spec.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn strategy_parses_from_cli_spelling() {
        assert_eq!("files".parse::<SortStrategy>(), Ok(SortStrategy::FilesFirst));
        assert_eq!("DIRS".parse::<SortStrategy>(), Ok(SortStrategy::DirsFirst));
        assert!("size".parse::<SortStrategy>().is_err());
    }
}
