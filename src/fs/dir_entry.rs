use crate::fs::{Attributes, FileTime, Result, SIZE_UNKNOWN};
use crate::reparse::{ReparsePointResolver, ReparseTarget};
use crate::util::{is_separator, try_box_str};
use core::fmt;
use std::path::Path;

/**
  A single filesystem entry produced by enumeration.

  `name` is the fully-qualified path (the enumerated directory joined with the
  entry's file name using exactly one separator). The `.` and `..`
  pseudo-entries never make it this far; the native backends drop them.

  `link` is only ever set on entries whose attributes carry the reparse-point
  bit, and only once resolution has succeeded.

  # Examples
  ```
  use dirscan::fs::{Attributes, DirEntry};

  let entry = DirEntry::new("some/dir/readme.txt", Attributes::NORMAL).unwrap();
  assert_eq!(entry.file_name(), "readme.txt");
  assert_eq!(entry.extension(), Some("txt"));
  assert!(entry.link().is_none());
  assert_eq!(entry.size(), None);
  ```
*/
#[derive(Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry, sized exactly to the string
    pub(crate) name: Box<str>,
    /// Offset in `name` where the base name starts
    pub(crate) file_name_index: usize,
    /// Resolved reparse target, if any
    pub(crate) link: Option<Box<str>>,
    /// Whether `link` came from a WSL or AppX tag
    pub(crate) is_special_link: bool,
    pub(crate) attributes: Attributes,
    pub(crate) creation_time: FileTime,
    pub(crate) access_time: FileTime,
    pub(crate) write_time: FileTime,
    /// Bytes, or [`SIZE_UNKNOWN`]
    pub(crate) size: u64,
}

impl DirEntry {
    /**
    Builds an entry from a full path and its attributes.

    Times are left unknown and the size is [`SIZE_UNKNOWN`]. Mostly useful for
    tests and for callers synthesising entries (the walker's root, for one).

    # Errors
    Returns [`crate::DirError::OutOfMemory`] if the name cannot be allocated.
    */
    pub fn new<S: AsRef<str>>(name: S, attributes: Attributes) -> Result<Self> {
        let name = name.as_ref();
        Ok(Self {
            file_name_index: base_name_index(name),
            name: try_box_str(name)?,
            link: None,
            is_special_link: false,
            attributes,
            creation_time: FileTime::UNKNOWN,
            access_time: FileTime::UNKNOWN,
            write_time: FileTime::UNKNOWN,
            size: SIZE_UNKNOWN,
        })
    }

    /// Sets the size, in bytes.
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Sets creation, access and write times, in that order.
    #[must_use]
    pub const fn with_times(mut self, creation: FileTime, access: FileTime, write: FileTime) -> Self {
        self.creation_time = creation;
        self.access_time = access;
        self.write_time = write;
        self
    }

    /// The full path of the entry.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full path as a [`Path`].
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&*self.name)
    }

    /// The last component of the path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        // file_name_index always sits on a char boundary: it is one past an ASCII separator or 0
        self.name.get(self.file_name_index..).unwrap_or(&self.name)
    }

    /// The extension of the base name, without the dot.
    ///
    /// Dot files such as `.profile` have no extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        match file_name.rfind('.') {
            Some(0) | None => None,
            Some(pos) => Some(&file_name[pos + 1..]),
        }
    }

    /// The resolved link target, if this is a reparse point that resolved.
    #[inline]
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// `true` when the link came from a WSL symlink or an AppX execution alias.
    #[inline]
    #[must_use]
    pub const fn is_special_link(&self) -> bool {
        self.is_special_link
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> Attributes {
        self.attributes
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.attributes.is_dir()
    }

    #[inline]
    #[must_use]
    pub const fn is_reparse_point(&self) -> bool {
        self.attributes.is_reparse_point()
    }

    /// Hidden by attribute, or by the POSIX leading-dot convention.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.attributes.is_hidden() || self.file_name().starts_with('.')
    }

    /// Size in bytes; `None` for directories and entries whose size is unknown.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        if self.size == SIZE_UNKNOWN {
            None
        } else {
            Some(self.size)
        }
    }

    /// The raw size field, including the [`SIZE_UNKNOWN`] sentinel.
    #[inline]
    #[must_use]
    pub const fn raw_size(&self) -> u64 {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn creation_time(&self) -> FileTime {
        self.creation_time
    }

    #[inline]
    #[must_use]
    pub const fn access_time(&self) -> FileTime {
        self.access_time
    }

    #[inline]
    #[must_use]
    pub const fn write_time(&self) -> FileTime {
        self.write_time
    }

    /**
    Stores a resolved target on the entry.

    Ignored (returns `false`) unless the entry is a reparse point, so `link`
    can never be set on an ordinary file or directory.
    */
    pub fn set_link(&mut self, target: ReparseTarget) -> bool {
        if !self.is_reparse_point() {
            return false;
        }
        self.is_special_link = target.is_special_link;
        self.link = Some(target.target.into_boxed_str());
        true
    }

    /**
    Resolves this entry's reparse point and stores the result as `link`.

    Does nothing for entries that are not reparse points.

    # Errors
    Whatever [`ReparsePointResolver::resolve`] reports. On error `link` is
    left untouched.
    */
    pub fn resolve_link(&mut self, resolver: &ReparsePointResolver) -> Result<()> {
        if !self.is_reparse_point() {
            return Ok(());
        }
        let target = resolver.resolve(self.as_path())?;
        self.set_link(target);
        Ok(())
    }

    /// Copies the entry into freshly sized allocations.
    ///
    /// Unlike `clone`, allocation failure is reported instead of aborting.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            name: try_box_str(&self.name)?,
            file_name_index: self.file_name_index,
            link: self.link.as_deref().map(try_box_str).transpose()?,
            is_special_link: self.is_special_link,
            attributes: self.attributes,
            creation_time: self.creation_time,
            access_time: self.access_time,
            write_time: self.write_time,
            size: self.size,
        })
    }
}

/// Finds where the base name starts in a path.
pub(crate) fn base_name_index(path: &str) -> usize {
    path.rfind(|c: char| is_separator(c) || (cfg!(windows) && c == ':'))
        .map_or(0, |pos| pos + 1)
}

impl fmt::Debug for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirEntry")
            .field("name", &self.name)
            .field("link", &self.link)
            .field("is_special_link", &self.is_special_link)
            .field("attributes", &self.attributes)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link() {
            Some(link) => write!(f, "{} -> {link}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl AsRef<str> for DirEntry {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl AsRef<Path> for DirEntry {
    #[inline]
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symlink_target(target: &str, special: bool) -> ReparseTarget {
        ReparseTarget {
            target: target.to_owned(),
            is_special_link: special,
        }
    }

    #[test]
    fn link_is_refused_on_plain_entries() {
        let mut entry = DirEntry::new("dir/plain.txt", Attributes::NORMAL).unwrap();
        assert!(!entry.set_link(symlink_target("elsewhere", false)));
        assert!(entry.link().is_none());
    }

    #[test]
    fn link_is_stored_on_reparse_points() {
        let mut entry = DirEntry::new("dir/junction", Attributes::DIRECTORY | Attributes::REPARSE_POINT).unwrap();
        assert!(entry.set_link(symlink_target("target/dir", true)));
        assert_eq!(entry.link(), Some("target/dir"));
        assert!(entry.is_special_link());
        assert_eq!(entry.to_string(), "dir/junction -> target/dir");
    }

    #[test]
    fn extension_ignores_dot_files() {
        let entry = DirEntry::new("home/.profile", Attributes::HIDDEN).unwrap();
        assert_eq!(entry.extension(), None);
        assert!(entry.is_hidden());
        let entry = DirEntry::new("archive.tar.gz", Attributes::NORMAL).unwrap();
        assert_eq!(entry.extension(), Some("gz"));
        assert_eq!(entry.file_name(), "archive.tar.gz");
    }

    #[test]
    fn try_clone_copies_everything() {
        let mut entry = DirEntry::new("a/b", Attributes::REPARSE_POINT)
            .unwrap()
            .with_size(42)
            .with_times(FileTime::from_ticks(1), FileTime::from_ticks(2), FileTime::from_ticks(3));
        entry.set_link(symlink_target("c", false));
        let copy = entry.try_clone().unwrap();
        assert_eq!(copy, entry);
        assert_eq!(copy.size(), Some(42));
        assert_eq!(copy.write_time().ticks(), 3);
    }

    #[test]
    fn zero_size_is_not_unknown() {
        let entry = DirEntry::new("empty", Attributes::NORMAL).unwrap().with_size(0);
        assert_eq!(entry.size(), Some(0));
        assert_eq!(entry.raw_size(), 0);
    }
}
