use crate::fs::Result;

/// Separator inserted when joining a directory and a file name.
#[cfg(windows)]
pub(crate) const SEPARATOR: char = '\\';
#[cfg(not(windows))]
pub(crate) const SEPARATOR: char = '/';

/// Returns `true` for the path separators of the host platform.
///
/// Windows accepts both slashes; POSIX only the forward one (a backslash is an
/// ordinary file name character there).
#[inline]
#[must_use]
pub const fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// `true` if the string contains a `*` or `?` wildcard.
#[inline]
#[must_use]
pub fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Copies a string into a block sized exactly to it, reporting allocation failure.
///
/// # Errors
/// [`crate::DirError::OutOfMemory`] if the allocation cannot be satisfied.
#[inline]
pub fn try_box_str(s: &str) -> Result<Box<str>> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len())?;
    owned.push_str(s);
    Ok(owned.into_boxed_str())
}

/// `true` when `dir` can take a file name directly: it already ends in a
/// separator, or is a bare drive such as `c:`.
#[must_use]
pub(crate) fn is_root_like(dir: &str) -> bool {
    dir.ends_with(is_separator) || (cfg!(windows) && is_bare_drive(dir))
}

/// `x:` with nothing after it.
#[must_use]
pub(crate) fn is_bare_drive(s: &str) -> bool {
    matches!(s.as_bytes(), [letter, b':'] if letter.is_ascii_alphabetic())
}

/**
 Joins a directory and a file name with exactly one separator between them.

 Returns the joined string plus the byte offset where `name` starts.

 # Errors
 [`crate::DirError::OutOfMemory`] if the result cannot be allocated.
*/
pub fn join_path(dir: &str, name: &str) -> Result<(Box<str>, usize)> {
    let name = name.trim_start_matches(is_separator);
    let needs_separator = !dir.is_empty() && !is_root_like(dir);
    let mut joined = String::new();
    joined.try_reserve_exact(dir.len() + usize::from(needs_separator) + name.len())?;
    joined.push_str(dir);
    if needs_separator {
        joined.push(SEPARATOR);
    }
    let index = joined.len();
    joined.push_str(name);
    Ok((joined.into_boxed_str(), index))
}
