use crate::DirError;
use crate::fs::access_guard::is_unc;
use crate::fs::{Result, SafeAccessGuard};
use crate::util::has_wildcard;
use core::fmt;

/// A user path expression split into a wildcard-free directory and a file name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    /// Where to look. Never contains a wildcard
    pub directory: String,
    /// What to match, `*` when nothing was given
    pub pattern: String,
}

impl PathSpec {
    fn new<D: Into<String>, P: Into<String>>(directory: D, pattern: P) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.directory, self.pattern)
    }
}

/**
 Splits a `dir\pattern` style argument.

 - one layer of surrounding double quotes is stripped
 - an existing directory comes back as-is with the pattern `*` (this check
   consults `guard` first and is never attempted on a UNC name or on input
   carrying a wildcard)
 - otherwise everything up to and including the last `:`, `/` or `\` is the
   directory and the rest is the pattern; a bare `x:` becomes `x:.`
 - no separator at all means the current directory, `.`

 # Errors
 [`DirError::InvalidPattern`] when a wildcard appears before the last
 component, since the directory part has to name one real directory.

 ```
 use dirscan::fs::{split_path_spec, DriveProbe, SafeAccessGuard};

 struct NoDrives;
 impl DriveProbe for NoDrives {
     fn is_ready(&self, _: u8) -> bool { false }
 }
 let guard = SafeAccessGuard::with_probe(NoDrives);

 let spec = split_path_spec(r"C:\Windows\*.dll", &guard)?;
 assert_eq!((spec.directory.as_str(), spec.pattern.as_str()), (r"C:\Windows\", "*.dll"));

 let spec = split_path_spec("d:*.txt", &guard)?;
 assert_eq!((spec.directory.as_str(), spec.pattern.as_str()), ("d:.", "*.txt"));

 assert!(split_path_spec(r"C:\*\*.dll", &guard).is_err());
 # Ok::<(), dirscan::DirError>(())
 ```
*/
pub fn split_path_spec(input: &str, guard: &SafeAccessGuard) -> Result<PathSpec> {
    let input = unquote(input);

    if !is_unc(input) && !has_wildcard(input) && guard.is_existing_dir(input) {
        tracing::trace!(input, "path spec is an existing directory");
        return Ok(PathSpec::new(input, "*"));
    }

    let Some(pos) = input.rfind([':', '/', '\\']) else {
        let pattern = if input.is_empty() { "*" } else { input };
        return Ok(PathSpec::new(".", pattern));
    };

    // every candidate separator is ASCII, so pos + 1 is a char boundary
    let (directory, rest) = input.split_at(pos + 1);
    if has_wildcard(directory) {
        return Err(DirError::InvalidPattern(format!(
            "{input}: wildcards are only allowed in the last component"
        )));
    }
    let mut directory = directory.to_owned();
    if directory.len() == 2 && directory.ends_with(':') {
        directory.push('.');
    }
    let pattern = if rest.is_empty() { "*" } else { rest };
    Ok(PathSpec::new(directory, pattern))
}

fn unquote(input: &str) -> &str {
    input
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::access_guard::tests::CountingProbe;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn guard() -> SafeAccessGuard {
        SafeAccessGuard::with_probe(CountingProbe::default())
    }

    fn split(input: &str) -> (String, String) {
        let spec = split_path_spec(input, &guard()).unwrap();
        (spec.directory, spec.pattern)
    }

    fn pair(d: &str, p: &str) -> (String, String) {
        (d.to_owned(), p.to_owned())
    }

    #[test]
    fn drive_path_with_wildcard() {
        assert_eq!(split(r"C:\Windows\*.dll"), pair(r"C:\Windows\", "*.dll"));
    }

    #[test]
    fn drive_root_gets_star() {
        assert_eq!(split(r"C:\"), pair(r"C:\", "*"));
    }

    #[test]
    fn bare_file_name_is_relative_to_dot() {
        assert_eq!(split("readme.txt"), pair(".", "readme.txt"));
    }

    #[test]
    fn bare_drive_becomes_drive_dot() {
        assert_eq!(split("x:"), pair("x:.", "*"));
        assert_eq!(split("x:foo*"), pair("x:.", "foo*"));
    }

    #[test]
    fn quotes_are_stripped_once() {
        assert_eq!(split(r#""C:\Program Files\*.exe""#), pair(r"C:\Program Files\", "*.exe"));
        assert_eq!(split(r#""unterminated"#), pair(".", r#""unterminated"#));
    }

    #[test]
    fn empty_input_means_everything_here() {
        assert_eq!(split(""), pair(".", "*"));
    }

    #[test]
    fn unc_spec_never_probes_or_stats() {
        let probe = CountingProbe::default();
        let calls = Arc::clone(&probe.calls);
        let guard = SafeAccessGuard::with_probe(probe);
        let spec = split_path_spec(r"\\server\share\*.txt", &guard).unwrap();
        assert_eq!(spec.directory, r"\\server\share\");
        assert_eq!(spec.pattern, "*.txt");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn existing_directory_takes_fast_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let all_ready = SafeAccessGuard::with_probe(CountingProbe {
            ready: b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            ..CountingProbe::default()
        });
        let spec = split_path_spec(path, &all_ready).unwrap();
        assert_eq!(spec, PathSpec::new(path, "*"));
    }

    #[test]
    fn wildcard_in_directory_part_is_rejected() {
        for input in [r"C:\Win*\system32\*.dll", "some/d?r/file.txt", "x*:foo"] {
            let err = split_path_spec(input, &guard()).unwrap_err();
            assert!(matches!(err, DirError::InvalidPattern(_)), "{input}: {err}");
        }
    }

    #[test]
    fn wildcard_input_skips_existing_directory_check() {
        let probe = CountingProbe {
            ready: b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            ..CountingProbe::default()
        };
        let calls = Arc::clone(&probe.calls);
        let guard = SafeAccessGuard::with_probe(probe);
        let spec = split_path_spec(r"C:\*.txt", &guard).unwrap();
        assert_eq!(spec, PathSpec::new(r"C:\", "*.txt"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn forward_slashes_split_too() {
        assert_eq!(split("some/dir/*.rs"), pair("some/dir/", "*.rs"));
    }
}
