use super::ReparseData;
use crate::DirError;
use crate::fs::{MAX_TARGET_LEN, Result};
use std::path::Path;

/// What a reparse point points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReparseTarget {
    /// Logical target path (print name, WSL target or AppX executable)
    pub target: String,
    /// `true` for WSL symlinks and AppX execution aliases
    pub is_special_link: bool,
}

/**
 Reads and decodes reparse points, bounding the size of the result.

 `capacity` plays the part of a caller-supplied output buffer: a decoded
 target longer than it (in bytes) is reported as
 [`DirError::BufferTooSmall`] rather than truncated.

 # Examples
 ```
 use dirscan::reparse::ReparsePointResolver;

 let resolver = ReparsePointResolver::with_capacity(16);
 // a WSL symlink pointing at "/tmp/x"
 let mut raw = 0xA000_001D_u32.to_le_bytes().to_vec();
 raw.extend_from_slice(&10u16.to_le_bytes());
 raw.extend_from_slice(&[0, 0]);
 raw.extend_from_slice(&2u32.to_le_bytes());
 raw.extend_from_slice(b"/tmp/x");

 let target = resolver.decode(&raw).unwrap();
 assert_eq!(target.target, "/tmp/x");
 assert!(target.is_special_link);
 ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparsePointResolver {
    capacity: usize,
}

impl Default for ReparsePointResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ReparsePointResolver {
    /// A resolver bounded by the longest path the OS will hand back.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capacity: MAX_TARGET_LEN,
        }
    }

    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /**
    Resolves the reparse point at `path` without following it.

    # Errors
    - [`DirError::NotAReparsePoint`] if the path carries no reparse data
    - [`DirError::NotFound`] / [`DirError::Io`] if it cannot be opened
    - [`DirError::ReparseDecode`] for malformed or unsupported buffers
    - [`DirError::BufferTooSmall`] if the target exceeds the capacity
    */
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> Result<ReparseTarget> {
        let path = path.as_ref();
        let resolved = crate::sys::read_reparse_target(path, self);
        match &resolved {
            Ok(target) => tracing::trace!(path = %path.display(), target = %target.target, "resolved reparse point"),
            Err(err) => tracing::debug!(path = %path.display(), %err, "reparse point resolution failed"),
        }
        resolved
    }

    /**
    Decodes a raw reparse buffer exactly as returned by the OS.

    # Errors
    [`DirError::ReparseDecode`] or [`DirError::BufferTooSmall`].
    */
    pub fn decode(&self, buffer: &[u8]) -> Result<ReparseTarget> {
        let data = ReparseData::parse(buffer)?;
        self.bounded(data.target(), data.is_special_link())
    }

    pub(crate) fn bounded(&self, target: String, is_special_link: bool) -> Result<ReparseTarget> {
        if target.len() > self.capacity {
            return Err(DirError::BufferTooSmall {
                needed: target.len(),
                capacity: self.capacity,
            });
        }
        Ok(ReparseTarget {
            target,
            is_special_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reparse::IO_REPARSE_TAG_SYMLINK;
    use crate::reparse::decode::tests::{appx_buffer, name_pair_buffer, wsl_buffer};

    #[test]
    fn symlink_is_not_special() {
        let buf = name_pair_buffer(IO_REPARSE_TAG_SYMLINK, r"\??\C:\target", r"C:\target", Some(0));
        let target = ReparsePointResolver::new().decode(&buf).unwrap();
        assert_eq!(
            target,
            ReparseTarget {
                target: r"C:\target".to_owned(),
                is_special_link: false
            }
        );
    }

    #[test]
    fn appx_is_special() {
        let buf = appx_buffer(&["pkg", "pkg!App", r"C:\Apps\tool.exe", "0"]);
        let target = ReparsePointResolver::default().decode(&buf).unwrap();
        assert!(target.is_special_link);
        assert_eq!(target.target, r"C:\Apps\tool.exe");
    }

    #[test]
    fn target_longer_than_capacity_is_rejected() {
        let buf = wsl_buffer("/a/rather/long/target/path");
        let err = ReparsePointResolver::with_capacity(8).decode(&buf).unwrap_err();
        assert!(matches!(err, DirError::BufferTooSmall { needed: 26, capacity: 8 }), "{err}");
    }

    #[test]
    fn target_exactly_at_capacity_fits() {
        let buf = wsl_buffer("/abc");
        assert_eq!(ReparsePointResolver::with_capacity(4).decode(&buf).unwrap().target, "/abc");
    }

    #[cfg(unix)]
    #[test]
    fn resolves_unix_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("some/where", &link).unwrap();
        let target = ReparsePointResolver::new().resolve(&link).unwrap();
        assert_eq!(target.target, "some/where");
        assert!(!target.is_special_link);
    }

    #[cfg(unix)]
    #[test]
    fn plain_file_is_not_a_reparse_point() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        let err = ReparsePointResolver::new().resolve(&file).unwrap_err();
        assert!(matches!(err, DirError::NotAReparsePoint { .. }), "{err}");
    }
}
