use super::{NativeEntry, is_dot_entry};
use crate::DirError;
use crate::fs::{Attributes, FileTime, Result, SIZE_UNKNOWN};
use crate::reparse::{ReparsePointResolver, ReparseTarget};
use crate::util::Wildcard;
use core::ffi::CStr;
use core::mem::MaybeUninit;
use core::ptr::NonNull;
use libc::{AT_SYMLINK_NOFOLLOW, DIR, S_IFDIR, S_IFLNK, S_IFMT, S_IFREG};
use std::ffi::{CString, OsStr};
use std::io;
use std::os::unix::ffi::OsStrExt as _;
use std::path::{Path, PathBuf};

/**
 POSIX directory stream over `opendir`/`readdir`.

 `readdir` has no notion of a pattern, so the wildcard is applied here, with
 the same rules `FindFirstFile` uses. Metadata comes from `fstatat` relative
 to the stream's descriptor without following links; a symlink is reported
 as a reparse point, plus the directory bit if its target is a directory.

 Creation time is the birth time where `stat` carries one (macOS, FreeBSD).
 Linux `stat` has none, and `st_ctime` is the inode change time, so there it
 stays [`FileTime::UNKNOWN`].

 `readdir` returns NULL both at the end and on failure; `errno` is cleared
 before every call so the two can be told apart. After a failure the stream
 yields nothing more.
*/
pub(crate) struct NativeDir {
    dir: NonNull<DIR>,
    fd: i32,
    wildcard: Wildcard,
    directory: PathBuf,
    finished: bool,
}

impl NativeDir {
    pub(crate) fn open(directory: &str, pattern: &str) -> Result<Self> {
        let wildcard = Wildcard::new(pattern)?;
        let c_path = CString::new(directory)
            .map_err(|e| DirError::from_io(directory, io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        // SAFETY: c_path is a valid NUL terminated string
        let raw = unsafe { libc::opendir(c_path.as_ptr()) };
        let dir = NonNull::new(raw).ok_or_else(|| DirError::from_io(directory, io::Error::last_os_error()))?;
        // SAFETY: dir is a live stream from opendir
        let fd = unsafe { libc::dirfd(dir.as_ptr()) };
        Ok(Self {
            dir,
            fd,
            wildcard,
            directory: PathBuf::from(directory),
            finished: false,
        })
    }

    fn stat_at(&self, name: &CStr, flags: i32) -> Option<libc::stat> {
        let mut stat = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fd belongs to the open stream, name is NUL terminated, stat is writable
        let rc = unsafe { libc::fstatat(self.fd, name.as_ptr(), stat.as_mut_ptr(), flags) };
        // SAFETY: fstatat filled the struct on success
        (rc == 0).then(|| unsafe { stat.assume_init() })
    }

    fn build_entry(&self, name: &CStr, file_name: String) -> NativeEntry {
        let Some(stat) = self.stat_at(name, AT_SYMLINK_NOFOLLOW) else {
            // vanished between readdir and stat, report what we know
            return NativeEntry {
                file_name,
                attributes: Attributes::NORMAL,
                creation_time: FileTime::UNKNOWN,
                access_time: FileTime::UNKNOWN,
                write_time: FileTime::UNKNOWN,
                size: SIZE_UNKNOWN,
            };
        };

        let mut attributes = Attributes::default();
        let kind = stat.st_mode & S_IFMT;
        let mut is_dir = kind == S_IFDIR;
        if kind == S_IFLNK {
            attributes |= Attributes::REPARSE_POINT;
            is_dir = self
                .stat_at(name, 0)
                .is_some_and(|target| target.st_mode & S_IFMT == S_IFDIR);
        }
        if is_dir {
            attributes |= Attributes::DIRECTORY;
        } else if kind == S_IFREG {
            attributes |= Attributes::ARCHIVE;
        }
        if file_name.starts_with('.') {
            attributes |= Attributes::HIDDEN;
        }
        if stat.st_mode & 0o222 == 0 {
            attributes |= Attributes::READONLY;
        }
        if attributes == Attributes::default() {
            attributes = Attributes::NORMAL;
        }

        #[allow(clippy::cast_sign_loss, reason = "st_size is never negative for regular files")]
        let size = if is_dir || kind == S_IFLNK {
            if is_dir { SIZE_UNKNOWN } else { 0 }
        } else {
            stat.st_size as u64
        };

        // time_t and c_long differ between targets, hence the casts
        NativeEntry {
            file_name,
            attributes,
            creation_time: birth_time(&stat),
            access_time: FileTime::from_unix(stat.st_atime as i64, stat.st_atime_nsec as i64),
            write_time: FileTime::from_unix(stat.st_mtime as i64, stat.st_mtime_nsec as i64),
            size,
        }
    }
}

impl Iterator for NativeDir {
    type Item = Result<NativeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            // SAFETY: errno is thread local and always writable
            unsafe { *errno_location() = 0 };
            // SAFETY: the stream stays open until drop
            let Some(dirent) = NonNull::new(unsafe { libc::readdir(self.dir.as_ptr()) }) else {
                self.finished = true;
                // SAFETY: as above
                let code = unsafe { *errno_location() };
                return stream_error(code).map(|e| Err(DirError::from_io(&self.directory, e)));
            };
            // SAFETY: readdir returned a valid entry whose d_name is NUL terminated
            let name = unsafe { CStr::from_ptr((*dirent.as_ptr()).d_name.as_ptr()) };
            if is_dot_entry(name.to_bytes()) {
                continue;
            }
            let Ok(file_name) = name.to_str() else {
                if !self.wildcard.is_match(&name.to_string_lossy()) {
                    continue;
                }
                let path = self.directory.join(OsStr::from_bytes(name.to_bytes()));
                return Some(Err(DirError::NonUnicodeName { path }));
            };
            if !self.wildcard.is_match(file_name) {
                continue;
            }
            let file_name = file_name.to_owned();
            return Some(Ok(self.build_entry(name, file_name)));
        }
    }
}

/// What a NULL from `readdir` means, given the `errno` it left behind.
fn stream_error(errno: i32) -> Option<io::Error> {
    (errno != 0).then(|| io::Error::from_raw_os_error(errno))
}

#[cfg(any(target_os = "linux", target_os = "redox", target_os = "emscripten"))]
fn errno_location() -> *mut libc::c_int {
    // SAFETY: always returns the calling thread's errno
    unsafe { libc::__errno_location() }
}

#[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))]
fn errno_location() -> *mut libc::c_int {
    // SAFETY: always returns the calling thread's errno
    unsafe { libc::__errno() }
}

#[cfg(any(target_vendor = "apple", target_os = "freebsd"))]
fn errno_location() -> *mut libc::c_int {
    // SAFETY: always returns the calling thread's errno
    unsafe { libc::__error() }
}

#[cfg(any(target_vendor = "apple", target_os = "freebsd"))]
fn birth_time(stat: &libc::stat) -> FileTime {
    FileTime::from_unix(stat.st_birthtime as i64, stat.st_birthtime_nsec as i64)
}

#[cfg(not(any(target_vendor = "apple", target_os = "freebsd")))]
const fn birth_time(_stat: &libc::stat) -> FileTime {
    FileTime::UNKNOWN
}

impl Drop for NativeDir {
    fn drop(&mut self) {
        // SAFETY: closing the stream we opened, exactly once
        unsafe { libc::closedir(self.dir.as_ptr()) };
    }
}

/// POSIX has no drive letters, so no drive is ever ready.
pub(crate) fn probe_drive(_letter: u8) -> bool {
    false
}

/// Reads a symlink. POSIX has only the classic kind, so the result is never special.
pub(crate) fn read_reparse_target(path: &Path, resolver: &ReparsePointResolver) -> Result<ReparseTarget> {
    let target = std::fs::read_link(path).map_err(|e| {
        if e.raw_os_error() == Some(libc::EINVAL) {
            DirError::NotAReparsePoint { path: path.into() }
        } else {
            DirError::from_io(path, e)
        }
    })?;
    let target = target.to_string_lossy().into_owned();
    resolver.bounded(target, false)
}
