use super::{NativeEntry, is_dot_entry};
use crate::DirError;
use crate::fs::{Attributes, FileTime, MAX_REPARSE_BUFFER, Result, SIZE_UNKNOWN};
use crate::reparse::{ReparsePointResolver, ReparseTarget};
use crate::util::{SEPARATOR, is_root_like};
use core::ptr;
use std::ffi::{OsStr, OsString};
use std::io;
use std::os::windows::ffi::{OsStrExt as _, OsStringExt as _};
use std::path::{Path, PathBuf};
use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_FILES, ERROR_NOT_A_REPARSE_POINT, GetLastError,
    HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAG_BACKUP_SEMANTICS, FILE_FLAG_OPEN_REPARSE_POINT, FILE_READ_ATTRIBUTES,
    FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE, FindClose, FindFirstFileW, FindNextFileW,
    GetDriveTypeW, GetFileAttributesW, INVALID_FILE_ATTRIBUTES, OPEN_EXISTING, WIN32_FIND_DATAW,
};
use windows_sys::Win32::System::Diagnostics::Debug::{
    SEM_FAILCRITICALERRORS, SEM_NOOPENFILEERRORBOX, SetThreadErrorMode,
};
use windows_sys::Win32::System::IO::DeviceIoControl;
use windows_sys::Win32::System::Ioctl::FSCTL_GET_REPARSE_POINT;

// GetDriveTypeW results that mean "nothing mounted there"
const DRIVE_UNKNOWN: u32 = 0;
const DRIVE_NO_ROOT_DIR: u32 = 1;

fn to_wide<S: AsRef<OsStr>>(s: S) -> Vec<u16> {
    s.as_ref().encode_wide().chain(core::iter::once(0)).collect()
}

/// Decodes a NUL terminated UTF-16 name, handing back the raw name when it
/// holds an unpaired surrogate.
fn from_wide(buf: &[u16]) -> core::result::Result<String, OsString> {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    let wide = &buf[..len];
    String::from_utf16(wide).map_err(|_| OsString::from_wide(wide))
}

#[allow(clippy::cast_possible_wrap, reason = "win32 error codes fit in i32")]
fn os_error(code: u32) -> io::Error {
    io::Error::from_raw_os_error(code as i32)
}

fn last_error() -> io::Error {
    io::Error::last_os_error()
}

/**
 Directory stream over `FindFirstFileW`/`FindNextFileW`.

 The pattern is handed to the OS as part of the search path
 (`directory\pattern`), so filtering happens in the kernel.

 `FindNextFileW` failing with anything but `ERROR_NO_MORE_FILES` is a read
 error, not the end of the listing; it is yielded once and the stream stops.
*/
pub(crate) struct NativeDir {
    handle: HANDLE,
    /// The record `FindFirstFileW` already filled in
    pending: Option<Box<WIN32_FIND_DATAW>>,
    exhausted: bool,
    directory: PathBuf,
}

impl NativeDir {
    pub(crate) fn open(directory: &str, pattern: &str) -> Result<Self> {
        let mut search = String::with_capacity(directory.len() + 1 + pattern.len());
        search.push_str(directory);
        if !directory.is_empty() && !is_root_like(directory) {
            search.push(SEPARATOR);
        }
        search.push_str(pattern);

        let wide = to_wide(&search);
        // SAFETY: WIN32_FIND_DATAW is plain data, all-zero is a valid value
        let mut data: Box<WIN32_FIND_DATAW> = Box::new(unsafe { core::mem::zeroed() });
        // SAFETY: wide is NUL terminated and data is writable
        let handle = unsafe { FindFirstFileW(wide.as_ptr(), &mut *data) };
        if handle == INVALID_HANDLE_VALUE {
            // SAFETY: always safe
            let code = unsafe { GetLastError() };
            if code == ERROR_FILE_NOT_FOUND || code == ERROR_NO_MORE_FILES {
                // the directory exists, the pattern matched nothing
                return Ok(Self {
                    handle,
                    pending: None,
                    exhausted: true,
                    directory: PathBuf::from(directory),
                });
            }
            return Err(DirError::from_io(search, os_error(code)));
        }
        Ok(Self {
            handle,
            pending: Some(data),
            exhausted: false,
            directory: PathBuf::from(directory),
        })
    }

    fn fetch(&mut self) -> Option<Result<Box<WIN32_FIND_DATAW>>> {
        if let Some(data) = self.pending.take() {
            return Some(Ok(data));
        }
        if self.exhausted {
            return None;
        }
        // SAFETY: as in open
        let mut data: Box<WIN32_FIND_DATAW> = Box::new(unsafe { core::mem::zeroed() });
        // SAFETY: handle is a live search handle, data is writable
        if unsafe { FindNextFileW(self.handle, &mut *data) } == 0 {
            self.exhausted = true;
            // SAFETY: always safe
            let code = unsafe { GetLastError() };
            return stream_error(code).map(|e| Err(DirError::from_io(&self.directory, e)));
        }
        Some(Ok(data))
    }
}

/// What a failed `FindNextFileW` means, given the error code it left behind.
fn stream_error(code: u32) -> Option<io::Error> {
    (code != ERROR_NO_MORE_FILES).then(|| os_error(code))
}

fn convert(data: &WIN32_FIND_DATAW, file_name: String) -> NativeEntry {
    let attributes = Attributes::from_bits(data.dwFileAttributes);
    let size = if attributes.is_dir() {
        SIZE_UNKNOWN
    } else {
        (u64::from(data.nFileSizeHigh) << 32) | u64::from(data.nFileSizeLow)
    };
    let time = |ft: &windows_sys::Win32::Foundation::FILETIME| {
        FileTime::from_parts(ft.dwLowDateTime, ft.dwHighDateTime)
    };
    NativeEntry {
        file_name,
        attributes,
        creation_time: time(&data.ftCreationTime),
        access_time: time(&data.ftLastAccessTime),
        write_time: time(&data.ftLastWriteTime),
        size,
    }
}

impl Iterator for NativeDir {
    type Item = Result<NativeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let data = match self.fetch()? {
                Ok(data) => data,
                Err(err) => return Some(Err(err)),
            };
            let file_name = match from_wide(&data.cFileName) {
                Ok(name) => name,
                Err(raw) => {
                    let path = self.directory.join(raw);
                    return Some(Err(DirError::NonUnicodeName { path }));
                }
            };
            if is_dot_entry(file_name.as_bytes()) {
                continue;
            }
            return Some(Ok(convert(&data, file_name)));
        }
    }
}

impl Drop for NativeDir {
    fn drop(&mut self) {
        if self.handle != INVALID_HANDLE_VALUE {
            // SAFETY: closing the search handle we own, exactly once
            unsafe { FindClose(self.handle) };
        }
    }
}

/// Restores the thread error mode on drop.
struct ErrorModeGuard(u32);

impl ErrorModeGuard {
    fn suppress_dialogs() -> Self {
        let mut previous = 0;
        // SAFETY: previous is a valid out pointer
        unsafe { SetThreadErrorMode(SEM_FAILCRITICALERRORS | SEM_NOOPENFILEERRORBOX, &mut previous) };
        Self(previous)
    }
}

impl Drop for ErrorModeGuard {
    fn drop(&mut self) {
        // SAFETY: restoring the mode captured in suppress_dialogs
        unsafe { SetThreadErrorMode(self.0, ptr::null_mut()) };
    }
}

/// Asks whether `X:\` is mounted and answering, without letting the OS
/// raise a "no disk in drive" prompt.
pub(crate) fn probe_drive(letter: u8) -> bool {
    let root = to_wide(format!("{}:\\", char::from(letter)));
    let _mode = ErrorModeGuard::suppress_dialogs();
    // SAFETY: root is NUL terminated
    let drive_type = unsafe { GetDriveTypeW(root.as_ptr()) };
    if matches!(drive_type, DRIVE_UNKNOWN | DRIVE_NO_ROOT_DIR) {
        return false;
    }
    // SAFETY: root is NUL terminated
    unsafe { GetFileAttributesW(root.as_ptr()) != INVALID_FILE_ATTRIBUTES }
}

/// Closes a file handle on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: handle came from CreateFileW and is closed once
        unsafe { CloseHandle(self.0) };
    }
}

/// Opens the link itself (not its target), fetches the raw reparse buffer
/// and hands it to the decoder.
pub(crate) fn read_reparse_target(path: &Path, resolver: &ReparsePointResolver) -> Result<ReparseTarget> {
    let wide = to_wide(path.as_os_str());
    // SAFETY: wide is NUL terminated, the remaining arguments are plain flags
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            FILE_READ_ATTRIBUTES,
            FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
            ptr::null(),
            OPEN_EXISTING,
            FILE_FLAG_OPEN_REPARSE_POINT | FILE_FLAG_BACKUP_SEMANTICS,
            ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(DirError::from_io(path, last_error()));
    }
    let handle = OwnedHandle(handle);

    let mut buffer = vec![0u8; MAX_REPARSE_BUFFER];
    let mut returned = 0u32;
    #[allow(clippy::cast_possible_truncation, reason = "buffer is 16 KiB")]
    // SAFETY: buffer is writable for its full length, returned is a valid out pointer
    let ok = unsafe {
        DeviceIoControl(
            handle.0,
            FSCTL_GET_REPARSE_POINT,
            ptr::null(),
            0,
            buffer.as_mut_ptr().cast(),
            buffer.len() as u32,
            &mut returned,
            ptr::null_mut(),
        )
    };
    if ok == 0 {
        let err = last_error();
        #[allow(clippy::cast_possible_wrap, reason = "win32 error codes fit in i32")]
        let not_a_reparse_point = ERROR_NOT_A_REPARSE_POINT as i32;
        if err.raw_os_error() == Some(not_a_reparse_point) {
            return Err(DirError::NotAReparsePoint { path: path.into() });
        }
        return Err(DirError::Io {
            path: path.into(),
            source: io::Error::new(err.kind(), format!("FSCTL_GET_REPARSE_POINT failed: {err}")),
        });
    }
    // never look past what the control request actually wrote
    buffer.truncate(returned as usize);
    resolver.decode(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows_sys::Win32::Foundation::ERROR_NETNAME_DELETED;

    #[test]
    fn no_more_files_is_the_end() {
        assert!(stream_error(ERROR_NO_MORE_FILES).is_none());
    }

    #[test]
    fn other_codes_are_read_failures() {
        let err = stream_error(ERROR_NETNAME_DELETED).unwrap();
        assert_eq!(err.raw_os_error(), Some(ERROR_NETNAME_DELETED as i32));
    }

    #[test]
    fn unpaired_surrogate_keeps_the_raw_name() {
        let name = [u16::from(b'a'), 0xD800, u16::from(b'b'), 0, u16::from(b'z')];
        let raw = from_wide(&name).unwrap_err();
        assert_eq!(raw.encode_wide().collect::<Vec<_>>(), name[..3]);
        assert_eq!(from_wide(&to_wide("ok.txt")).unwrap(), "ok.txt");
    }
}
