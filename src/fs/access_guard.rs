use crate::DirError;
use crate::fs::Result;
use core::fmt;
use core::time::Duration;
use dashmap::DashMap;
use std::path::Path;

/// How long a drive gets to answer before it is declared not ready.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/**
 Answers "is this drive mounted and ready?" for one drive letter.

 Implementations must not block indefinitely and must not let the OS raise
 interactive "insert a disk" style prompts.
*/
pub trait DriveProbe: Send + Sync {
    /// `letter` is an ASCII uppercase drive letter.
    fn is_ready(&self, letter: u8) -> bool;
}

/// The OS-backed probe.
///
/// Runs the native check on a helper thread and gives up after `timeout`,
/// so a stalled network drive cannot hang the caller.
#[derive(Debug, Clone, Copy)]
pub struct NativeProbe {
    timeout: Duration,
}

impl NativeProbe {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for NativeProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl DriveProbe for NativeProbe {
    fn is_ready(&self, letter: u8) -> bool {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let spawned = std::thread::Builder::new()
            .name(format!("probe-{}", char::from(letter)))
            .spawn(move || {
                // the receiver may be gone after a timeout, nothing to do then
                let _ = sender.send(crate::sys::probe_drive(letter));
            });
        if let Err(e) = spawned {
            tracing::warn!(drive = %char::from(letter), error = %e, "could not spawn drive probe");
            return false;
        }
        match receiver.recv_timeout(self.timeout) {
            Ok(ready) => ready,
            Err(_) => {
                tracing::warn!(
                    drive = %char::from(letter),
                    timeout_ms = self.timeout.as_millis(),
                    "drive probe timed out, treating drive as not ready"
                );
                false
            }
        }
    }
}

/**
 Decides whether a path may be touched at all.

 Paths that start with a drive letter are only safe once the drive has been
 probed and found ready. The answer is cached per letter for the lifetime of
 the guard; a drive's readiness is assumed not to change once checked. Paths
 without a drive letter are always safe.

 ```
 use dirscan::fs::{DriveProbe, SafeAccessGuard};

 struct OnlyC;
 impl DriveProbe for OnlyC {
     fn is_ready(&self, letter: u8) -> bool { letter == b'C' }
 }

 let guard = SafeAccessGuard::with_probe(OnlyC);
 assert!(guard.is_safe("c:\\Windows"));
 assert!(!guard.is_safe("Q:\\backup"));
 assert!(guard.is_safe("relative/path"));
 ```
*/
pub struct SafeAccessGuard {
    cache: DashMap<u8, bool>,
    probe: Box<dyn DriveProbe>,
}

impl SafeAccessGuard {
    /// A guard using the native probe with [`DEFAULT_PROBE_TIMEOUT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(NativeProbe::default())
    }

    /// A guard using the native probe with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_probe(NativeProbe::new(timeout))
    }

    #[must_use]
    pub fn with_probe<P: DriveProbe + 'static>(probe: P) -> Self {
        Self {
            cache: DashMap::new(),
            probe: Box::new(probe),
        }
    }

    /// `true` unless `path` names a drive that is not ready.
    #[must_use]
    pub fn is_safe(&self, path: &str) -> bool {
        drive_letter(path).is_none_or(|letter| self.is_drive_ready(letter))
    }

    /// Readiness of one drive letter, probing on first use.
    #[must_use]
    pub fn is_drive_ready(&self, letter: char) -> bool {
        if !letter.is_ascii_alphabetic() {
            return false;
        }
        let key = letter.to_ascii_uppercase() as u8;
        if let Some(ready) = self.cache.get(&key) {
            return *ready;
        }
        // probe without holding the shard lock, a slow drive must not block lookups of others
        let ready = self.probe.is_ready(key);
        tracing::debug!(drive = %char::from(key), ready, "probed drive");
        *self.cache.entry(key).or_insert(ready)
    }

    /**
    Fails with [`DirError::UnsafeAccess`] if `path` is on a drive that is not ready.

    # Errors
    [`DirError::UnsafeAccess`] as described.
    */
    pub fn check(&self, path: &str) -> Result<()> {
        if self.is_safe(path) {
            Ok(())
        } else {
            Err(DirError::UnsafeAccess { path: path.into() })
        }
    }

    /// `stat()`s `path` and reports whether it is a directory, but only after
    /// the guard agrees. UNC paths are never touched.
    #[must_use]
    pub fn is_existing_dir(&self, path: &str) -> bool {
        !is_unc(path) && self.is_safe(path) && Path::new(path).is_dir()
    }

    /// Number of drives probed so far.
    #[must_use]
    pub fn cached_drives(&self) -> usize {
        self.cache.len()
    }
}

impl Default for SafeAccessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SafeAccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeAccessGuard")
            .field("cached_drives", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// The drive letter of a `x:...` path.
#[must_use]
pub fn drive_letter(path: &str) -> Option<char> {
    match path.as_bytes() {
        [letter, b':', ..] if letter.is_ascii_alphabetic() => Some(char::from(*letter)),
        _ => None,
    }
}

/// `\\server\share` (either slash direction).
#[must_use]
pub fn is_unc(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && matches!(bytes[0], b'\\' | b'/') && matches!(bytes[1], b'\\' | b'/')
}
