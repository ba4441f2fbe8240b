use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// 100ns intervals between 1601-01-01 and 1970-01-01.
const EPOCH_DIFFERENCE_TICKS: u64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: u64 = 10_000_000;

/**
 An opaque OS timestamp.

 Stored as a Windows `FILETIME` tick count (100ns intervals since
 1601-01-01 UTC) on every platform so entries compare the same way
 regardless of which backend produced them. `0` means "not available".
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FileTime(u64);

impl FileTime {
    pub const UNKNOWN: Self = Self(0);

    #[must_use]
    #[inline]
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Builds a timestamp from the two halves of a Win32 `FILETIME`.
    #[must_use]
    #[inline]
    pub const fn from_parts(low: u32, high: u32) -> Self {
        Self(((high as u64) << 32) | low as u64)
    }

    /// Builds a timestamp from POSIX seconds + nanoseconds.
    ///
    /// Times before 1601 collapse to [`FileTime::UNKNOWN`].
    #[must_use]
    #[allow(clippy::cast_sign_loss, reason = "range checked before the cast")]
    pub const fn from_unix(secs: i64, nanos: i64) -> Self {
        let secs_ticks = match (secs as i128).checked_mul(TICKS_PER_SECOND as i128) {
            Some(t) => t,
            None => return Self::UNKNOWN,
        };
        let total = secs_ticks + (nanos as i128) / 100 + EPOCH_DIFFERENCE_TICKS as i128;
        if total <= 0 || total > u64::MAX as i128 {
            Self::UNKNOWN
        } else {
            Self(total as u64)
        }
    }

    #[must_use]
    #[inline]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    #[must_use]
    #[inline]
    pub const fn is_known(self) -> bool {
        self.0 != 0
    }

    /// Converts to a UTC calendar time, `None` for unknown or pre-1970 stamps.
    #[must_use]
    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation,
        reason = "bounded by u64 tick range"
    )]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let since_epoch = self.0.checked_sub(EPOCH_DIFFERENCE_TICKS)?;
        let secs = (since_epoch / TICKS_PER_SECOND) as i64;
        let nanos = ((since_epoch % TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(secs, nanos)
    }

    /// Converts to a [`SystemTime`], `None` for unknown or pre-1970 stamps.
    #[must_use]
    pub fn to_system_time(self) -> Option<SystemTime> {
        let since_epoch = self.0.checked_sub(EPOCH_DIFFERENCE_TICKS)?;
        let secs = since_epoch / TICKS_PER_SECOND;
        let nanos = (since_epoch % TICKS_PER_SECOND) * 100;
        UNIX_EPOCH.checked_add(core::time::Duration::new(secs, u32::try_from(nanos).ok()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch_maps_to_known_tick_count() {
        let t = FileTime::from_unix(0, 0);
        assert_eq!(t.ticks(), EPOCH_DIFFERENCE_TICKS);
        assert_eq!(t.to_datetime().map(|d| d.timestamp()), Some(0));
    }

    #[test]
    fn parts_are_combined_high_then_low() {
        let t = FileTime::from_parts(0x89AB_CDEF, 0x0123_4567);
        assert_eq!(t.ticks(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn system_time_round_trips_through_ticks() {
        let t = FileTime::from_unix(1_700_000_000, 500);
        let since_epoch = t.to_system_time().unwrap().duration_since(UNIX_EPOCH).unwrap();
        assert_eq!(since_epoch, core::time::Duration::new(1_700_000_000, 500));
        assert!(FileTime::UNKNOWN.to_system_time().is_none());
    }

    #[test]
    fn unknown_has_no_calendar_time() {
        assert!(!FileTime::UNKNOWN.is_known());
        assert!(FileTime::UNKNOWN.to_datetime().is_none());
        assert!(FileTime::from_unix(-20_000_000_000, 0).to_datetime().is_none());
    }

    #[test]
    fn sub_second_precision_survives() {
        let t = FileTime::from_unix(1_700_000_000, 123_456_700);
        let dt = t.to_datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_nanos(), 123_456_700);
    }
}
