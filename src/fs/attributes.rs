use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/**
 Attribute bits of a directory entry.

 The bit values are the `FILE_ATTRIBUTE_*` constants of the Win32 API, so on
 Windows the word returned by the OS is stored untouched. The POSIX backend
 synthesises the same bits from `st_mode` (symlinks become reparse points).

 ```
 use dirscan::fs::Attributes;

 let attrs = Attributes::DIRECTORY | Attributes::REPARSE_POINT;
 assert!(attrs.is_dir());
 assert!(attrs.is_reparse_point());
 assert!(!attrs.is_hidden());
 ```
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Attributes(u32);

impl Attributes {
    pub const READONLY: Self = Self(0x0000_0001);
    pub const HIDDEN: Self = Self(0x0000_0002);
    pub const SYSTEM: Self = Self(0x0000_0004);
    pub const DIRECTORY: Self = Self(0x0000_0010);
    pub const ARCHIVE: Self = Self(0x0000_0020);
    pub const DEVICE: Self = Self(0x0000_0040);
    pub const NORMAL: Self = Self(0x0000_0080);
    pub const REPARSE_POINT: Self = Self(0x0000_0400);

    /// Wraps a raw attribute word as returned by the OS.
    #[must_use]
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    #[inline]
    pub const fn is_dir(self) -> bool {
        self.contains(Self::DIRECTORY)
    }

    /// Junctions, symlinks and the vendor "special" links all carry this bit.
    #[must_use]
    #[inline]
    pub const fn is_reparse_point(self) -> bool {
        self.contains(Self::REPARSE_POINT)
    }

    #[must_use]
    #[inline]
    pub const fn is_hidden(self) -> bool {
        self.contains(Self::HIDDEN)
    }

    #[must_use]
    #[inline]
    pub const fn is_readonly(self) -> bool {
        self.contains(Self::READONLY)
    }
}

impl BitOr for Attributes {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Attributes {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attributes({self})")
    }
}

/// Renders the attributes `attrib.exe` style, e.g. `d-h-l`.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}{}{}",
            flag(self.is_dir(), 'd'),
            flag(self.is_readonly(), 'r'),
            flag(self.is_hidden(), 'h'),
            flag(self.contains(Self::SYSTEM), 's'),
            flag(self.is_reparse_point(), 'l'),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_set_bits() {
        let attrs = Attributes::DIRECTORY | Attributes::HIDDEN | Attributes::REPARSE_POINT;
        assert_eq!(attrs.to_string(), "d-h-l");
        assert_eq!(Attributes::NORMAL.to_string(), "-----");
    }

    #[test]
    fn raw_bits_round_trip() {
        let raw = 0x0000_0410;
        let attrs = Attributes::from_bits(raw);
        assert_eq!(attrs.bits(), raw);
        assert!(attrs.is_dir() && attrs.is_reparse_point());
    }
}
