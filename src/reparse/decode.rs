use crate::DirError;
use crate::fs::Result;
use core::fmt;

/// Directory junction / volume mount point.
pub const IO_REPARSE_TAG_MOUNT_POINT: u32 = 0xA000_0003;
/// Classic NTFS symbolic link.
pub const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;
/// Symlink created from inside WSL.
pub const IO_REPARSE_TAG_LX_SYMLINK: u32 = 0xA000_001D;
/// AppX application execution alias (the `WindowsApps` stubs).
pub const IO_REPARSE_TAG_APPEXECLINK: u32 = 0x8000_001B;

/// Tag (4) + data length (2) + reserved (2).
const HEADER_LEN: usize = 8;
/// Four u16 name offsets/lengths.
const NAME_FIELDS_LEN: usize = 8;
/// Symlinks carry a u32 flags word after the name fields.
const SYMLINK_FLAGS_LEN: usize = 4;
const SYMLINK_FLAG_RELATIVE: u32 = 0x0000_0001;
/// Native NT namespace prefix on substitute names.
const NT_PREFIX: &str = r"\??\";

/// Set on every tag Microsoft owns.
#[inline]
#[must_use]
pub const fn is_microsoft_tag(tag: u32) -> bool {
    tag & 0x8000_0000 != 0
}

/**
 A validated UTF-16LE string inside a reparse buffer.

 Only constructed once its bounds have been checked against the buffer and
 its byte length found to be even, so decoding it cannot go out of range.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Utf16Name<'buf>(&'buf [u8]);

impl<'buf> Utf16Name<'buf> {
    fn new(bytes: &'buf [u8], tag: u32, what: &str) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(DirError::decode(tag, format!("{what} has odd byte length {}", bytes.len())));
        }
        Ok(Self(bytes))
    }

    /// Length in UTF-16 code units.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len() / 2
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn units(self) -> impl Iterator<Item = u16> + 'buf {
        self.0.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Transcodes to UTF-8, replacing unpaired surrogates.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.units())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl fmt::Debug for Utf16Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

/// The payload of a reparse buffer, one variant per supported tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReparseData<'buf> {
    SymbolicLink {
        substitute_name: Utf16Name<'buf>,
        print_name: Utf16Name<'buf>,
        relative: bool,
    },
    MountPoint {
        substitute_name: Utf16Name<'buf>,
        print_name: Utf16Name<'buf>,
    },
    /// The target is a narrow (UTF-8) string, not UTF-16.
    WslSymlink { version: u32, target: &'buf [u8] },
    AppExecLink {
        package_id: Utf16Name<'buf>,
        entry_point: Utf16Name<'buf>,
        executable: Utf16Name<'buf>,
        application_type: Option<Utf16Name<'buf>>,
    },
}

/// Bounds-checked little-endian reads over the payload.
struct Reader<'buf> {
    bytes: &'buf [u8],
    tag: u32,
}

impl<'buf> Reader<'buf> {
    fn slice(&self, start: usize, len: usize, what: &str) -> Result<&'buf [u8]> {
        start
            .checked_add(len)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| {
                DirError::decode(
                    self.tag,
                    format!(
                        "{what} at {start}+{len} runs past the {}-byte payload",
                        self.bytes.len()
                    ),
                )
            })
    }

    fn u16_at(&self, offset: usize, what: &str) -> Result<u16> {
        let b = self.slice(offset, 2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_at(&self, offset: usize, what: &str) -> Result<u32> {
        let b = self.slice(offset, 4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Substitute and print name pairs shared by symlinks and mount points.
    /// Offsets and lengths are in bytes, relative to `path_buffer`.
    fn names(&self, path_buffer_start: usize) -> Result<(Utf16Name<'buf>, Utf16Name<'buf>)> {
        let sub_offset = usize::from(self.u16_at(0, "substitute name offset")?);
        let sub_len = usize::from(self.u16_at(2, "substitute name length")?);
        let print_offset = usize::from(self.u16_at(4, "print name offset")?);
        let print_len = usize::from(self.u16_at(6, "print name length")?);

        let path_buffer = Reader {
            bytes: self.bytes.get(path_buffer_start..).unwrap_or_default(),
            tag: self.tag,
        };
        let substitute = path_buffer.slice(sub_offset, sub_len, "substitute name")?;
        let print = path_buffer.slice(print_offset, print_len, "print name")?;
        Ok((
            Utf16Name::new(substitute, self.tag, "substitute name")?,
            Utf16Name::new(print, self.tag, "print name")?,
        ))
    }
}

impl<'buf> ReparseData<'buf> {
    /**
    Decodes a raw `REPARSE_DATA_BUFFER`.

    `buffer` must be exactly what the control request returned; nothing past
    its end is ever read.

    # Errors
    [`DirError::ReparseDecode`] for non-Microsoft or unsupported tags, and for
    any declared offset or length that does not fit inside `buffer`.
    */
    pub fn parse(buffer: &'buf [u8]) -> Result<Self> {
        let tag = match buffer.get(..4) {
            Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            None => return Err(DirError::decode(0, "buffer too short to hold a tag")),
        };
        let header = Reader { bytes: buffer, tag };
        let data_len = usize::from(header.u16_at(4, "data length")?);
        let payload = header.slice(HEADER_LEN, data_len, "reparse data")?;

        if !is_microsoft_tag(tag) {
            return Err(DirError::decode(tag, "not a Microsoft tag"));
        }

        let reader = Reader { bytes: payload, tag };
        match tag {
            IO_REPARSE_TAG_SYMLINK => {
                let flags = reader.u32_at(NAME_FIELDS_LEN, "symlink flags")?;
                let (substitute_name, print_name) = reader.names(NAME_FIELDS_LEN + SYMLINK_FLAGS_LEN)?;
                Ok(Self::SymbolicLink {
                    substitute_name,
                    print_name,
                    relative: flags & SYMLINK_FLAG_RELATIVE != 0,
                })
            }
            IO_REPARSE_TAG_MOUNT_POINT => {
                let (substitute_name, print_name) = reader.names(NAME_FIELDS_LEN)?;
                Ok(Self::MountPoint {
                    substitute_name,
                    print_name,
                })
            }
            IO_REPARSE_TAG_LX_SYMLINK => {
                let version = reader.u32_at(0, "WSL link version")?;
                let target = reader.slice(4, payload.len().saturating_sub(4), "WSL link target")?;
                Ok(Self::WslSymlink { version, target })
            }
            IO_REPARSE_TAG_APPEXECLINK => Self::parse_app_exec_link(&reader),
            other => Err(DirError::decode(other, "unsupported reparse tag")),
        }
    }

    /// Walks the NUL-terminated UTF-16 strings after the string count. Each one
    /// is variable length so the only way to find the third is to walk the first two.
    fn parse_app_exec_link(reader: &Reader<'buf>) -> Result<Self> {
        let tag = reader.tag;
        let count = reader.u32_at(0, "AppX string count")?;
        let mut strings = [None; 4];
        let mut cursor = 4;
        for (index, slot) in strings.iter_mut().enumerate() {
            if cursor >= reader.bytes.len() {
                break;
            }
            let rest = reader.slice(cursor, reader.bytes.len() - cursor, "AppX string list")?;
            let units = rest.len() / 2;
            let Some(nul) = (0..units).find(|&i| rest[2 * i] == 0 && rest[2 * i + 1] == 0) else {
                return Err(DirError::decode(tag, format!("AppX string {index} is not NUL terminated")));
            };
            *slot = Some(Utf16Name::new(&rest[..2 * nul], tag, "AppX string")?);
            cursor += 2 * nul + 2;
        }

        match strings {
            [Some(package_id), Some(entry_point), Some(executable), application_type] => Ok(Self::AppExecLink {
                package_id,
                entry_point,
                executable,
                application_type,
            }),
            _ => Err(DirError::decode(
                tag,
                format!("AppX link holds fewer than 3 strings (declared {count})"),
            )),
        }
    }

    /// The tag this payload was decoded from.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Self::SymbolicLink { .. } => IO_REPARSE_TAG_SYMLINK,
            Self::MountPoint { .. } => IO_REPARSE_TAG_MOUNT_POINT,
            Self::WslSymlink { .. } => IO_REPARSE_TAG_LX_SYMLINK,
            Self::AppExecLink { .. } => IO_REPARSE_TAG_APPEXECLINK,
        }
    }

    /// WSL and AppX links are "special"; classic symlinks and junctions are not.
    #[must_use]
    pub const fn is_special_link(&self) -> bool {
        matches!(self, Self::WslSymlink { .. } | Self::AppExecLink { .. })
    }

    /**
    The logical target: the print name for symlinks and junctions (falling back
    to the substitute name without its `\??\` prefix when the print name is
    empty), the narrow path for WSL links, the executable for AppX aliases.
    */
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::SymbolicLink {
                substitute_name,
                print_name,
                ..
            }
            | Self::MountPoint {
                substitute_name,
                print_name,
            } => {
                if print_name.is_empty() {
                    let substitute = substitute_name.to_string_lossy();
                    match substitute.strip_prefix(NT_PREFIX) {
                        Some(stripped) => stripped.to_owned(),
                        None => substitute,
                    }
                } else {
                    print_name.to_string_lossy()
                }
            }
            Self::WslSymlink { target, .. } => {
                let end = target.iter().position(|&b| b == 0).unwrap_or(target.len());
                String::from_utf8_lossy(&target[..end]).into_owned()
            }
            Self::AppExecLink { executable, .. } => executable.to_string_lossy(),
        }
    }
}
