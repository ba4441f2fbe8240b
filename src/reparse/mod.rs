//! NTFS reparse point decoding and resolution.
//!
//! [`ReparseData::parse`] turns the raw buffer returned by
//! `FSCTL_GET_REPARSE_POINT` into one strongly typed variant per tag, checking
//! every offset and length against the bytes actually returned. Only after
//! that does [`ReparseData::into_target`] pick the string a caller cares about.
//! [`ReparsePointResolver`] glues the OS request and the decoder together.

mod decode;
mod resolver;

pub use decode::{
    IO_REPARSE_TAG_APPEXECLINK, IO_REPARSE_TAG_LX_SYMLINK, IO_REPARSE_TAG_MOUNT_POINT,
    IO_REPARSE_TAG_SYMLINK, ReparseData, Utf16Name, is_microsoft_tag,
};
pub use resolver::{ReparsePointResolver, ReparseTarget};
