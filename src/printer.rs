use dirscan::{DirEntry, TraversalError};
use std::io::{self, BufWriter, Write, stdout};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DIR_MARKER: &str = "<DIR>";

/// How each line is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Just the path
    Short,
    /// Attributes, size, write time, path and link target
    Long,
}

/// Writes one line per entry to stdout, buffered.
pub fn write_entries<'a, I>(entries: I, layout: Layout) -> io::Result<()>
where
    I: IntoIterator<Item = &'a DirEntry>,
{
    let mut writer = BufWriter::new(stdout().lock());
    for entry in entries {
        match layout {
            Layout::Short => writeln!(writer, "{}", entry.name())?,
            Layout::Long => write_long(&mut writer, entry)?,
        }
    }
    writer.flush()
}

fn write_long<W: Write>(writer: &mut W, entry: &DirEntry) -> io::Result<()> {
    let size = entry
        .size()
        .filter(|_| !entry.is_dir())
        .map_or_else(|| DIR_MARKER.to_owned(), |bytes| bytes.to_string());
    let written = entry
        .write_time()
        .to_datetime()
        .map_or_else(|| "-".repeat(16), |time| time.format(TIME_FORMAT).to_string());

    write!(writer, "{} {size:>14} {written} {}", entry.attributes(), entry.name())?;
    if let Some(link) = entry.link() {
        write!(writer, " -> {link}")?;
        if entry.is_special_link() {
            writer.write_all(b" [special]")?;
        }
    }
    writer.write_all(b"\n")
}

/// Errors go to stderr, after the listing.
pub fn write_errors(errors: &[TraversalError]) {
    for error in errors {
        eprintln!("dirscan: {error}");
    }
}
