//! Console table of trash contents.

use std::io::{self, Write};

use crate::models::TrashEntry;
use crate::VERSION;

const INDEX_WIDTH: usize = 4;
const DATE_WIDTH: usize = 19;
const SEPARATOR: &str = "  ";

/// Writes the version banner and a `#`, `Date`, `File path` table with
/// 1-based indices, in the order given.
pub fn render_listing<W: Write>(out: &mut W, entries: &[TrashEntry]) -> io::Result<()> {
    let index_width = INDEX_WIDTH.max(entries.len().to_string().len());

    writeln!(out, "trash: v{VERSION}")?;
    writeln!(out)?;
    write_row(out, index_width, "#", "Date", "File path")?;
    for (position, entry) in entries.iter().enumerate() {
        write_row(
            out,
            index_width,
            &(position + 1).to_string(),
            &entry.display_deleted_at(),
            &entry.original_path.display().to_string(),
        )?;
    }
    out.flush()
}

fn write_row<W: Write>(
    out: &mut W,
    index_width: usize,
    index: &str,
    date: &str,
    path: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "{index:<index_width$}{SEPARATOR}{date:<DATE_WIDTH$}{SEPARATOR}{path}"
    )
}
