//! Plain-text output for terminals.

use std::io::{self, Write};

use crate::duplicates::{EquivalenceClass, ResultTable};

/// Write a table as `hash  path` lines, with a blank line between keys.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table_text<W: Write>(table: &ResultTable, writer: &mut W) -> io::Result<()> {
    let mut previous = None;
    for row in table {
        if previous.is_some_and(|key| key != row.key) {
            writeln!(writer)?;
        }
        writeln!(writer, "{}  {}", row.key, row.path.display())?;
        previous = Some(row.key);
    }
    Ok(())
}

/// Write equivalence classes, representative first.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_classes<W: Write>(classes: &[EquivalenceClass], writer: &mut W) -> io::Result<()> {
    for (idx, class) in classes.iter().enumerate() {
        if idx > 0 {
            writeln!(writer)?;
        }
        writeln!(
            writer,
            "Group {} ({} files, {} each, hash {})",
            idx + 1,
            class.len(),
            bytesize::ByteSize(class.size),
            &class.digest_hex()[..16]
        )?;
        for (member, file) in class.files.iter().enumerate() {
            let marker = if member == 0 { "keep" } else { "dup " };
            writeln!(writer, "  [{}] {}", marker, file.path.display())?;
        }
    }
    Ok(())
}
