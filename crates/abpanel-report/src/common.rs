use std::io::Write;

use csv::{Terminator, Writer, WriterBuilder};

/// Comma-delimited, `\n`-terminated writer used by every export.
pub(crate) fn csv_writer<W: Write>(writer: W) -> Writer<W> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Plain numbers keep one decimal place at minimum: `2` renders as `2.0`.
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}
