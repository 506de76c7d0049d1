//! CSV dialect used for every export
//!
//! This module centralizes all CSV format concerns:
//! - comma delimiter, `"` quote character
//! - fields quoted only when necessary (delimiter, quote or line break inside)
//! - embedded quotes doubled
//! - CRLF record terminator
//!
//! Text is always written as UTF-8 bytes, independent of any platform codec.

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::io::Write;

/// Field delimiter
pub const DELIMITER: u8 = b',';

/// Quote character
pub const QUOTE: u8 = b'"';

/// Record terminator written after every row
pub const LINE_TERMINATOR: &str = "\r\n";

/// Create a CSV writer over `sink` using the export dialect
///
/// Headers are written explicitly by the caller, never inferred.
pub fn csv_writer<W: Write>(sink: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .double_quote(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .has_headers(false)
        .from_writer(sink)
}
