//! I/O module
//!
//! Handles CSV encoding and output.
//!
//! # Components
//!
//! - `csv_format` - The export dialect (delimiter, quoting, CRLF) for sync sinks
//! - `async_writer` - Row writer over tokio `AsyncWrite` sinks with the same dialect

pub mod async_writer;
pub mod csv_format;

pub use async_writer::AsyncRowWriter;
pub use csv_format::{csv_writer, DELIMITER, LINE_TERMINATOR, QUOTE};
