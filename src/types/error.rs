//! Error types for the CSV list-view exporter
//!
//! This module defines all error types that can occur while configuring
//! column serializers and writing CSV output.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: missing columns, empty paths, underivable headers.
//!   Raised eagerly when a serializer is built, never during row iteration.
//! - **Attribute Resolution Errors**: a dotted path hit a missing attribute on a record
//! - **Output Errors**: I/O failures on the sink, CSV encoder failures, invalid UTF-8

use std::string::FromUtf8Error;
use thiserror::Error;

/// Main error type for CSV exports
///
/// Each variant carries enough context to point at the offending column
/// or sink. None of them are recovered internally: a failure mid-export
/// aborts the whole export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// The column configuration is unusable
    ///
    /// This is a programmer error surfaced to the integrating application.
    #[error("Improperly configured: {message}")]
    Configuration {
        /// Description of what is misconfigured
        message: String,
    },

    /// A dotted column path referenced an attribute the record does not have
    ///
    /// Exports run against homogeneous record collections, so this indicates
    /// a defect in the column configuration and is never skipped.
    #[error("Cannot resolve attribute '{segment}' of column path '{path}'")]
    AttributeResolution {
        /// The full column path being resolved
        path: String,
        /// The path segment that could not be looked up
        segment: String,
    },

    /// I/O error occurred while writing to the sink
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// The CSV encoder rejected a row
    #[error("CSV write error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    WriteError {
        /// Output line where the error occurred (if available)
        line: Option<u64>,
        /// Description of the encoder error
        message: String,
    },

    /// Buffered output could not be decoded as UTF-8
    #[error("Encoding error: {message}")]
    EncodingError {
        /// Description of the decoding failure
        message: String,
    },
}

// Conversion from io::Error to ExportError
impl From<std::io::Error> for ExportError {
    fn from(error: std::io::Error) -> Self {
        ExportError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to ExportError
impl From<csv::Error> for ExportError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ExportError::WriteError {
            line,
            message: error.to_string(),
        }
    }
}

// Conversion from csv_async::Error to ExportError
impl From<csv_async::Error> for ExportError {
    fn from(error: csv_async::Error) -> Self {
        ExportError::WriteError {
            line: None,
            message: error.to_string(),
        }
    }
}

impl From<FromUtf8Error> for ExportError {
    fn from(error: FromUtf8Error) -> Self {
        ExportError::EncodingError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ExportError {
    /// Create a Configuration error
    pub fn configuration(message: &str) -> Self {
        ExportError::Configuration {
            message: message.to_string(),
        }
    }

    /// Columns were never set on a view
    pub fn missing_columns() -> Self {
        Self::configuration("Please set the columns.")
    }

    /// A serializer was asked to emit headers for an empty column list
    pub fn no_columns() -> Self {
        Self::configuration("at least one column is required when headers are output")
    }

    /// A path column was declared with an empty path or an empty segment
    pub fn invalid_path(column: usize, path: &str) -> Self {
        ExportError::Configuration {
            message: format!("column {} has an invalid attribute path '{}'", column, path),
        }
    }

    /// No header could be derived for a column while headers are requested
    pub fn missing_label(column: usize) -> Self {
        ExportError::Configuration {
            message: format!(
                "column {}: column header cannot be derived for a callable accessor without an explicit label",
                column
            ),
        }
    }

    /// Create an AttributeResolution error
    pub fn attribute_resolution(path: &str, segment: &str) -> Self {
        ExportError::AttributeResolution {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    /// Whether this error stems from the column configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, ExportError::Configuration { .. })
    }
}
