//! CSV download response
//!
//! A framework-neutral stand-in for an HTTP response carrying a CSV
//! attachment. The body implements `io::Write` so it can be handed straight
//! to [`ColumnSerializer::serialize_into`](crate::core::ColumnSerializer::serialize_into).

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::io::{self, Write};

/// Default content type of CSV downloads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Encode a header value for transport
///
/// ASCII values are returned unchanged. Anything else becomes a single
/// RFC 2047 base64 encoded-word (`=?utf-8?b?...?=`).
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?b?{}?=", BASE64_STANDARD.encode(value))
    }
}

/// `Content-Disposition` value marking `filename` as an attachment
pub fn content_disposition(filename: &str) -> String {
    encode_header(&format!("attachment; filename=\"{}\"", filename))
}

/// Buffered CSV attachment
#[derive(Debug, Clone, PartialEq)]
pub struct CsvResponse {
    content_type: String,
    filename: String,
    content_disposition: String,
    body: Vec<u8>,
}

impl CsvResponse {
    /// Empty `text/csv` attachment named `filename`
    pub fn new(filename: &str) -> Self {
        Self::with_content_type(filename, CSV_CONTENT_TYPE)
    }

    pub fn with_content_type(filename: &str, content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            filename: filename.to_string(),
            content_disposition: content_disposition(filename),
            body: Vec::new(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_disposition(&self) -> &str {
        &self.content_disposition
    }

    /// Response headers, in the order they should be sent
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.content_type.clone()),
            ("Content-Disposition", self.content_disposition.clone()),
        ]
    }

    /// Body bytes written so far
    pub fn content(&self) -> &[u8] {
        &self.body
    }

    pub fn into_content(self) -> Vec<u8> {
        self.body
    }
}

impl Write for CsvResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
