//! Asynchronous CSV row writer
//!
//! Writes rows to a tokio `AsyncWrite` sink (a network response body, a
//! file) with the same dialect as [`csv_writer`](super::csv_format::csv_writer).
//!
//! # Design
//!
//! The AsyncRowWriter uses:
//! - csv-async for encoding, so quoting and escaping match the sync writer
//! - tokio-util's compat layer to bridge tokio's `AsyncWrite` to the
//!   futures-io trait csv-async is built on
//!
//! ```text
//! rows → AsyncRowWriter → csv_async::AsyncWriter → Compat<W> → W (tokio sink)
//! ```

use super::csv_format::{DELIMITER, QUOTE};
use crate::types::ExportError;
use csv_async::{AsyncWriter, AsyncWriterBuilder, Terminator};
use log::debug;
use tokio::io::AsyncWrite;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Asynchronous CSV row writer
///
/// The sink is borrowed for the writer's lifetime and flushed by
/// [`finish`](Self::finish) or [`abort`](Self::abort); it is never shut down.
///
/// Always end a writer with one of those two. csv-async flushes leftover
/// rows on drop by blocking the current thread, which never completes when
/// the sink is driven by the same runtime.
pub struct AsyncRowWriter<W: AsyncWrite + Unpin + Send> {
    writer: AsyncWriter<Compat<W>>,
}

impl<W: AsyncWrite + Unpin + Send> AsyncRowWriter<W> {
    /// Wrap a tokio sink with the export dialect
    pub fn new(sink: W) -> Self {
        let writer = AsyncWriterBuilder::new()
            .delimiter(DELIMITER)
            .quote(QUOTE)
            .terminator(Terminator::CRLF)
            .create_writer(sink.compat_write());

        Self { writer }
    }

    /// Encode and write one row
    pub async fn write_row(&mut self, fields: &[String]) -> Result<(), ExportError> {
        self.writer.write_record(fields).await?;
        Ok(())
    }

    /// Flush buffered rows through to the sink
    pub async fn finish(mut self) -> Result<(), ExportError> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Flush buffered rows after a failed export
    ///
    /// A flush error is logged and discarded; the caller already holds the
    /// error that ended the export.
    pub async fn abort(mut self) {
        if let Err(error) = self.writer.flush().await {
            debug!("Discarding flush error after failed export: {}", error);
        }
    }
}
