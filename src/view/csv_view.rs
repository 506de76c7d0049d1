//! List view rendering records as a CSV download
//!
//! A `CsvView` holds the declarative column list and the download settings.
//! Each render builds a fresh [`ColumnSerializer`] through the view's shared
//! [`AccessorCache`], so concurrent requests against one view resolve every
//! column spec once.

use super::response::{content_disposition, CsvResponse, CSV_CONTENT_TYPE};
use crate::core::{AccessorCache, ColumnSerializer, ColumnSpec, SerializerConfig};
use crate::types::{ExportError, Record};
use futures::stream::Stream;
use log::debug;
use serde::Deserialize;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncWrite;

/// Placeholder substituted with the model name in filename templates
pub const MODEL_NAME_PLACEHOLDER: &str = "{model_name}";

/// Download settings of a view
///
/// Every field has a default, so partial settings deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Filename template; `{model_name}` is replaced by the record type's name
    pub filename: String,
    /// Emit a header row
    pub output_headers: bool,
    /// Response content type
    pub content_type: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            filename: format!("{}_list.csv", MODEL_NAME_PLACEHOLDER),
            output_headers: true,
            content_type: CSV_CONTENT_TYPE.to_string(),
        }
    }
}

/// CSV list view over records of type `R`
pub struct CsvView<R: ?Sized> {
    columns: Option<Vec<ColumnSpec<R>>>,
    settings: ViewSettings,
    cache: Arc<AccessorCache<R>>,
}

impl<R: Record + ?Sized + 'static> CsvView<R> {
    /// View with no columns set and default settings
    pub fn new() -> Self {
        Self {
            columns: None,
            settings: ViewSettings::default(),
            cache: Arc::new(AccessorCache::new()),
        }
    }

    /// Set the columns rendered by this view
    pub fn with_columns(mut self, columns: Vec<ColumnSpec<R>>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Replace all download settings at once
    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enable or disable the header row
    pub fn with_output_headers(mut self, output_headers: bool) -> Self {
        self.settings.output_headers = output_headers;
        self
    }

    /// Set the filename template; `{model_name}` is substituted on render
    pub fn with_filename(mut self, filename: &str) -> Self {
        self.settings.filename = filename.to_string();
        self
    }

    /// Current download settings
    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Configured columns
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no columns were set.
    pub fn get_columns(&self) -> Result<&[ColumnSpec<R>], ExportError> {
        self.columns
            .as_deref()
            .ok_or_else(ExportError::missing_columns)
    }

    /// Attachment filename for records of `model_name`
    pub fn get_filename(&self, model_name: &str) -> String {
        self.settings
            .filename
            .replace(MODEL_NAME_PLACEHOLDER, model_name)
    }

    /// Build a serializer for the configured columns through the view's cache
    pub fn column_serializer(&self) -> Result<ColumnSerializer<R>, ExportError> {
        self.serializer_for(self.get_columns()?)
    }

    /// Header labels, or `None` when headers are disabled
    pub fn header_row(&self) -> Result<Option<Vec<String>>, ExportError> {
        Ok(self.column_serializer()?.header_row())
    }

    /// Text cells of one record
    pub fn get_row(&self, record: &R) -> Result<Vec<String>, ExportError> {
        self.column_serializer()?.row_for(record)
    }

    /// Headers to send before streaming a body for `model_name`
    pub fn response_headers(&self, model_name: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.settings.content_type.clone()),
            (
                "Content-Disposition",
                content_disposition(&self.get_filename(model_name)),
            ),
        ]
    }

    /// Render records into a buffered CSV attachment
    ///
    /// # Arguments
    ///
    /// * `model_name` - Record type name substituted into the filename
    /// * `records` - Records to export
    ///
    /// # Returns
    ///
    /// The complete response. It is only returned when every row was written.
    pub fn render<I, T>(&self, model_name: &str, records: I) -> Result<CsvResponse, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<R>,
    {
        self.render_columns(self.get_columns()?, model_name, records)
    }

    /// Stream records into an async response body
    ///
    /// Send [`response_headers`](Self::response_headers) first; a failure
    /// here leaves a partially written body.
    pub async fn render_async<S, T, W>(&self, records: S, sink: W) -> Result<(), ExportError>
    where
        S: Stream<Item = T>,
        T: Borrow<R>,
        W: AsyncWrite + Unpin + Send,
    {
        let serializer = self.column_serializer()?;
        serializer.serialize_async(records, sink).await
    }

    pub(crate) fn render_columns<I, T>(
        &self,
        columns: &[ColumnSpec<R>],
        model_name: &str,
        records: I,
    ) -> Result<CsvResponse, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<R>,
    {
        let serializer = self.serializer_for(columns)?;
        let mut response =
            CsvResponse::with_content_type(&self.get_filename(model_name), &self.settings.content_type);

        serializer.serialize_into(records, &mut response)?;
        debug!(
            "Rendered {} ({} bytes)",
            response.filename(),
            response.content().len()
        );

        Ok(response)
    }

    fn serializer_for(&self, columns: &[ColumnSpec<R>]) -> Result<ColumnSerializer<R>, ExportError> {
        let config = SerializerConfig {
            output_headers: self.settings.output_headers,
            ..SerializerConfig::default()
        };
        ColumnSerializer::with_cache(columns, config, &self.cache)
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &AccessorCache<R> {
        &self.cache
    }
}

impl<R: Record + ?Sized + 'static> Default for CsvView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> Clone for CsvView<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            settings: self.settings.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<R: ?Sized> fmt::Debug for CsvView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvView")
            .field("columns", &self.columns)
            .field("settings", &self.settings)
            .finish()
    }
}
