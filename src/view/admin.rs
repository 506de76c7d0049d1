//! Bulk "export selected records" action
//!
//! Wraps a [`CsvView`] so an admin list page can export a selection of
//! records. The action may declare its own columns, which take precedence
//! over the view's.

use super::csv_view::CsvView;
use super::response::CsvResponse;
use crate::core::ColumnSpec;
use crate::types::{ExportError, Record};
use log::debug;
use std::borrow::Borrow;
use std::fmt;

/// Label shown for the export action in admin menus
pub const EXPORT_ACTION_DESCRIPTION: &str = "Export to CSV";

/// Admin action exporting a pre-filtered selection through a [`CsvView`]
pub struct CsvExportAction<R: ?Sized> {
    view: CsvView<R>,
    columns: Option<Vec<ColumnSpec<R>>>,
}

impl<R: Record + ?Sized + 'static> CsvExportAction<R> {
    /// Export action rendering through `view` and its columns
    pub fn new(view: CsvView<R>) -> Self {
        Self {
            view,
            columns: None,
        }
    }

    /// Export with these columns instead of the view's
    pub fn with_columns(mut self, columns: Vec<ColumnSpec<R>>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Menu label of the action
    pub fn short_description(&self) -> &'static str {
        EXPORT_ACTION_DESCRIPTION
    }

    pub fn view(&self) -> &CsvView<R> {
        &self.view
    }

    /// Columns this action exports: its own override, else the view's
    pub fn get_columns(&self) -> Result<&[ColumnSpec<R>], ExportError> {
        match self.columns.as_deref() {
            Some(columns) => Ok(columns),
            None => self.view.get_columns(),
        }
    }

    /// Export the selected records as a CSV attachment
    pub fn export<I, T>(&self, model_name: &str, selected: I) -> Result<CsvResponse, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<R>,
    {
        let columns = self.get_columns()?;
        debug!(
            "Exporting {} selection with {} columns",
            model_name,
            columns.len()
        );
        self.view.render_columns(columns, model_name, selected)
    }
}

impl<R: Record + ?Sized + 'static> From<CsvView<R>> for CsvExportAction<R> {
    fn from(view: CsvView<R>) -> Self {
        Self::new(view)
    }
}

impl<R: ?Sized> fmt::Debug for CsvExportAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvExportAction")
            .field("view", &self.view)
            .field("columns", &self.columns)
            .finish()
    }
}
