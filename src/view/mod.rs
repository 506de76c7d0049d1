//! View adapter
//!
//! Exposes a column serializer as a CSV download:
//! - `csv_view` - List view holding columns and download settings
//! - `response` - Buffered attachment and header encoding
//! - `admin` - Bulk export action with per-action column overrides

pub mod admin;
pub mod csv_view;
pub mod response;

pub use admin::{CsvExportAction, EXPORT_ACTION_DESCRIPTION};
pub use csv_view::{CsvView, ViewSettings, MODEL_NAME_PLACEHOLDER};
pub use response::{content_disposition, encode_header, CsvResponse, CSV_CONTENT_TYPE};
