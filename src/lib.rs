//! CSV List View Library
//! # Overview
//!
//! This library exports collections of records as CSV documents. Columns are
//! declared once, either as dotted attribute paths, as functions of the record,
//! or as either of those paired with an explicit header label, and every record
//! becomes one row.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Record, Value, ExportError)
//! - [`core`] - Column logic:
//!   - [`core::accessor`] - Column specifications and their resolution into accessors
//!   - [`core::cache`] - Thread-safe memo of resolved accessors
//!   - [`core::serializer`] - Header and row generation, sync and async output
//! - [`io`] - CSV dialect and writers
//! - [`view`] - CSV download view and bulk export action
//!
//! # Column Specifications
//!
//! - **Path**: `"manufacturer.name"` walks one attribute per segment; a
//!   terminal method is invoked with no arguments
//! - **Callable**: any `Fn(&R) -> Value`, optionally labelled
//! - **Explicit**: `("name", "Name")` pairs a spec with its header label
//!
//! # Example
//!
//! ```
//! use csv_listview::{record_fields, ColumnSerializer, ColumnSpec};
//!
//! struct Manufacturer {
//!     name: String,
//!     models: u32,
//! }
//!
//! record_fields!(Manufacturer { name, models });
//!
//! let columns: Vec<ColumnSpec<Manufacturer>> =
//!     vec![("name", "Name").into(), ("models", "Number of models").into()];
//! let serializer = ColumnSerializer::new(&columns).unwrap();
//! let records = vec![Manufacturer { name: "Jeep".into(), models: 1 }];
//!
//! assert_eq!(
//!     serializer.serialize(&records).unwrap(),
//!     "Name,Number of models\r\nJeep,1\r\n"
//! );
//! ```

// Module declarations
pub mod core;
pub mod io;
pub mod types;
pub mod view;

pub use core::{
    pretty_name, resolve, yes_no, Accessor, AccessorCache, ColumnSerializer, ColumnSpec, Getter,
    Normalizer, SerializerConfig,
};
pub use types::{ExportError, Method, Record, Value};
pub use view::{CsvExportAction, CsvResponse, CsvView, ViewSettings};
