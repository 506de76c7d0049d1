//! Types module
//!
//! Contains core data structures used throughout the library.
//! This module organizes types into logical submodules:
//! - `record`: the `Record` trait columns read attributes from
//! - `value`: loosely-typed attribute values and their text coercion
//! - `error`: Error types for configuration and export

pub mod error;
pub mod record;
pub mod value;

pub use error::ExportError;
pub use record::Record;
pub use value::{Method, Value};
