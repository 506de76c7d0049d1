//! Core column logic
//!
//! This module contains the column-to-value resolution and serialization components:
//! - `accessor` - Column specifications and their resolution into accessors
//! - `cache` - Thread-safe memo of resolved accessors
//! - `serializer` - Header/row generation and CSV output

pub mod accessor;
pub mod cache;
pub mod serializer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use accessor::{pretty_name, resolve, yes_no, Accessor, ColumnSpec, Getter, Normalizer};
pub use cache::AccessorCache;
pub use serializer::{ColumnSerializer, SerializerConfig};
