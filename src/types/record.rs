//! Records: objects whose attributes columns read from
//!
//! Path columns resolve through [`Record::attr`], one segment at a time.
//! Related objects are exposed as [`Value::Record`] and methods as
//! [`Value::Method`], so `"manufacturer.name"` and `"car_set.count"` both
//! resolve the same way regardless of whether the terminal attribute is a
//! plain field or a zero-argument method.

use super::value::Value;
use std::collections::{BTreeMap, HashMap};

/// An object with named attributes
pub trait Record: Send + Sync {
    /// Look up a single attribute by name
    ///
    /// Returns `None` when the record has no such attribute. An attribute
    /// that exists but holds no value should return `Some(Value::None)`.
    fn attr(&self, name: &str) -> Option<Value>;

    /// Text used when the record itself is written to a cell
    fn display(&self) -> String {
        String::new()
    }
}

impl Record for HashMap<String, Value> {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Implement [`Record`] for a struct by exposing the listed fields
///
/// Each field must be `Clone` and convertible into [`Value`]. Types that
/// need methods or a custom display should implement [`Record`] by hand.
///
/// ```
/// use csv_listview::record_fields;
///
/// #[derive(Clone)]
/// struct Car {
///     name: String,
///     doors: u32,
/// }
///
/// record_fields!(Car { name, doors });
/// ```
#[macro_export]
macro_rules! record_fields {
    ($type:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::types::Record for $type {
            fn attr(&self, name: &str) -> Option<$crate::types::Value> {
                match name {
                    $(
                        stringify!($field) => Some($crate::types::Value::from(self.$field.clone())),
                    )+
                    _ => None,
                }
            }
        }
    };
}
