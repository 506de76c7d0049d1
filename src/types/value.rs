//! Cell values produced by column accessors
//!
//! A [`Value`] is the loosely-typed result of looking up one attribute on a
//! record. Values are coerced to text only at the very end, when a row is
//! handed to the CSV encoder.

use super::record::Record;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callable attribute (a "method" on a record)
pub type Method = Arc<dyn Fn() -> Value + Send + Sync>;

/// A single attribute value read off a record
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value, rendered as an empty cell
    #[default]
    None,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A related object whose attributes can be traversed by dotted paths
    Record(Arc<dyn Record>),
    /// A zero-argument method, invoked when it is the terminal value of a path
    Method(Method),
}

impl Value {
    /// Wrap a closure as a method value
    pub fn method<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Value::Method(Arc::new(f))
    }

    /// Wrap a related object
    pub fn record<T: Record + 'static>(record: T) -> Self {
        Value::Record(Arc::new(record))
    }

    /// True for the empty value, written as an empty cell
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// True for a method not yet invoked
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Method(_))
    }

    /// The boolean inside a `Bool`; `None` for every other variant
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Invoke the value once if it is a method, otherwise return it unchanged
    ///
    /// Only one level is unwrapped: a method returning another method yields
    /// the inner method.
    pub fn call_if_method(self) -> Value {
        match self {
            Value::Method(f) => f(),
            other => other,
        }
    }

    /// Coerce the value into the text written to a CSV cell
    ///
    /// `None` becomes an empty string, never the literal text "None".
    /// Booleans are written `True` / `False` and whole floats keep their `.0`.
    /// Datetimes carry either no fraction or exactly six digits.
    pub fn to_field(&self) -> String {
        match self {
            Value::None => String::new(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) if dt.nanosecond() == 0 => {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            Value::Record(r) => r.display(),
            Value::Method(f) => f().to_field(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::UInt(u) => f.debug_tuple("UInt").field(u).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Decimal(d) => f.debug_tuple("Decimal").field(d).finish(),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::Record(r) => f.debug_tuple("Record").field(&r.display()).finish(),
            Value::Method(_) => write!(f, "Method(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Record + 'static> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}
