//! Accessor resolution
//!
//! Turns a [`ColumnSpec`] into an [`Accessor`]: a pure `record -> value`
//! function plus the label derived for it.
//!
//! # Resolution rules
//!
//! - **Path** (`"manufacturer.name"`): one attribute lookup per `.`-separated
//!   segment, starting from the record. If the terminal value is a method it
//!   is invoked once with no arguments. The label is [`pretty_name`] of the path.
//! - **Callable**: the function is applied to the record, and a method result
//!   is invoked once. The label is whatever label was attached to the callable.
//! - **Explicit**: resolves through the wrapped spec; its label overrides any
//!   derived or attached label unconditionally.
//!
//! A normalizer attached to a spec is applied to the resolved value last.

use crate::types::{ExportError, Record, Value};
use std::fmt;
use std::sync::Arc;

/// Value transformation applied after an accessor resolves a value
pub type Normalizer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Caller-supplied column function
pub type Getter<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

type AccessFn<R> = Arc<dyn Fn(&R) -> Result<Value, ExportError> + Send + Sync>;

/// Declarative description of how to extract one output field from a record
pub enum ColumnSpec<R: ?Sized> {
    /// Dotted attribute path, e.g. `"manufacturer.name"`
    Path {
        path: String,
        normalizer: Option<Normalizer>,
    },
    /// Function of the record, optionally carrying a human-readable label
    Callable {
        func: Getter<R>,
        label: Option<String>,
        normalizer: Option<Normalizer>,
    },
    /// Any spec paired with an explicit header label
    Explicit {
        spec: Box<ColumnSpec<R>>,
        label: String,
    },
}

impl<R: ?Sized + 'static> ColumnSpec<R> {
    /// Dotted attribute path column
    pub fn path(path: impl Into<String>) -> Self {
        ColumnSpec::Path {
            path: path.into(),
            normalizer: None,
        }
    }

    /// Callable column without a label
    ///
    /// Such a column can only be used when headers are disabled, or when it
    /// is wrapped with [`ColumnSpec::labeled`].
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        Self::getter(Arc::new(f), None)
    }

    /// Callable column carrying its own label
    pub fn func_with_label<F>(f: F, label: impl Into<String>) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        Self::getter(Arc::new(f), Some(label.into()))
    }

    /// Callable column from a shared getter
    ///
    /// Reusing the same `Arc` across columns or views lets the accessor cache
    /// recognise it as the same specification.
    pub fn getter(func: Getter<R>, label: Option<String>) -> Self {
        ColumnSpec::Callable {
            func,
            label,
            normalizer: None,
        }
    }

    /// Boolean path column rendered as `Yes` / `No`
    ///
    /// Non-boolean values become empty cells.
    pub fn boolean(path: impl Into<String>) -> Self {
        Self::path(path).with_normalizer(Arc::new(yes_no))
    }

    /// Column showing the display text of a field with choices
    ///
    /// Reads the `get_<field>_display` attribute and labels the column with
    /// the pretty form of `field`.
    pub fn choice_display(field: &str) -> Self {
        Self::path(format!("get_{}_display", field)).labeled(pretty_name(field))
    }

    /// Pair this spec with an explicit header label
    pub fn labeled(self, label: impl Into<String>) -> Self {
        let label = label.into();
        match self {
            ColumnSpec::Explicit { spec, .. } => ColumnSpec::Explicit { spec, label },
            spec => ColumnSpec::Explicit {
                spec: Box::new(spec),
                label,
            },
        }
    }

    /// Attach a normalizer applied to every value this column resolves
    pub fn with_normalizer(self, normalizer: Normalizer) -> Self {
        match self {
            ColumnSpec::Path { path, .. } => ColumnSpec::Path {
                path,
                normalizer: Some(normalizer),
            },
            ColumnSpec::Callable { func, label, .. } => ColumnSpec::Callable {
                func,
                label,
                normalizer: Some(normalizer),
            },
            ColumnSpec::Explicit { spec, label } => ColumnSpec::Explicit {
                spec: Box::new((*spec).with_normalizer(normalizer)),
                label,
            },
        }
    }
}

impl<R: ?Sized> ColumnSpec<R> {
    /// Label supplied through an explicit pair, if any
    pub fn explicit_label(&self) -> Option<&str> {
        match self {
            ColumnSpec::Explicit { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Attribute path of the underlying spec, if it is a path column
    pub fn attribute_path(&self) -> Option<&str> {
        match self {
            ColumnSpec::Path { path, .. } => Some(path),
            ColumnSpec::Callable { .. } => None,
            ColumnSpec::Explicit { spec, .. } => (**spec).attribute_path(),
        }
    }
}

impl<R: ?Sized> Clone for ColumnSpec<R> {
    fn clone(&self) -> Self {
        match self {
            ColumnSpec::Path { path, normalizer } => ColumnSpec::Path {
                path: path.clone(),
                normalizer: normalizer.clone(),
            },
            ColumnSpec::Callable {
                func,
                label,
                normalizer,
            } => ColumnSpec::Callable {
                func: Arc::clone(func),
                label: label.clone(),
                normalizer: normalizer.clone(),
            },
            ColumnSpec::Explicit { spec, label } => ColumnSpec::Explicit {
                spec: spec.clone(),
                label: label.clone(),
            },
        }
    }
}

impl<R: ?Sized> fmt::Debug for ColumnSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Path { path, normalizer } => f
                .debug_struct("Path")
                .field("path", path)
                .field("normalized", &normalizer.is_some())
                .finish(),
            ColumnSpec::Callable {
                label, normalizer, ..
            } => f
                .debug_struct("Callable")
                .field("label", label)
                .field("normalized", &normalizer.is_some())
                .finish(),
            ColumnSpec::Explicit { spec, label } => f
                .debug_struct("Explicit")
                .field("spec", spec)
                .field("label", label)
                .finish(),
        }
    }
}

impl<R: ?Sized + 'static> From<&str> for ColumnSpec<R> {
    fn from(path: &str) -> Self {
        ColumnSpec::path(path)
    }
}

impl<R: ?Sized + 'static> From<String> for ColumnSpec<R> {
    fn from(path: String) -> Self {
        ColumnSpec::path(path)
    }
}

impl<R: ?Sized + 'static> From<(&str, &str)> for ColumnSpec<R> {
    fn from((path, label): (&str, &str)) -> Self {
        ColumnSpec::path(path).labeled(label)
    }
}

/// Resolved column function with its derived or attached label
pub struct Accessor<R: ?Sized> {
    get: AccessFn<R>,
    label: Option<String>,
}

impl<R: ?Sized> Accessor<R> {
    /// Apply the accessor to a record
    pub fn get(&self, record: &R) -> Result<Value, ExportError> {
        (self.get)(record)
    }

    /// Label derived from the path or attached to the callable, if any
    ///
    /// Explicit labels are applied by the serializer, not stored here.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<R: ?Sized> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        Accessor {
            get: Arc::clone(&self.get),
            label: self.label.clone(),
        }
    }
}

impl<R: ?Sized> fmt::Debug for Accessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Resolve a column spec into an accessor
///
/// The returned accessor's label is the explicit label for explicit specs,
/// the pretty path for path specs, and the attached label (if any) for
/// callables. This function does no caching; see
/// [`AccessorCache`](crate::core::AccessorCache).
///
/// # Arguments
///
/// * `spec` - The column specification to resolve
///
/// # Returns
///
/// An accessor that walks the record on every call. Lookup failures surface
/// from [`Accessor::get`], never from resolution.
pub fn resolve<R: Record + ?Sized + 'static>(spec: &ColumnSpec<R>) -> Accessor<R> {
    match spec {
        ColumnSpec::Path { path, normalizer } => {
            let segments: Vec<String> = path.split('.').map(str::to_string).collect();
            let label = Some(pretty_name(path));
            let path = path.clone();
            let normalizer = normalizer.clone();

            Accessor {
                get: Arc::new(move |record: &R| {
                    let value = lookup_path(record, &path, &segments)?.call_if_method();
                    Ok(apply(normalizer.as_ref(), value))
                }),
                label,
            }
        }
        ColumnSpec::Callable {
            func,
            label,
            normalizer,
        } => {
            let func = Arc::clone(func);
            let normalizer = normalizer.clone();

            Accessor {
                get: Arc::new(move |record: &R| {
                    let value = func(record).call_if_method();
                    Ok(apply(normalizer.as_ref(), value))
                }),
                label: label.clone(),
            }
        }
        ColumnSpec::Explicit { spec, label } => Accessor {
            label: Some(label.clone()),
            ..resolve(&**spec)
        },
    }
}

/// Derive a header label from an attribute path
///
/// `_` and `.` become spaces and the first character is upper-cased; the
/// rest of the string is left as is.
pub fn pretty_name(accessor: &str) -> String {
    let spaced = accessor.replace(['_', '.'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalizer mapping booleans to `Yes` / `No`
pub fn yes_no(value: Value) -> Value {
    match value.as_bool() {
        Some(true) => Value::from("Yes"),
        Some(false) => Value::from("No"),
        None => Value::None,
    }
}

fn apply(normalizer: Option<&Normalizer>, value: Value) -> Value {
    match normalizer {
        Some(normalize) => normalize(value),
        None => value,
    }
}

fn lookup_path<R: Record + ?Sized>(
    record: &R,
    path: &str,
    segments: &[String],
) -> Result<Value, ExportError> {
    let (first, rest) = segments
        .split_first()
        .ok_or_else(|| ExportError::attribute_resolution(path, ""))?;

    let mut value = record
        .attr(first)
        .ok_or_else(|| ExportError::attribute_resolution(path, first))?;

    for segment in rest {
        value = match value {
            Value::Record(related) => related
                .attr(segment)
                .ok_or_else(|| ExportError::attribute_resolution(path, segment))?,
            _ => return Err(ExportError::attribute_resolution(path, segment)),
        };
    }

    Ok(value)
}
