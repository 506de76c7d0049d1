//! Thread-safe accessor cache
//!
//! Memoizes [`resolve`] per column specification so that an identical spec
//! never yields two distinct accessor instances. Backed by a `DashMap`: the
//! resolve-and-insert step runs under the shard lock for its key, so callers
//! racing on a never-before-seen spec all observe the same `Arc`.
//!
//! # Keys
//!
//! - Path specs are keyed by their path text and normalizer identity.
//! - Callable specs are keyed by the identity of the function `Arc`, the
//!   attached label and the normalizer identity. The cached accessor holds a
//!   clone of both `Arc`s, so an address cannot be reused by another
//!   function while its entry is alive.
//! - Explicit specs are keyed by their inner spec: the label override is
//!   applied by the serializer, not stored in the accessor.
//!
//! There is no process-wide instance. A cache lives as long as its owner
//! (a serializer or a view).

use super::accessor::{resolve, Accessor, ColumnSpec, Normalizer};
use crate::types::Record;
use dashmap::DashMap;
use log::trace;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SpecKey {
    Path {
        path: String,
        normalizer: Option<usize>,
    },
    Callable {
        func: usize,
        label: Option<String>,
        normalizer: Option<usize>,
    },
}

impl SpecKey {
    fn of<R: ?Sized>(spec: &ColumnSpec<R>) -> Self {
        match spec {
            ColumnSpec::Path { path, normalizer } => SpecKey::Path {
                path: path.clone(),
                normalizer: normalizer.as_ref().map(normalizer_id),
            },
            ColumnSpec::Callable {
                func,
                label,
                normalizer,
            } => SpecKey::Callable {
                func: Arc::as_ptr(func) as *const () as usize,
                label: label.clone(),
                normalizer: normalizer.as_ref().map(normalizer_id),
            },
            ColumnSpec::Explicit { spec, .. } => SpecKey::of(&**spec),
        }
    }
}

fn normalizer_id(normalizer: &Normalizer) -> usize {
    Arc::as_ptr(normalizer) as *const () as usize
}

/// Concurrent memo of resolved accessors
pub struct AccessorCache<R: ?Sized> {
    entries: DashMap<SpecKey, Arc<Accessor<R>>>,
}

impl<R: Record + ?Sized + 'static> AccessorCache<R> {
    /// Empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached accessor for `spec`, resolving it on first use
    ///
    /// For explicit specs the accessor of the wrapped spec is returned; its
    /// label is the derived or attached one.
    pub fn resolve(&self, spec: &ColumnSpec<R>) -> Arc<Accessor<R>> {
        let key = SpecKey::of(spec);

        if let Some(hit) = self.entries.get(&key) {
            trace!("Accessor cache hit for {:?}", spec);
            return Arc::clone(&*hit);
        }

        let entry = self.entries.entry(key).or_insert_with(|| {
            trace!("Accessor cache miss for {:?}", spec);
            Arc::new(resolve(unwrap_explicit(spec)))
        });
        Arc::clone(&*entry)
    }

    /// Number of distinct specifications resolved so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Record + ?Sized + 'static> Default for AccessorCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> fmt::Debug for AccessorCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn unwrap_explicit<R: ?Sized>(spec: &ColumnSpec<R>) -> &ColumnSpec<R> {
    match spec {
        ColumnSpec::Explicit { spec, .. } => unwrap_explicit(&**spec),
        other => other,
    }
}
