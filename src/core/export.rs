//! Export values and the tables that hold them.
//!
//! A namespace's export table maps symbol names to [`Export`] handles. The
//! handle is cheap to clone and shares its underlying allocation, which is
//! what gives `import()` its shallow-copy semantics: a snapshot owns an
//! independent map whose values still point at the live allocations.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A callable export: takes positional JSON arguments, returns a JSON value.
pub type ExportFn = dyn Fn(&[JsonValue]) -> JsonValue + Send + Sync;

enum ExportKind {
    Value(JsonValue),
    Func(Box<ExportFn>),
}

/// A single exported symbol value: either plain data or a callable.
///
/// `Export` is a shared handle. Cloning it clones the `Arc`, not the
/// payload, so two holders of the same export observe the same allocation.
/// [`Export::ptr_eq`] makes that identity testable.
#[derive(Clone)]
pub struct Export(Arc<ExportKind>);

impl Export {
    /// Wrap a data value.
    pub fn value(v: impl Into<JsonValue>) -> Self {
        Export(Arc::new(ExportKind::Value(v.into())))
    }

    /// Wrap a callable.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&[JsonValue]) -> JsonValue + Send + Sync + 'static,
    {
        Export(Arc::new(ExportKind::Func(Box::new(f))))
    }

    /// The data payload, if this export is not a callable.
    pub fn as_value(&self) -> Option<&JsonValue> {
        match &*self.0 {
            ExportKind::Value(v) => Some(v),
            ExportKind::Func(_) => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(&*self.0, ExportKind::Func(_))
    }

    /// Invoke a callable export. Returns `None` for data exports.
    pub fn call(&self, args: &[JsonValue]) -> Option<JsonValue> {
        match &*self.0 {
            ExportKind::Func(f) => Some(f(args)),
            ExportKind::Value(_) => None,
        }
    }

    /// True when both handles share one allocation.
    pub fn ptr_eq(a: &Export, b: &Export) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ExportKind::Value(v) => f.debug_tuple("Export::Value").field(v).finish(),
            ExportKind::Func(_) => f.write_str("Export::Func(..)"),
        }
    }
}

/// The live, mutable symbol table of an open namespace.
///
/// Ordered (by symbol name) so that iteration and [`ExportTable::snapshot`]
/// are deterministic.
#[derive(Default, Clone, Debug)]
pub struct ExportTable {
    entries: BTreeMap<String, Export>,
}

impl ExportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a symbol. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, export: Export) -> Option<Export> {
        self.entries.insert(name.into(), export)
    }

    pub fn remove(&mut self, name: &str) -> Option<Export> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Shallow-copy the table into a frozen snapshot: the map is
    /// independent, the values are shared handles.
    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// An immutable shallow copy of an export table.
///
/// The snapshot owns its map, so later structural changes to the source
/// table (or to other snapshots) are invisible to it. The values inside
/// are the same shared [`Export`] handles the live table holds.
#[derive(Clone, Debug, Default)]
pub struct ExportSnapshot {
    entries: BTreeMap<String, Export>,
}

impl ExportSnapshot {
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
