//! The registry itself: composition root for the namespace tree, the
//! system-namespace slot, the last-error slot, and configuration.
//!
//! Hosts construct one `Registry` at their top level and hand it (by
//! reference) to every registrant. Tests construct a fresh registry each;
//! there is no hidden global instance.

use crate::core::error::RegistryError;
use crate::core::node::Node;
use crate::core::session::Session;
use crate::core::system::SystemNamespace;
use crate::core::tree::NamespaceTree;
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};

/// Registry tuning knobs.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// When set, a symbol listed in an import specifier but missing from
    /// the target namespace fails the import with `NotFound`. The default
    /// keeps the lenient behavior: the entry resolves as absent and a
    /// warning is logged.
    pub strict_imports: bool,
}

/// In-process hierarchical namespace registry.
///
/// Owns the namespace tree, the one-time system-namespace designation,
/// and the last-error slot that backs the `None`-returning session
/// surface. All state lives in memory; nothing is persisted.
pub struct Registry {
    tree: NamespaceTree,
    system: SystemNamespace,
    config: RegistryConfig,
    last_error: Mutex<Option<RegistryError>>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Registry {
            tree: NamespaceTree::new(),
            system: SystemNamespace::new(),
            config,
            last_error: Mutex::new(None),
        }
    }

    /// Open a session on `path`, lazily creating missing tail segments
    /// with default (public) access.
    ///
    /// Returns `None` (with the error recorded) when the path is
    /// malformed or a sealed namespace blocks creation of a missing
    /// segment. Opening a session on an existing namespace never fails on
    /// seal state: sealed namespaces still accept `import()`/`symbol()`.
    pub fn namespace(&self, path: &str) -> Option<Session<'_>> {
        match self.tree.open(path) {
            Ok(node) => Some(Session::new(self, node, path.to_string())),
            Err(err) => {
                self.record_failure(err);
                None
            }
        }
    }

    /// The most recently recorded failure.
    ///
    /// A single registry-wide slot, overwritten by each failing
    /// operation: read it immediately after a `None` result. Successful
    /// operations do not clear it.
    pub fn last_error(&self) -> Option<RegistryError> {
        self.last_error.lock().clone()
    }

    /// Crate version as `[major, minor, patch]`.
    pub fn version() -> [u32; 3] {
        let mut parts = env!("CARGO_PKG_VERSION")
            .split('.')
            .map(|p| p.parse().unwrap_or(0));
        let mut next = || parts.next().unwrap_or(0);
        [next(), next(), next()]
    }

    /// JSON description of the whole tree: names, access levels, seal
    /// state, and exported symbol names, in deterministic order.
    pub fn describe(&self) -> JsonValue {
        let mut namespaces = serde_json::Map::new();
        for (name, node) in self.tree.roots() {
            namespaces.insert(name.clone(), describe_node(&node));
        }
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "system_designated": self.system.is_set(),
            "namespaces": JsonValue::Object(namespaces),
        })
    }

    pub(crate) fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    pub(crate) fn system(&self) -> &SystemNamespace {
        &self.system
    }

    pub(crate) fn strict_imports(&self) -> bool {
        self.config.strict_imports
    }

    pub(crate) fn record_failure(&self, err: RegistryError) {
        tracing::warn!(error = %err, "registry operation failed");
        *self.last_error.lock() = Some(err);
    }
}

fn describe_node(node: &Node) -> JsonValue {
    let exports: Vec<String> = node.with_exports(|t| t.names().map(str::to_string).collect());
    let mut children = serde_json::Map::new();
    for name in node.child_names() {
        if let Some(child) = node.child(&name) {
            children.insert(name, describe_node(&child));
        }
    }
    json!({
        "access": node.access().to_string(),
        "sealed": node.is_sealed(),
        "exports": exports,
        "children": JsonValue::Object(children),
    })
}
