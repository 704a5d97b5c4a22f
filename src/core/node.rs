//! A single entry in the namespace tree: exports, children, metadata.

use crate::core::export::{Export, ExportSnapshot, ExportTable};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Visibility policy of a namespace, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Importable by anyone.
    #[default]
    Public,
    /// Importable only by namespaces nested under (or equal to) this one.
    Protected,
    /// Never importable.
    Private,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessLevel::Public => "public",
            AccessLevel::Protected => "protected",
            AccessLevel::Private => "private",
        };
        f.write_str(s)
    }
}

/// Shared handle to a namespace node.
pub(crate) type Node = Arc<NodeData>;

/// One namespace: its symbol table, its children, and its lifecycle state.
///
/// Fields are guarded individually so that a registrant closure can hold a
/// live handle onto the export table while the importer reads other nodes
/// (or this node's metadata) without lock-ordering hazards. The seal flag
/// is monotonic: once set it never resets, and it freezes `exports` and
/// `children` on this node only. Descendants stay independently mutable.
#[derive(Debug)]
pub(crate) struct NodeData {
    exports: RwLock<ExportTable>,
    children: RwLock<FxHashMap<String, Node>>,
    access: AccessLevel,
    sealed: AtomicBool,
}

impl NodeData {
    pub(crate) fn new(access: AccessLevel) -> Node {
        Arc::new(NodeData {
            exports: RwLock::new(ExportTable::new()),
            children: RwLock::new(FxHashMap::default()),
            access,
            sealed: AtomicBool::new(false),
        })
    }

    pub(crate) fn access(&self) -> AccessLevel {
        self.access
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    /// Flip the seal flag. Returns `false` if the node was already sealed.
    pub(crate) fn seal(&self) -> bool {
        self.sealed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn child(&self, name: &str) -> Option<Node> {
        self.children.read().get(name).cloned()
    }

    pub(crate) fn insert_child(&self, name: String, child: Node) {
        self.children.write().insert(name, child);
    }

    pub(crate) fn child_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.children.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Run a closure against the live export table (read access).
    pub(crate) fn with_exports<R>(&self, f: impl FnOnce(&ExportTable) -> R) -> R {
        f(&self.exports.read())
    }

    /// Run a closure against the live export table (write access).
    pub(crate) fn with_exports_mut<R>(&self, f: impl FnOnce(&mut ExportTable) -> R) -> R {
        f(&mut self.exports.write())
    }

    pub(crate) fn export(&self, name: &str) -> Option<Export> {
        self.with_exports(|t| t.get(name).cloned())
    }

    pub(crate) fn snapshot(&self) -> ExportSnapshot {
        self.with_exports(ExportTable::snapshot)
    }
}
