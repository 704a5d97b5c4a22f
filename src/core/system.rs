//! The one-time system-namespace designation slot.

use crate::core::export::ExportSnapshot;
use crate::core::node::Node;
use parking_lot::Mutex;
use std::sync::Arc;

/// Outcome of a designation attempt that did not conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The slot was empty and now holds this node.
    NewlySet,
    /// The slot already held this same node; the snapshot was re-copied.
    AlreadySet,
}

enum Slot {
    Unset,
    Set {
        node: Node,
        snapshot: ExportSnapshot,
    },
}

/// Process-wide (per registry) slot holding the designated system
/// namespace and a frozen snapshot of its exports, taken at designation
/// time.
///
/// Settable once: a second designation with a different node is a
/// consistency violation and panics. Re-designating the same node is a
/// no-op beyond re-copying the snapshot.
pub(crate) struct SystemNamespace {
    slot: Mutex<Slot>,
}

impl SystemNamespace {
    pub(crate) fn new() -> Self {
        SystemNamespace {
            slot: Mutex::new(Slot::Unset),
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Set { .. })
    }

    /// The frozen snapshot, if designation has happened.
    pub(crate) fn snapshot(&self) -> Option<ExportSnapshot> {
        match &*self.slot.lock() {
            Slot::Set { snapshot, .. } => Some(snapshot.clone()),
            Slot::Unset => None,
        }
    }

    /// Designate `node` (addressed by `path`, for diagnostics) as the
    /// system namespace.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a different node. This is the one
    /// unrecoverable error in the registry: it cannot be returned as a
    /// failure value because the host process cannot be safely continued
    /// past it.
    pub(crate) fn designate(&self, node: &Node, path: &str) -> SetOutcome {
        let mut slot = self.slot.lock();
        match &*slot {
            Slot::Set { node: current, .. } => {
                if !Arc::ptr_eq(current, node) {
                    panic!(
                        "the system namespace can only be set once; \
                         attempted to set it again in namespace '{path}'"
                    );
                }
                *slot = Slot::Set {
                    node: node.clone(),
                    snapshot: node.snapshot(),
                };
                SetOutcome::AlreadySet
            }
            Slot::Unset => {
                *slot = Slot::Set {
                    node: node.clone(),
                    snapshot: node.snapshot(),
                };
                tracing::debug!(namespace = path, "system namespace designated");
                SetOutcome::NewlySet
            }
        }
    }
}
