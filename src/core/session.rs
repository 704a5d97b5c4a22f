//! Per-namespace sessions: the builder handle given to registrants.
//!
//! A session is bound to one node in the tree. Creation and sealing
//! rebind or consume the handle; registration hands the registrant closure
//! three capabilities: an importer scoped to this path, access to the
//! system namespace, and a live handle onto this namespace's own exports.

use crate::core::error::RegistryError;
use crate::core::export::{Export, ExportSnapshot, ExportTable};
use crate::core::node::{AccessLevel, Node, NodeData};
use crate::core::registry::Registry;
use crate::core::resolver::{self, Resolved};

/// Builder/handle for one namespace path.
///
/// Obtained from [`Registry::namespace`]. Methods that can fail return
/// `None` and record the error in the registry's last-error slot; chain
/// with `?` or `and_then`.
pub struct Session<'r> {
    registry: &'r Registry,
    node: Node,
    path: String,
}

impl<'r> Session<'r> {
    pub(crate) fn new(registry: &'r Registry, node: Node, path: String) -> Self {
        Session {
            registry,
            node,
            path,
        }
    }

    /// Dotted path this session is bound to.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn access(&self) -> AccessLevel {
        self.node.access()
    }

    pub fn is_sealed(&self) -> bool {
        self.node.is_sealed()
    }

    fn fail<T>(&self, err: RegistryError) -> Option<T> {
        self.registry.record_failure(err);
        None
    }

    /// Create a child namespace (or join an existing one when `join` is
    /// set) and rebind the session to it.
    pub fn create(
        self,
        name: &str,
        join: bool,
        access: Option<AccessLevel>,
    ) -> Option<Session<'r>> {
        match self
            .registry
            .tree()
            .create_or_join(&self.node, name, join, access)
        {
            Ok(child) => Some(Session {
                registry: self.registry,
                node: child,
                path: format!("{}.{}", self.path, name),
            }),
            Err(err) => self.fail(err),
        }
    }

    /// Join an existing child (or create it), keeping its access level.
    pub fn join(self, name: &str) -> Option<Session<'r>> {
        self.create(name, true, None)
    }

    /// Join-or-create a public child.
    pub fn public(self, name: &str) -> Option<Session<'r>> {
        self.create(name, true, Some(AccessLevel::Public))
    }

    /// Join-or-create a protected child.
    pub fn protected(self, name: &str) -> Option<Session<'r>> {
        self.create(name, true, Some(AccessLevel::Protected))
    }

    /// Join-or-create a private child.
    pub fn private(self, name: &str) -> Option<Session<'r>> {
        self.create(name, true, Some(AccessLevel::Private))
    }

    /// Seal this namespace: its exports and children become final.
    ///
    /// Irreversible, and does not cascade: already-open children remain
    /// independently mutable. Fails when the namespace is already sealed.
    pub fn seal(self) -> Option<Session<'r>> {
        if self.node.seal() {
            tracing::debug!(namespace = %self.path, "namespace sealed");
            Some(self)
        } else {
            self.fail(RegistryError::State(format!(
                "namespace is already sealed: {}",
                self.path
            )))
        }
    }

    /// Designate this session's namespace as the system namespace and
    /// return the session for chaining.
    ///
    /// # Panics
    ///
    /// Panics if a different namespace has already been designated.
    pub fn seal_system(self) -> Option<Session<'r>> {
        self.registry.system().designate(&self.node, &self.path);
        Some(self)
    }

    fn system_access(&self) -> SystemAccess<'r> {
        match self.registry.system().snapshot() {
            Some(snapshot) => SystemAccess::Ready(snapshot),
            None => SystemAccess::Unset(SystemDesignator {
                registry: self.registry,
                node: self.node.clone(),
                path: self.path.clone(),
            }),
        }
    }

    /// Run a registrant closure against this namespace.
    ///
    /// The closure receives an [`Importer`] scoped to this path, the
    /// [`SystemAccess`] state as of this call, and a live [`Exports`]
    /// handle to populate. Fails when the namespace is sealed.
    pub fn code<F>(self, f: F) -> Option<Session<'r>>
    where
        F: FnOnce(&Importer<'r>, SystemAccess<'r>, &Exports<'_>),
    {
        if self.node.is_sealed() {
            return self.fail(RegistryError::State(format!(
                "cannot register code on a sealed namespace: {}",
                self.path
            )));
        }
        let importer = Importer {
            registry: self.registry,
            caller_path: self.path.clone(),
        };
        let system = self.system_access();
        let exports = Exports { node: &self.node };
        f(&importer, system, &exports);
        Some(self)
    }

    /// Like [`Session::code`], with declared imports.
    ///
    /// Every specifier is resolved up front with this session's path as
    /// the calling namespace; any failing specifier fails the whole call
    /// before the closure runs. The resolved entries line up one-to-one
    /// with the declarations: one entry per whole-namespace specifier, one
    /// entry per listed symbol, in declaration order.
    pub fn code_with_imports<F>(self, specifiers: &[&str], f: F) -> Option<Session<'r>>
    where
        F: FnOnce(SystemAccess<'r>, &Exports<'_>, &[Resolved]),
    {
        if self.node.is_sealed() {
            return self.fail(RegistryError::State(format!(
                "cannot register code on a sealed namespace: {}",
                self.path
            )));
        }
        let mut resolved = Vec::new();
        for specifier in specifiers {
            if let Err(err) = resolver::resolve_specifier(
                self.registry.tree(),
                specifier,
                &self.path,
                self.registry.strict_imports(),
                &mut resolved,
            ) {
                return self.fail(err);
            }
        }
        let system = self.system_access();
        let exports = Exports { node: &self.node };
        f(system, &exports, &resolved);
        Some(self)
    }

    /// Shallow-copied, frozen snapshot of this namespace's exports.
    ///
    /// Only public, sealed namespaces are importable this way.
    pub fn import(&self) -> Option<ExportSnapshot> {
        if self.node.access() != AccessLevel::Public {
            return self.fail(RegistryError::Access(format!(
                "only public namespaces are importable this way: {}",
                self.path
            )));
        }
        if !self.node.is_sealed() {
            return self.fail(RegistryError::State(format!(
                "non-sealed namespaces are incomplete and cannot be imported: {}",
                self.path
            )));
        }
        Some(self.node.snapshot())
    }

    /// Live handle to a single exported symbol, without copying.
    ///
    /// Same gates as [`Session::import`]: the namespace must be public and
    /// sealed. A missing symbol is a recorded `NotFound` failure.
    pub fn symbol(&self, name: &str) -> Option<Export> {
        if self.node.access() != AccessLevel::Public {
            return self.fail(RegistryError::Access(format!(
                "only public namespaces are importable this way: {}",
                self.path
            )));
        }
        if !self.node.is_sealed() {
            return self.fail(RegistryError::State(format!(
                "non-sealed namespaces are incomplete and cannot be imported: {}",
                self.path
            )));
        }
        match self.node.export(name) {
            Some(export) => Some(export),
            None => self.fail(RegistryError::NotFound(format!(
                "symbol '{name}' is not exported by namespace '{}'",
                self.path
            ))),
        }
    }
}

/// Import capability handed to registrant closures, scoped to the calling
/// namespace's path for protected-access checks.
pub struct Importer<'r> {
    registry: &'r Registry,
    caller_path: String,
}

impl Importer<'_> {
    /// Path of the namespace this importer acts on behalf of.
    pub fn caller_path(&self) -> &str {
        &self.caller_path
    }

    /// Import a whole namespace as a frozen snapshot of its exports.
    pub fn namespace(&self, path: &str) -> Option<ExportSnapshot> {
        match resolver::resolve_importable(self.registry.tree(), path, &self.caller_path) {
            Ok(node) => Some(node.snapshot()),
            Err(err) => {
                self.registry.record_failure(err);
                None
            }
        }
    }

    /// Import a single exported symbol from a namespace.
    pub fn symbol(&self, path: &str, name: &str) -> Option<Export> {
        match resolver::resolve_importable(self.registry.tree(), path, &self.caller_path) {
            Ok(node) => match node.export(name) {
                Some(export) => Some(export),
                None => {
                    self.registry.record_failure(RegistryError::NotFound(format!(
                        "symbol '{name}' is not exported by namespace '{path}'"
                    )));
                    None
                }
            },
            Err(err) => {
                self.registry.record_failure(err);
                None
            }
        }
    }
}

/// Access to the system namespace, as observed at the start of a
/// `code`/`code_with_imports` call.
pub enum SystemAccess<'r> {
    /// Nothing designated yet. The designator lets the current namespace
    /// anoint itself; once consumed, every later call observes `Ready`.
    Unset(SystemDesignator<'r>),
    /// The frozen snapshot taken when the system namespace was designated.
    Ready(ExportSnapshot),
}

impl SystemAccess<'_> {
    pub fn is_ready(&self) -> bool {
        matches!(self, SystemAccess::Ready(_))
    }

    /// The snapshot, when designation has happened.
    pub fn snapshot(&self) -> Option<&ExportSnapshot> {
        match self {
            SystemAccess::Ready(snapshot) => Some(snapshot),
            SystemAccess::Unset(_) => None,
        }
    }
}

/// One-shot capability that designates the owning session's namespace as
/// the system namespace.
pub struct SystemDesignator<'r> {
    registry: &'r Registry,
    node: Node,
    path: String,
}

impl SystemDesignator<'_> {
    /// Designate and return the freshly frozen snapshot.
    ///
    /// # Panics
    ///
    /// Panics if a different namespace was designated in the meantime.
    pub fn designate(self) -> ExportSnapshot {
        self.registry.system().designate(&self.node, &self.path);
        self.registry.system().snapshot().unwrap_or_default()
    }

    /// Path of the namespace this designator would designate.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Live handle onto a namespace's own export table.
///
/// Each operation takes the table lock transiently, so the importer and
/// the system designator stay usable from inside the same closure.
pub struct Exports<'n> {
    node: &'n NodeData,
}

impl Exports<'_> {
    /// Insert or replace a symbol. Returns the previous value, if any.
    pub fn insert(&self, name: impl Into<String>, export: Export) -> Option<Export> {
        self.node.with_exports_mut(|t| t.insert(name, export))
    }

    pub fn remove(&self, name: &str) -> Option<Export> {
        self.node.with_exports_mut(|t| t.remove(name))
    }

    pub fn get(&self, name: &str) -> Option<Export> {
        self.node.with_exports(|t| t.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node.with_exports(|t| t.contains(name))
    }

    pub fn len(&self) -> usize {
        self.node.with_exports(ExportTable::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exported symbol names, in table order.
    pub fn names(&self) -> Vec<String> {
        self.node
            .with_exports(|t| t.names().map(str::to_string).collect())
    }
}
