//! The namespace tree: path resolution and create-or-join.

use crate::core::error::RegistryError;
use crate::core::node::{AccessLevel, Node, NodeData};
use parking_lot::RwLock;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Grammar for a single path segment. The first character excludes `-`.
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z$_][A-Za-z0-9_$-]*$").unwrap());

pub(crate) fn is_valid_segment(name: &str) -> bool {
    SEGMENT_RE.is_match(name)
}

/// Segment-wise prefix test: `target` is a prefix of (or equal to) `caller`.
///
/// `"a.b"` prefixes `"a.b"` and `"a.b.c"`, but not `"a.bc"`. The sibling
/// case is exactly why this compares segments instead of raw strings.
pub(crate) fn path_is_prefix(target: &str, caller: &str) -> bool {
    let mut target_segments = target.split('.');
    let mut caller_segments = caller.split('.');
    loop {
        match (target_segments.next(), caller_segments.next()) {
            (None, _) => return true,
            (Some(t), Some(c)) if t == c => continue,
            _ => return false,
        }
    }
}

/// Root collection of top-level namespace nodes.
///
/// Path resolution is total and deterministic: a dotted path resolves to
/// exactly one node or fails, and there is no aliasing across paths. Nodes
/// are created lazily and never deleted.
pub(crate) struct NamespaceTree {
    roots: RwLock<FxHashMap<String, Node>>,
}

impl NamespaceTree {
    pub(crate) fn new() -> Self {
        NamespaceTree {
            roots: RwLock::new(FxHashMap::default()),
        }
    }

    fn root(&self, name: &str) -> Option<Node> {
        self.roots.read().get(name).cloned()
    }

    /// Top-level names in sorted order, with their nodes.
    pub(crate) fn roots(&self) -> Vec<(String, Node)> {
        let mut entries: Vec<(String, Node)> = self
            .roots
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Resolve a dotted path to its node. No partial results: every
    /// segment must be non-blank and present.
    pub(crate) fn resolve(&self, path: &str) -> Result<Node, RegistryError> {
        let mut current: Option<Node> = None;
        for segment in path.split('.') {
            if segment.trim().is_empty() {
                return Err(RegistryError::Syntax(format!(
                    "empty segment in namespace path '{path}'"
                )));
            }
            let next = match &current {
                None => self.root(segment),
                Some(node) => node.child(segment),
            };
            current = Some(next.ok_or_else(|| {
                RegistryError::NotFound(format!("namespace not found: {path}"))
            })?);
        }
        current.ok_or_else(|| RegistryError::NotFound(format!("namespace not found: {path}")))
    }

    /// Resolve a path, lazily creating any missing tail segments with
    /// default (public) access.
    ///
    /// Existing segments are plainly traversed; the join-on-sealed
    /// restriction of [`NamespaceTree::create_or_join`] applies to explicit
    /// create/join calls, not to opening a session on an existing node.
    pub(crate) fn open(&self, path: &str) -> Result<Node, RegistryError> {
        let mut current: Option<Node> = None;
        for segment in path.split('.') {
            if segment.trim().is_empty() {
                return Err(RegistryError::Syntax(format!(
                    "empty segment in namespace path '{path}'"
                )));
            }
            let existing = match &current {
                None => self.root(segment),
                Some(node) => node.child(segment),
            };
            let next = match existing {
                Some(node) => node,
                None => match &current {
                    None => self.create_root(segment)?,
                    Some(parent) => self.create_under(parent, segment, AccessLevel::Public)?,
                },
            };
            current = Some(next);
        }
        current.ok_or_else(|| RegistryError::NotFound(format!("namespace not found: {path}")))
    }

    /// Create a child under `parent`, or join an existing one.
    ///
    /// Join semantics let independent registration calls cooperatively
    /// build the same path: joining an open child with a matching (or
    /// unspecified) access level returns it unchanged, so the operation is
    /// idempotent under replay. Creation is the non-idempotent arm and
    /// fails on an existing name.
    pub(crate) fn create_or_join(
        &self,
        parent: &NodeData,
        name: &str,
        join: bool,
        access: Option<AccessLevel>,
    ) -> Result<Node, RegistryError> {
        if !is_valid_segment(name) {
            return Err(RegistryError::Syntax(format!(
                "invalid namespace name '{name}'"
            )));
        }
        if let Some(existing) = parent.child(name) {
            if !join {
                return Err(RegistryError::State(format!(
                    "namespace '{name}' already exists"
                )));
            }
            if existing.is_sealed() {
                return Err(RegistryError::State(format!(
                    "cannot join a sealed namespace: '{name}'"
                )));
            }
            if let Some(level) = access {
                if level != existing.access() {
                    return Err(RegistryError::State(format!(
                        "cannot join namespace '{name}' by declaring a different access level"
                    )));
                }
            }
            return Ok(existing);
        }
        self.create_under(parent, name, access.unwrap_or_default())
    }

    fn create_root(&self, name: &str) -> Result<Node, RegistryError> {
        if !is_valid_segment(name) {
            return Err(RegistryError::Syntax(format!(
                "invalid namespace name '{name}'"
            )));
        }
        let mut roots = self.roots.write();
        let node = roots
            .entry(name.to_string())
            .or_insert_with(|| NodeData::new(AccessLevel::Public));
        Ok(node.clone())
    }

    fn create_under(
        &self,
        parent: &NodeData,
        name: &str,
        access: AccessLevel,
    ) -> Result<Node, RegistryError> {
        if !is_valid_segment(name) {
            return Err(RegistryError::Syntax(format!(
                "invalid namespace name '{name}'"
            )));
        }
        if parent.is_sealed() {
            return Err(RegistryError::State(format!(
                "cannot create '{name}' inside a sealed namespace"
            )));
        }
        let child = NodeData::new(access);
        parent.insert_child(name.to_string(), child.clone());
        Ok(child)
    }
}
