//! Import resolution: access checks, seal checks, specifier evaluation.

use crate::core::error::RegistryError;
use crate::core::export::{Export, ExportSnapshot};
use crate::core::node::{AccessLevel, Node};
use crate::core::specifier::parse_specifier;
use crate::core::tree::{path_is_prefix, NamespaceTree};

/// One resolved entry of an import specifier list.
///
/// A whole-namespace specifier contributes exactly one `Namespace` entry; a
/// specifier listing N symbols contributes N `Symbol` entries in listed
/// order, so entries line up one-to-one with the declaration.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Shallow-copied snapshot of a whole namespace's exports.
    Namespace(ExportSnapshot),
    /// A single named symbol. `value` is `None` when the symbol is not
    /// exported by the target namespace (the resolver's documented lenient
    /// default; see [`crate::RegistryConfig::strict_imports`]).
    Symbol {
        name: String,
        value: Option<Export>,
    },
}

impl Resolved {
    /// The snapshot, for `Namespace` entries.
    pub fn as_namespace(&self) -> Option<&ExportSnapshot> {
        match self {
            Resolved::Namespace(snap) => Some(snap),
            Resolved::Symbol { .. } => None,
        }
    }

    /// The symbol value, for present `Symbol` entries.
    pub fn as_symbol(&self) -> Option<&Export> {
        match self {
            Resolved::Symbol { value, .. } => value.as_ref(),
            Resolved::Namespace(_) => None,
        }
    }
}

/// Resolve `path` on behalf of `caller_path` and run the import gates:
/// private never imports, protected imports only into namespaces nested
/// under (or equal to) the target, and unsealed targets are incomplete.
pub(crate) fn resolve_importable(
    tree: &NamespaceTree,
    path: &str,
    caller_path: &str,
) -> Result<Node, RegistryError> {
    let node = tree.resolve(path)?;
    match node.access() {
        AccessLevel::Private => {
            return Err(RegistryError::Access(format!(
                "namespace is private: {path}"
            )));
        }
        AccessLevel::Protected => {
            if !path_is_prefix(path, caller_path) {
                return Err(RegistryError::Access(format!(
                    "namespace is protected and only nested namespaces may import it: {path}"
                )));
            }
        }
        AccessLevel::Public => {}
    }
    if !node.is_sealed() {
        return Err(RegistryError::State(format!(
            "namespace is not sealed yet: {path}"
        )));
    }
    Ok(node)
}

/// Evaluate one import specifier for `caller_path`, appending the resolved
/// entries to `out` in declaration order.
///
/// With `strict` unset, a listed symbol missing from the target resolves to
/// an absent entry instead of failing; with `strict` set it is a
/// `NotFound` error.
pub(crate) fn resolve_specifier(
    tree: &NamespaceTree,
    specifier: &str,
    caller_path: &str,
    strict: bool,
    out: &mut Vec<Resolved>,
) -> Result<(), RegistryError> {
    let spec = parse_specifier(specifier)?;
    let node = resolve_importable(tree, &spec.path, caller_path)?;

    match spec.symbols {
        Some(names) => {
            for name in names {
                let value = node.export(&name);
                if value.is_none() {
                    if strict {
                        return Err(RegistryError::NotFound(format!(
                            "symbol '{name}' is not exported by namespace '{}'",
                            spec.path
                        )));
                    }
                    tracing::warn!(
                        namespace = %spec.path,
                        symbol = %name,
                        "imported symbol is not exported; resolving to an absent entry"
                    );
                }
                out.push(Resolved::Symbol { name, value });
            }
        }
        None => out.push(Resolved::Namespace(node.snapshot())),
    }
    Ok(())
}
