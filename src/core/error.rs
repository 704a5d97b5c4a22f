use thiserror::Error;

/// Recoverable failure taxonomy for registry operations.
///
/// Every variant is surfaced the same way: the offending call returns
/// `None` and the error is recorded in the registry's last-error slot
/// (see [`crate::core::registry::Registry::last_error`]).
///
/// Consistency violations (designating the system namespace twice with
/// different nodes) are not represented here. They panic, because they
/// indicate a programming error in the host process rather than a state
/// the caller can continue past.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed namespace path, segment name, or import specifier.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A path or symbol did not resolve to anything.
    #[error("not found: {0}")]
    NotFound(String),
    /// Visibility rules forbid the requested import.
    #[error("access denied: {0}")]
    Access(String),
    /// The operation conflicts with a node's lifecycle state, such as
    /// sealing twice or mutating a sealed namespace.
    #[error("invalid state: {0}")]
    State(String),
}
