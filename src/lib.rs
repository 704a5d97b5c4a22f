//! Warren: an in-process hierarchical namespace registry.
//!
//! **Warren lets independently loaded code units register, extend, seal,
//! and cross-reference named groups of exported symbols.**
//!
//! Namespaces form a tree addressed by dotted paths (`util`,
//! `acme.net.http`). Each namespace carries a visibility level and a
//! lifecycle: it is built while *open*, then *sealed* exactly once, after
//! which its exports are final and other namespaces may import them.
//!
//! # Core model
//!
//! - **Sessions**: [`Registry::namespace`] returns a [`Session`] bound to
//!   one path, creating missing segments lazily. Sessions chain:
//!   create/join children, register code, seal.
//! - **Visibility**: `public` namespaces import anywhere, `protected`
//!   only into namespaces nested under them, `private` never.
//! - **Sealing**: an irreversible per-node transition. Unsealed
//!   namespaces are incomplete and refuse importing; sealed ones refuse
//!   further mutation. Children are unaffected.
//! - **Imports**: specifier strings name a whole namespace
//!   (`"util"`) or a symbol subset (`"util: double, half"`); resolution
//!   is ordered and lines up one-to-one with the declarations.
//! - **System namespace**: at most one namespace per registry may
//!   designate itself as the system namespace; every later registration
//!   call observes a frozen snapshot of its exports.
//!
//! # Failure contract
//!
//! Fallible session operations return `None` and record a typed
//! [`RegistryError`] in the registry's last-error slot
//! ([`Registry::last_error`]). The one exception is a second
//! system-namespace designation with a different node, which panics.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use warren::{Export, Registry};
//!
//! let registry = Registry::new();
//!
//! // First registrant: build and seal a public utility namespace.
//! registry
//!     .namespace("util")
//!     .and_then(|ns| {
//!         ns.code(|_importer, _system, exports| {
//!             exports.insert(
//!                 "double",
//!                 Export::func(|args| json!(args[0].as_i64().unwrap_or(0) * 2)),
//!             );
//!         })
//!     })
//!     .and_then(|ns| ns.seal())
//!     .expect("util registration");
//!
//! // Second registrant: consume it by declared import.
//! registry
//!     .namespace("app")
//!     .and_then(|ns| {
//!         ns.code_with_imports(&["util: double"], |_system, _own, imports| {
//!             let double = imports[0].as_symbol().expect("double is exported");
//!             assert_eq!(double.call(&[json!(21)]), Some(json!(42)));
//!         })
//!     })
//!     .expect("app registration");
//! ```
//!
//! # Crate structure
//!
//! - [`core::tree`]: path resolution and create-or-join
//! - [`core::specifier`] / [`core::resolver`]: import specifiers and the
//!   access/seal gates
//! - [`core::session`]: the per-namespace builder handle
//! - [`core::registry`]: the composition-root object hosts construct

pub mod core;

pub use crate::core::error::RegistryError;
pub use crate::core::export::{Export, ExportFn, ExportSnapshot, ExportTable};
pub use crate::core::node::AccessLevel;
pub use crate::core::registry::{Registry, RegistryConfig};
pub use crate::core::resolver::Resolved;
pub use crate::core::session::{Exports, Importer, Session, SystemAccess, SystemDesignator};
pub use crate::core::specifier::{parse_specifier, ImportSpec};
pub use crate::core::system::SetOutcome;
