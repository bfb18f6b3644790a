//! Guard annotation resolution engine.
//!
//! One resolution pass turns a document into a [`PermissionTable`]:
//!
//! 1. [`scan`]: comment lines are classified and parsed into annotations
//! 2. [`resolver`]: every annotation gets a concrete boundary; symbolic
//!    scopes go through the [`ResolutionCache`] and, on a miss, one batched
//!    async provider phase
//! 3. [`tighten`]: open block scopes are cut back at the next directive for
//!    the same targets
//! 4. [`stack`]: a synchronous stack machine computes the per-line permissions
//!
//! [`GuardSession`] drives passes per document, serializes them, discards
//! passes that raced an edit and keeps the last published table.

#![deny(clippy::print_stderr)]

pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scan;
pub mod session;
pub mod stack;
pub mod table;
pub mod tighten;

pub use cache::{CacheRegistry, ResolutionCache, ScopeOutcome};
pub use config::{ConfigError, EngineConfig};
pub use error::ResolveError;
pub use resolver::{CacheFill, Resolved, ScopeResolver};
pub use scan::{DocumentScan, scan_document};
pub use session::GuardSession;
pub use stack::{StackEngine, StackEntry};
pub use table::{LinePermission, PermissionTable};
pub use tighten::tighten_boundaries;
