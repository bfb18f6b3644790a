// Library crate: diagnostics go through tracing, never stderr.
#![deny(clippy::print_stderr)]

//! Language metadata and syntax-tree scope resolution.
//!
//! # Architecture
//!
//! * [`config`]: language-scope configuration (JSON) with `extends` inheritance
//! * [`loader`]: language registry keyed by name, extension and filename
//! * [`tree`]: in-memory syntax tree handed over by an external parser
//! * [`provider`]: the [`ScopeProvider`] contract and a tree-backed implementation
//!
//! The engine never parses source code itself. Editors that already hold a
//! tree-sitter tree adapt it to [`SyntaxNode`] through a [`TreeSource`];
//! languages without a source fall back to the engine's heuristics.

pub mod config;
pub mod loader;
pub mod provider;
pub mod tree;

pub use config::{LanguageConfigError, LanguageEntry, LanguageScopeFile, ScopeTable};
pub use loader::{LanguageConfig, LanguageId, LanguageLoader};
pub use provider::{NoProvider, ProviderError, ScopeProvider, ScopeQuery, TreeScopeProvider, TreeSource};
pub use tree::SyntaxNode;
