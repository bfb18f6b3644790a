//! Core types shared by every guardtag crate: document handles, line numbers,
//! scope boundaries and edit ranges.

/// Document accessor trait and a rope-backed implementation.
pub mod document;
/// Identifier types.
pub mod ids;
/// Line numbers, scope boundaries and edit ranges.
pub mod lines;
/// Rope utilities for line-oriented access.
pub mod rope;

pub use document::{DocumentAccess, LineReadError, TextDocument};
pub use ids::DocumentId;
pub use lines::{EditRange, LineNr, ScopeBoundary};
pub use ropey::{Rope, RopeSlice};
