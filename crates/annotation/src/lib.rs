//! Guard annotation model and parser.
//!
//! A guard annotation is a `@guard:` directive embedded in a source comment:
//!
//! ```text
//! # @guard:ai:r.func
//! // @guard:ai[gpt-4]:w,human:r.class
//! def f(): # @guard:ai:n.sig
//! ```
//!
//! * [`parser`]: directive grammar, one line in, zero or one annotation out
//! * [`target`]: open target identities and identifier sub-selectors
//! * [`effect`]: permission levels and the context modifier
//! * [`scope`]: symbolic scopes and explicit line counts
//! * [`comment`]: the comment classifier contract gating parser input

pub mod annotation;
pub mod comment;
pub mod effect;
pub mod parser;
pub mod scope;
pub mod target;

pub use annotation::{GuardAnnotation, TargetClause};
pub use comment::{CommentClassifier, CommentTokens};
pub use effect::{Effect, Permission};
pub use parser::AnnotationParser;
pub use scope::{ScopeKey, ScopeKind, ScopeSelector, ScopeSpec};
pub use target::{Subject, Target, TargetAliases};
