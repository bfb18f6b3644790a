//! Symbolic scopes and explicit line counts.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A semantic region a directive can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
	/// Declaration head of a function or method, up to its body.
	Signature,
	/// Body of a function, method or class.
	Body,
	Function,
	Method,
	Class,
	/// A compound statement or literal block; falls back to "until the next directive".
	Block,
	Statement,
	/// The whole document, trailing whitespace included.
	File,
}

impl ScopeKind {
	const KEYWORDS: [(&'static str, ScopeKind); 13] = [
		("sig", ScopeKind::Signature),
		("signature", ScopeKind::Signature),
		("body", ScopeKind::Body),
		("func", ScopeKind::Function),
		("function", ScopeKind::Function),
		("fn", ScopeKind::Function),
		("method", ScopeKind::Method),
		("class", ScopeKind::Class),
		("cls", ScopeKind::Class),
		("block", ScopeKind::Block),
		("stmt", ScopeKind::Statement),
		("statement", ScopeKind::Statement),
		("file", ScopeKind::File),
	];

	/// Parses a scope keyword, case-insensitively.
	pub fn parse(token: &str) -> Option<Self> {
		let token = token.trim().to_ascii_lowercase();
		Self::KEYWORDS.iter().find(|(kw, _)| *kw == token).map(|(_, kind)| *kind)
	}

	/// Canonical keyword, matching the keys of language-scope configurations.
	pub fn keyword(self) -> &'static str {
		match self {
			ScopeKind::Signature => "sig",
			ScopeKind::Body => "body",
			ScopeKind::Function => "func",
			ScopeKind::Method => "method",
			ScopeKind::Class => "class",
			ScopeKind::Block => "block",
			ScopeKind::Statement => "stmt",
			ScopeKind::File => "file",
		}
	}
}

impl fmt::Display for ScopeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.keyword())
	}
}

/// A scope keyword with optional added and removed sub-scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeSpec {
	pub kind: ScopeKind,
	#[serde(default, skip_serializing_if = "SmallVec::is_empty")]
	pub add: SmallVec<[ScopeKind; 2]>,
	#[serde(default, skip_serializing_if = "SmallVec::is_empty")]
	pub remove: SmallVec<[ScopeKind; 2]>,
}

impl ScopeSpec {
	pub fn new(kind: ScopeKind) -> Self {
		Self {
			kind,
			add: SmallVec::new(),
			remove: SmallVec::new(),
		}
	}

	pub fn with_add(mut self, kind: ScopeKind) -> Self {
		self.add.push(kind);
		self
	}

	pub fn with_remove(mut self, kind: ScopeKind) -> Self {
		self.remove.push(kind);
		self
	}

	/// Canonical cache key, e.g. `func+sig-body`.
	pub fn key(&self) -> ScopeKey {
		ScopeKey(Arc::from(self.to_string()))
	}
}

impl fmt::Display for ScopeSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.kind.keyword())?;
		for kind in &self.add {
			write!(f, "+{}", kind.keyword())?;
		}
		for kind in &self.remove {
			write!(f, "-{}", kind.keyword())?;
		}
		Ok(())
	}
}

/// Canonical text of a [`ScopeSpec`], used to key cached boundaries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeKey(Arc<str>);

impl ScopeKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ScopeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// How a directive's extent is expressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeSelector {
	/// No scope: runs to the end of the document or the next directive for the same targets.
	Unscoped,
	/// The directive line plus the next `n` lines.
	Lines(NonZeroUsize),
	/// A symbolic scope resolved against the syntax tree.
	Semantic(ScopeSpec),
}

impl ScopeSelector {
	/// Returns true for explicit line counts.
	pub fn is_line_limited(&self) -> bool {
		matches!(self, ScopeSelector::Lines(_))
	}

	/// Returns true for the whole-file scope.
	pub fn is_whole_file(&self) -> bool {
		matches!(self, ScopeSelector::Semantic(spec) if spec.kind == ScopeKind::File)
	}

	/// Returns true for scopes that extend until something terminates them.
	pub fn is_block_style(&self) -> bool {
		match self {
			ScopeSelector::Unscoped => true,
			ScopeSelector::Semantic(spec) => spec.kind == ScopeKind::Block,
			ScopeSelector::Lines(_) => false,
		}
	}

	pub fn spec(&self) -> Option<&ScopeSpec> {
		match self {
			ScopeSelector::Semantic(spec) => Some(spec),
			_ => None,
		}
	}
}

impl fmt::Display for ScopeSelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScopeSelector::Unscoped => f.write_str("(open)"),
			ScopeSelector::Lines(n) => write!(f, "{n} lines"),
			ScopeSelector::Semantic(spec) => spec.fmt(f),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_accept_aliases() {
		assert_eq!(ScopeKind::parse("FUNC"), Some(ScopeKind::Function));
		assert_eq!(ScopeKind::parse("signature"), Some(ScopeKind::Signature));
		assert_eq!(ScopeKind::parse("cls"), Some(ScopeKind::Class));
		assert_eq!(ScopeKind::parse("loop"), None);
		assert_eq!(ScopeKind::parse("document"), None);
	}

	#[test]
	fn key_is_canonical() {
		let spec = ScopeSpec::new(ScopeKind::Function)
			.with_add(ScopeKind::Signature)
			.with_remove(ScopeKind::Body);
		assert_eq!(spec.key().as_str(), "func+sig-body");
	}

	#[test]
	fn selector_classification() {
		assert!(ScopeSelector::Unscoped.is_block_style());
		assert!(ScopeSelector::Semantic(ScopeSpec::new(ScopeKind::Block)).is_block_style());
		assert!(!ScopeSelector::Semantic(ScopeSpec::new(ScopeKind::Class)).is_block_style());
		assert!(ScopeSelector::Semantic(ScopeSpec::new(ScopeKind::File)).is_whole_file());
		assert!(ScopeSelector::Lines(NonZeroUsize::new(3).unwrap()).is_line_limited());
	}
}
