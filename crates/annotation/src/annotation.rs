use guardtag_primitives::{LineNr, ScopeBoundary};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effect::Effect;
use crate::scope::ScopeSelector;
use crate::target::{Subject, Target};

/// One `target[identifier]:effect` pair inside a directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetClause {
	pub subject: Subject,
	pub effect: Effect,
}

impl TargetClause {
	pub fn new(subject: impl Into<Subject>, effect: Effect) -> Self {
		Self {
			subject: subject.into(),
			effect,
		}
	}
}

/// A parsed `@guard:` directive.
///
/// Combined directives (`@guard:ai:w,human:r`) produce one annotation with
/// several clauses, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardAnnotation {
	/// 1-based line carrying the directive.
	pub line: LineNr,
	pub clauses: SmallVec<[TargetClause; 2]>,
	pub scope: ScopeSelector,
	/// Resolved extent; attached once by the scope resolver.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	boundary: Option<ScopeBoundary>,
}

impl GuardAnnotation {
	pub fn new(line: LineNr, clauses: impl IntoIterator<Item = TargetClause>, scope: ScopeSelector) -> Self {
		Self {
			line,
			clauses: clauses.into_iter().collect(),
			scope,
			boundary: None,
		}
	}

	/// The resolved boundary, if the resolver has run.
	pub fn boundary(&self) -> Option<ScopeBoundary> {
		self.boundary
	}

	/// Attaches the resolved boundary. Returns false if one was already attached.
	pub fn attach_boundary(&mut self, boundary: ScopeBoundary) -> bool {
		if self.boundary.is_some() {
			return false;
		}
		self.boundary = Some(boundary);
		true
	}

	/// Returns a copy with `boundary` attached, replacing any previous one.
	pub fn with_boundary(mut self, boundary: ScopeBoundary) -> Self {
		self.boundary = Some(boundary);
		self
	}

	/// Returns true if the directive carries no clauses.
	pub fn is_empty(&self) -> bool {
		self.clauses.is_empty()
	}

	/// Targets assigned a permission level (context clauses excluded).
	pub fn permission_targets(&self) -> impl Iterator<Item = &Target> {
		self.clauses.iter().filter(|c| !c.effect.is_context()).map(|c| &c.subject.target)
	}

	/// Targets touched by any clause.
	pub fn targets(&self) -> impl Iterator<Item = &Target> {
		self.clauses.iter().map(|c| &c.subject.target)
	}

	/// Returns true if every clause is a context marker.
	pub fn is_context_only(&self) -> bool {
		!self.clauses.is_empty() && self.clauses.iter().all(|c| c.effect.is_context())
	}
}
