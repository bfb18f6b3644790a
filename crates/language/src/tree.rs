//! Line-granular syntax trees.
//!
//! [`SyntaxNode`] is the shape scope selection works on: a node kind, the
//! field name it occupies in its parent, and the 1-based lines it spans.
//! Parsers convert their concrete trees into this form.

use guardtag_primitives::{LineNr, ScopeBoundary};
use serde::{Deserialize, Serialize};

/// A syntax node spanning `start_line..=end_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field: Option<String>,
	pub start_line: LineNr,
	pub end_line: LineNr,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
	/// Creates a leaf node. `end_line` is clamped to at least `start_line`.
	pub fn new(kind: impl Into<String>, start_line: LineNr, end_line: LineNr) -> Self {
		Self {
			kind: kind.into(),
			field: None,
			start_line,
			end_line: end_line.max(start_line),
			children: Vec::new(),
		}
	}

	/// Sets the field name this node occupies in its parent.
	pub fn with_field(mut self, field: impl Into<String>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn with_child(mut self, child: SyntaxNode) -> Self {
		self.children.push(child);
		self
	}

	pub fn with_children(mut self, children: impl IntoIterator<Item = SyntaxNode>) -> Self {
		self.children.extend(children);
		self
	}

	/// Lines covered by the node.
	pub fn boundary(&self) -> ScopeBoundary {
		ScopeBoundary::single(self.start_line).with_end(self.end_line)
	}

	pub fn contains_line(&self, line: LineNr) -> bool {
		self.start_line <= line && line <= self.end_line
	}

	/// First direct child occupying `field`.
	pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
		self.children.iter().find(|c| c.field.as_deref() == Some(field))
	}

	/// Returns true for comment nodes, which never start a scope.
	pub fn is_comment(&self) -> bool {
		self.kind.contains("comment")
	}

	/// Pre-order traversal with each node's depth (root is 0).
	pub fn walk(&self) -> impl Iterator<Item = (usize, &SyntaxNode)> {
		let mut stack = vec![(0, self)];
		std::iter::from_fn(move || {
			let (depth, node) = stack.pop()?;
			stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
			Some((depth, node))
		})
	}
}
