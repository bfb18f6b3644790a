//! Node selection for [`TreeScopeProvider`](super::TreeScopeProvider).
//!
//! A directive governs, in order of preference:
//! 1. the outermost matching node starting on the directive line (inline);
//! 2. the outermost matching node starting on the next code line, with the
//!    boundary pulled up to the directive line;
//! 3. the smallest matching node containing the directive line.

use guardtag_annotation::{ScopeKind, ScopeSpec};
use guardtag_primitives::{LineNr, ScopeBoundary};

use crate::loader::LanguageConfig;
use crate::tree::SyntaxNode;

pub(super) fn select_scope(
	root: &SyntaxNode,
	line: LineNr,
	spec: &ScopeSpec,
	config: &LanguageConfig,
	total_lines: usize,
) -> Option<ScopeBoundary> {
	let kinds = node_kinds(config, spec.kind);
	if kinds.is_empty() {
		return None;
	}
	let matches = |node: &SyntaxNode| kinds.iter().any(|k| *k == node.kind);

	let (node, anchor) = inline(root, line, &matches)
		.map(|n| (n, n.start_line))
		.or_else(|| following(root, line, &matches).map(|n| (n, line)))
		.or_else(|| enclosing(root, line, &matches).map(|n| (n, n.start_line)))?;

	let mut boundary = region(node, spec.kind, config)?;
	for &kind in &spec.add {
		if let Some(extra) = region(node, kind, config) {
			boundary = hull(boundary, extra);
		}
	}
	for &kind in &spec.remove {
		if let Some(cut_out) = region(node, kind, config) {
			boundary = cut(boundary, cut_out);
		}
	}

	if anchor < boundary.start() && boundary.start() == node.start_line {
		boundary = ScopeBoundary::new(anchor, boundary.end())?;
	}
	if total_lines > 0 && boundary.end() > total_lines {
		boundary = ScopeBoundary::new(boundary.start(), total_lines)?;
	}
	Some(boundary)
}

/// Node kinds that realize `kind` in `config`.
fn node_kinds(config: &LanguageConfig, kind: ScopeKind) -> Vec<&str> {
	let of = move |k: ScopeKind| config.node_kinds(k).iter().map(String::as_str);
	match kind {
		ScopeKind::Method if config.node_kinds(ScopeKind::Method).is_empty() => of(ScopeKind::Function).collect(),
		ScopeKind::Signature | ScopeKind::Body => of(ScopeKind::Function)
			.chain(of(ScopeKind::Method))
			.chain(of(ScopeKind::Class))
			.collect(),
		ScopeKind::File => Vec::new(),
		_ => of(kind).collect(),
	}
}

fn inline<'t>(root: &'t SyntaxNode, line: LineNr, matches: &impl Fn(&SyntaxNode) -> bool) -> Option<&'t SyntaxNode> {
	root.walk()
		.map(|(_, node)| node)
		.find(|node| node.start_line == line && !node.is_comment() && matches(node))
}

fn following<'t>(root: &'t SyntaxNode, line: LineNr, matches: &impl Fn(&SyntaxNode) -> bool) -> Option<&'t SyntaxNode> {
	let next = root
		.walk()
		.filter(|(_, node)| node.start_line > line && !node.is_comment())
		.map(|(_, node)| node.start_line)
		.min()?;
	root.walk()
		.map(|(_, node)| node)
		.find(|node| node.start_line == next && matches(node))
}

fn enclosing<'t>(root: &'t SyntaxNode, line: LineNr, matches: &impl Fn(&SyntaxNode) -> bool) -> Option<&'t SyntaxNode> {
	root.walk()
		.map(|(_, node)| node)
		.filter(|node| node.contains_line(line) && matches(node))
		.min_by_key(|node| node.end_line - node.start_line)
}

/// Lines of `node` that `kind` refers to.
fn region(node: &SyntaxNode, kind: ScopeKind, config: &LanguageConfig) -> Option<ScopeBoundary> {
	match kind {
		ScopeKind::Signature => Some(match body_of(node) {
			Some(body) if body.start_line > node.start_line => {
				ScopeBoundary::single(node.start_line).with_end(body.start_line - 1)
			}
			Some(_) => ScopeBoundary::single(node.start_line),
			None => node.boundary(),
		}),
		ScopeKind::Body => body_of(node).map(SyntaxNode::boundary),
		ScopeKind::File => None,
		_ => {
			let kinds = node_kinds(config, kind);
			node.walk()
				.map(|(_, n)| n)
				.find(|n| kinds.contains(&n.kind.as_str()))
				.map(SyntaxNode::boundary)
		}
	}
}

/// The `body` field child, looking through wrapper nodes such as decorated definitions.
fn body_of(node: &SyntaxNode) -> Option<&SyntaxNode> {
	node.child_by_field("body")
		.or_else(|| node.child_by_field("definition").and_then(|def| def.child_by_field("body")))
}

fn hull(a: ScopeBoundary, b: ScopeBoundary) -> ScopeBoundary {
	ScopeBoundary::single(a.start().min(b.start())).with_end(a.end().max(b.end()))
}

/// Removes `part` from `boundary` when it touches either edge.
///
/// Interior cuts cannot be expressed as one range and leave `boundary` unchanged.
fn cut(boundary: ScopeBoundary, part: ScopeBoundary) -> ScopeBoundary {
	if !boundary.overlaps(part.start(), part.end()) {
		return boundary;
	}
	let trimmed = if part.start() <= boundary.start() {
		ScopeBoundary::new(part.end() + 1, boundary.end())
	} else if part.end() >= boundary.end() {
		ScopeBoundary::new(boundary.start(), part.start() - 1)
	} else {
		None
	};
	trimmed.unwrap_or(boundary)
}
