//! Permission stack engine.
//!
//! A single top-to-bottom pass over lines `0..=N` with a stack of immutable
//! [`StackEntry`] values. The baseline entry spans the whole document and is
//! never popped.
//!
//! Per line:
//! 1. pop entries that ended before the line; each pop also discards context
//!    entries it exposes, so a context region never resumes
//! 2. push one entry per annotation activating on the line, inheriting from
//!    the nearest entry that contains it
//! 3. read the line's permissions off the top, applying the context and
//!    trailing-blank rules

use std::collections::BTreeMap;

use guardtag_annotation::{GuardAnnotation, Permission, Subject};
use guardtag_primitives::{LineNr, ScopeBoundary};

use crate::config::EngineConfig;
use crate::error::ResolveError;
use crate::scan::DocumentScan;
use crate::table::LinePermission;

/// One scope on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
	pub permissions: BTreeMap<Subject, Permission>,
	/// Subjects whose context flag is set.
	pub context: BTreeMap<Subject, bool>,
	pub start: LineNr,
	pub end: LineNr,
	pub line_limited: bool,
	pub whole_file: bool,
	/// Line of the producing directive; `None` for the baseline.
	pub source: Option<LineNr>,
}

impl StackEntry {
	/// The synthetic entry spanning `[0, total]`.
	pub fn baseline(permissions: BTreeMap<Subject, Permission>, total: usize) -> Self {
		Self {
			permissions,
			context: BTreeMap::new(),
			start: 0,
			end: total,
			line_limited: false,
			whole_file: false,
			source: None,
		}
	}

	/// Entry for `annotation` over `boundary`, starting from `parent`'s state.
	///
	/// Clauses apply in order, so the last clause for a subject wins. A clause
	/// for a whole target class replaces the overrides of its members.
	pub fn derive(parent: &StackEntry, annotation: &GuardAnnotation, boundary: ScopeBoundary) -> Self {
		let mut permissions = parent.permissions.clone();
		let mut context = parent.context.clone();

		for clause in &annotation.clauses {
			let subject = &clause.subject;
			let Some(level) = clause.effect.permission() else {
				context.insert(subject.clone(), true);
				continue;
			};
			if subject.is_class() {
				permissions.retain(|s, _| s.is_class() || s.target != subject.target);
				context.retain(|s, _| s.is_class() || s.target != subject.target);
			}
			permissions.insert(subject.clone(), level);
			context.remove(subject);
		}

		Self {
			permissions,
			context,
			start: boundary.start(),
			end: boundary.end(),
			line_limited: annotation.scope.is_line_limited(),
			whole_file: annotation.scope.is_whole_file(),
			source: Some(annotation.line),
		}
	}

	pub fn contains(&self, line: LineNr) -> bool {
		self.start <= line && line <= self.end
	}

	pub fn has_context(&self) -> bool {
		self.context.values().any(|flag| *flag)
	}

	pub fn is_baseline(&self) -> bool {
		self.source.is_none()
	}

	fn row(&self, line: LineNr) -> LinePermission {
		LinePermission {
			line,
			permissions: self.permissions.clone(),
			context: self.context.clone(),
		}
	}
}

/// Computes per-line permissions from resolved annotations.
#[derive(Debug, Clone)]
pub struct StackEngine {
	baseline: BTreeMap<Subject, Permission>,
}

impl StackEngine {
	pub fn new(baseline: BTreeMap<Subject, Permission>) -> Self {
		Self { baseline }
	}

	pub fn from_config(config: &EngineConfig) -> Self {
		Self::new(config.baseline())
	}

	/// Runs the pass. Returns one row per line, baseline row first.
	///
	/// Every annotation must carry a boundary. An annotation activates on
	/// its directive line, or on its boundary start when the boundary begins
	/// further down.
	pub fn run(&self, annotations: &[GuardAnnotation], scan: &DocumentScan) -> Result<Vec<LinePermission>, ResolveError> {
		let total = scan.total_lines;
		let mut order = Vec::with_capacity(annotations.len());
		for annotation in annotations {
			let boundary = annotation
				.boundary()
				.ok_or_else(|| ResolveError::internal(annotation.line, "annotation has no resolved boundary"))?;
			order.push((boundary.start().max(annotation.line), boundary, annotation));
		}
		order.sort_by_key(|(activation, _, _)| *activation);

		let mut pass = Pass {
			stack: vec![StackEntry::baseline(self.baseline.clone(), total)],
			scan,
		};
		let mut rows = Vec::with_capacity(total + 1);
		let mut next = 0;

		for line in 0..=total {
			pass.pop_expired(line);

			while let Some(&(activation, boundary, annotation)) = order.get(next)
				&& activation == line
			{
				next += 1;
				pass.purge_context();
				let parent = pass
					.nearest_containing(line)
					.ok_or_else(|| ResolveError::internal(line, "no scope contains the line"))?;
				let entry = StackEntry::derive(parent, annotation, boundary);
				pass.stack.push(entry);
			}

			rows.push(pass.report(line)?);
		}

		tracing::trace!(lines = total, annotations = annotations.len(), "stack pass complete");
		Ok(rows)
	}
}

/// State of one run.
struct Pass<'a> {
	stack: Vec<StackEntry>,
	scan: &'a DocumentScan,
}

impl Pass<'_> {
	fn pop_expired(&mut self, line: LineNr) {
		while self.stack.len() > 1 && self.stack.last().is_some_and(|top| top.end < line) {
			self.stack.pop();
			self.purge_context();
		}
	}

	/// Drops context entries from the top; they cannot be resumed.
	fn purge_context(&mut self) {
		while self.stack.len() > 1 && self.stack.last().is_some_and(StackEntry::has_context) {
			self.stack.pop();
		}
	}

	fn nearest_containing(&self, line: LineNr) -> Option<&StackEntry> {
		self.stack.iter().rev().find(|entry| entry.contains(line))
	}

	fn report(&self, line: LineNr) -> Result<LinePermission, ResolveError> {
		let (top, below) = self
			.stack
			.split_last()
			.ok_or_else(|| ResolveError::internal(line, "scope stack is empty"))?;
		let under = || below.iter().rev().find(|entry| entry.contains(line));

		if top.has_context() {
			if !top.whole_file
				&& self.is_trailing_blank(line, top)
				&& let Some(entry) = under()
			{
				return Ok(entry.row(line));
			}
			return Ok(context_row(line, top, below));
		}

		if !top.whole_file
			&& !top.line_limited
			&& !top.is_baseline()
			&& self.is_trailing_blank(line, top)
			&& let Some(entry) = under()
		{
			return Ok(entry.row(line));
		}

		Ok(top.row(line))
	}

	/// Returns true if `line` and every line up to the next directive or the
	/// entry's end are blank.
	fn is_trailing_blank(&self, line: LineNr, entry: &StackEntry) -> bool {
		if !self.scan.is_blank(line) {
			return false;
		}
		let limit = self
			.scan
			.next_annotation_after(line)
			.map_or(entry.end, |next| entry.end.min(next - 1));
		(line..=limit).all(|l| self.scan.is_blank(l))
	}
}

/// Row for a context entry: flags from the entry, levels of flagged subjects
/// from the nearest non-context entry beneath it.
fn context_row(line: LineNr, top: &StackEntry, below: &[StackEntry]) -> LinePermission {
	let mut row = top.row(line);
	let Some(base) = below
		.iter()
		.rev()
		.find(|entry| !entry.has_context() && entry.contains(line))
	else {
		return row;
	};
	for (subject, _) in top.context.iter().filter(|(_, flag)| **flag) {
		match base.permissions.get(subject) {
			Some(level) => row.permissions.insert(subject.clone(), *level),
			None => row.permissions.remove(subject),
		};
	}
	row
}

#[cfg(test)]
mod tests;
