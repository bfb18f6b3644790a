//! Resolution output.

use std::collections::BTreeMap;

use guardtag_annotation::{Permission, Subject, Target};
use guardtag_primitives::{DocumentId, LineNr};
use serde::{Deserialize, Serialize};

/// Effective permissions of one line.
///
/// `context` only holds subjects whose context flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePermission {
	pub line: LineNr,
	pub permissions: BTreeMap<Subject, Permission>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub context: BTreeMap<Subject, bool>,
}

impl LinePermission {
	/// Permission of `target`, narrowed to `identifier` when given.
	///
	/// An identifier without its own entry falls back to its target class.
	pub fn effective(&self, target: &Target, identifier: Option<&str>) -> Option<Permission> {
		self.lookup(&self.permissions, target, identifier).copied()
	}

	/// Returns true if the line is a context region for the subject.
	pub fn is_context(&self, target: &Target, identifier: Option<&str>) -> bool {
		self.lookup(&self.context, target, identifier).copied().unwrap_or(false)
	}

	/// Returns true if any subject has its context flag set.
	pub fn has_context(&self) -> bool {
		self.context.values().any(|flag| *flag)
	}

	fn lookup<'m, V>(&self, map: &'m BTreeMap<Subject, V>, target: &Target, identifier: Option<&str>) -> Option<&'m V> {
		let class = Subject::class(target.clone());
		match identifier {
			Some(id) => map.get(&Subject::member(target.clone(), id)).or_else(|| map.get(&class)),
			None => map.get(&class),
		}
	}
}

/// Per-line permissions of one document version.
///
/// Row 0 holds the baseline defaults; row `n` describes document line `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTable {
	pub document: DocumentId,
	pub version: u64,
	pub unknown_target: Permission,
	lines: Vec<LinePermission>,
}

impl PermissionTable {
	pub fn new(document: DocumentId, version: u64, unknown_target: Permission, lines: Vec<LinePermission>) -> Self {
		Self {
			document,
			version,
			unknown_target,
			lines,
		}
	}

	/// The baseline row.
	pub fn baseline(&self) -> Option<&LinePermission> {
		self.lines.first()
	}

	/// Row of `line`; line 0 is the baseline.
	pub fn line(&self, line: LineNr) -> Option<&LinePermission> {
		self.lines.get(line)
	}

	/// Permission of a subject on `line`, falling back to `unknown_target`.
	pub fn permission_at(&self, line: LineNr, target: &Target, identifier: Option<&str>) -> Option<Permission> {
		self.line(line)
			.map(|row| row.effective(target, identifier).unwrap_or(self.unknown_target))
	}

	/// All rows, baseline first.
	pub fn rows(&self) -> &[LinePermission] {
		&self.lines
	}

	/// Rows of document lines, baseline excluded.
	pub fn document_lines(&self) -> &[LinePermission] {
		self.lines.get(1..).unwrap_or(&[])
	}

	/// Number of document lines covered.
	pub fn len(&self) -> usize {
		self.lines.len().saturating_sub(1)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
