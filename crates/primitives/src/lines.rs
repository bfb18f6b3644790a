use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based document line number.
///
/// Line `0` never names document text; it is reserved for the baseline row
/// of a permission table.
pub type LineNr = usize;

/// An inclusive line range produced by scope resolution.
///
/// Fields are private to enforce `start <= end`. Construct via
/// [`ScopeBoundary::new`] or [`ScopeBoundary::single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeBoundary {
	start: LineNr,
	end: LineNr,
}

impl ScopeBoundary {
	/// Creates a boundary, returning `None` when `start > end`.
	#[inline]
	pub fn new(start: LineNr, end: LineNr) -> Option<Self> {
		(start <= end).then_some(Self { start, end })
	}

	/// Creates a boundary covering exactly one line.
	#[inline]
	pub fn single(line: LineNr) -> Self {
		Self { start: line, end: line }
	}

	/// First line covered (inclusive).
	#[inline]
	pub fn start(&self) -> LineNr {
		self.start
	}

	/// Last line covered (inclusive).
	#[inline]
	pub fn end(&self) -> LineNr {
		self.end
	}

	/// Number of lines covered.
	#[inline]
	pub fn len(&self) -> usize {
		self.end - self.start + 1
	}

	/// Always false; a boundary covers at least one line.
	#[inline]
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Returns true if `line` falls inside the boundary.
	#[inline]
	pub fn contains(&self, line: LineNr) -> bool {
		self.start <= line && line <= self.end
	}

	/// Returns true if any line of `[start, end]` falls inside the boundary.
	#[inline]
	pub fn overlaps(&self, start: LineNr, end: LineNr) -> bool {
		self.start <= end && start <= self.end
	}

	/// Returns a copy with the end moved to `end`, clamped so the boundary stays valid.
	pub fn with_end(self, end: LineNr) -> Self {
		Self {
			start: self.start,
			end: end.max(self.start),
		}
	}

	/// Shifts both ends by `delta` lines, saturating at line 1.
	pub fn shifted(self, delta: isize) -> Self {
		let shift = |line: LineNr| line.saturating_add_signed(delta).max(1);
		Self {
			start: shift(self.start),
			end: shift(self.end),
		}
	}
}

impl fmt::Display for ScopeBoundary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..={}", self.start, self.end)
	}
}

/// A range of edited lines in pre-edit coordinates.
///
/// `line_delta` is the change in total line count caused by the edit
/// (positive for insertions, negative for deletions). Lines after `end`
/// move by `line_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditRange {
	pub start: LineNr,
	pub end: LineNr,
	#[serde(default)]
	pub line_delta: isize,
}

impl EditRange {
	/// An in-place edit of `[start, end]` that keeps the line count.
	pub fn lines(start: LineNr, end: LineNr) -> Self {
		Self {
			start: start.min(end),
			end: start.max(end),
			line_delta: 0,
		}
	}

	/// An edit of `[start, end]` that changes the line count by `line_delta`.
	pub fn with_delta(start: LineNr, end: LineNr, line_delta: isize) -> Self {
		Self {
			line_delta,
			..Self::lines(start, end)
		}
	}
}
