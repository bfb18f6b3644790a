//! Document accessor contract.
//!
//! The resolution engine never owns document text. It reads lines through
//! [`DocumentAccess`], which editors and tools implement over their own
//! buffers. [`TextDocument`] is a rope-backed implementation used by the CLI
//! and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use ropey::Rope;
use thiserror::Error;

use crate::ids::DocumentId;
use crate::lines::{EditRange, LineNr};
use crate::rope::{document_line_count, line_text};

/// Errors returned when a single line cannot be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineReadError {
	/// The line number is outside the document.
	#[error("line {line} is out of range (document has {len} lines)")]
	OutOfRange { line: LineNr, len: usize },

	/// The backing store could not produce text for the line.
	#[error("line {line} is unreadable: {reason}")]
	Unreadable { line: LineNr, reason: String },
}

/// Read access to a document's text and metadata.
pub trait DocumentAccess: Send + Sync {
	/// Stable identifier of the document.
	fn id(&self) -> DocumentId;

	/// Monotonically increasing content version.
	fn version(&self) -> u64;

	/// Language identifier (e.g., "python", "rust"), if known.
	fn language_id(&self) -> Option<String>;

	/// Number of lines in the document.
	fn line_count(&self) -> usize;

	/// Text of 1-based `line` without its line ending.
	fn line(&self, line: LineNr) -> Result<String, LineReadError>;
}

/// A rope-backed document with an atomic version counter.
#[derive(Debug)]
pub struct TextDocument {
	id: DocumentId,
	language: Option<String>,
	content: RwLock<Rope>,
	version: AtomicU64,
}

impl TextDocument {
	/// Creates a document at version 0 with a fresh [`DocumentId`].
	pub fn new(text: &str, language: Option<&str>) -> Self {
		Self::with_id(DocumentId::next(), text, language)
	}

	/// Creates a document with an explicit id.
	pub fn with_id(id: DocumentId, text: &str, language: Option<&str>) -> Self {
		Self {
			id,
			language: language.map(str::to_owned),
			content: RwLock::new(Rope::from_str(text)),
			version: AtomicU64::new(0),
		}
	}

	/// Replaces the whole text and bumps the version.
	pub fn set_text(&self, text: &str) -> u64 {
		*self.content.write() = Rope::from_str(text);
		self.version.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Replaces lines `[start, end]` with `replacement` lines and bumps the version.
	///
	/// Returns the matching [`EditRange`], whose `line_delta` is the change in
	/// line count. Out-of-range lines are clamped to the document end.
	pub fn replace_lines(&self, start: LineNr, end: LineNr, replacement: &[&str]) -> EditRange {
		let mut rope = self.content.write();
		let len = document_line_count(rope.slice(..));
		let start = start.clamp(1, len.max(1));
		let end = end.clamp(start, len.max(start));

		let mut lines: Vec<String> = (1..=len).filter_map(|l| line_text(rope.slice(..), l)).collect();
		let removed = lines.len().min(end).saturating_sub(start - 1);
		let tail = lines.split_off((start - 1).min(lines.len()));
		lines.extend(replacement.iter().map(|s| (*s).to_owned()));
		lines.extend(tail.into_iter().skip(removed));

		let mut text = lines.join("\n");
		if !text.is_empty() {
			text.push('\n');
		}
		*rope = Rope::from_str(&text);
		drop(rope);

		self.version.fetch_add(1, Ordering::AcqRel);
		EditRange::with_delta(start, end, replacement.len() as isize - removed as isize)
	}

	/// Returns a snapshot of the full text.
	pub fn text(&self) -> String {
		self.content.read().to_string()
	}
}

impl DocumentAccess for TextDocument {
	fn id(&self) -> DocumentId {
		self.id
	}

	fn version(&self) -> u64 {
		self.version.load(Ordering::Acquire)
	}

	fn language_id(&self) -> Option<String> {
		self.language.clone()
	}

	fn line_count(&self) -> usize {
		document_line_count(self.content.read().slice(..))
	}

	fn line(&self, line: LineNr) -> Result<String, LineReadError> {
		let rope = self.content.read();
		line_text(rope.slice(..), line).ok_or(LineReadError::OutOfRange {
			line,
			len: document_line_count(rope.slice(..)),
		})
	}
}

#[cfg(test)]
mod tests;
