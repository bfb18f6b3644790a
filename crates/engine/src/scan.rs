//! Document scanning.
//!
//! Reads every line once, offers comment lines to the parser and records
//! which lines are blank for the trailing-whitespace rules and which carry
//! comments or docstring text for context regions.

use guardtag_annotation::{AnnotationParser, CommentClassifier, GuardAnnotation};
use guardtag_primitives::{DocumentAccess, LineNr};

/// Annotations and line shape of one document version.
#[derive(Debug, Clone, Default)]
pub struct DocumentScan {
	pub total_lines: usize,
	/// Annotations in ascending line order.
	pub annotations: Vec<GuardAnnotation>,
	blank: Vec<bool>,
	/// Comment lines and lines inside documentation blocks.
	commentary: Vec<bool>,
}

impl DocumentScan {
	/// Builds a scan from parts. `blank[i]` describes line `i + 1`.
	pub fn new(mut annotations: Vec<GuardAnnotation>, blank: Vec<bool>) -> Self {
		annotations.sort_by_key(|a| a.line);
		Self {
			total_lines: blank.len(),
			annotations,
			commentary: vec![false; blank.len()],
			blank,
		}
	}

	/// Marks comment and docstring lines. `commentary[i]` describes line `i + 1`.
	pub fn with_commentary(mut self, commentary: Vec<bool>) -> Self {
		self.commentary = commentary;
		self
	}

	/// Returns true if `line` holds only whitespace. Line 0 and lines past the end are not blank.
	pub fn is_blank(&self, line: LineNr) -> bool {
		line.checked_sub(1)
			.and_then(|idx| self.blank.get(idx))
			.copied()
			.unwrap_or(false)
	}

	/// Returns true if `line` is a comment or lies inside a documentation block.
	pub fn is_commentary(&self, line: LineNr) -> bool {
		line.checked_sub(1)
			.and_then(|idx| self.commentary.get(idx))
			.copied()
			.unwrap_or(false)
	}

	/// Last line of the comment or docstring run directly below `line`, or
	/// `line` itself when code or a blank line follows.
	pub fn comment_block_end(&self, line: LineNr) -> LineNr {
		let mut end = line;
		while self.is_commentary(end + 1) {
			end += 1;
		}
		end
	}

	/// Line of the first annotation after `line`.
	pub fn next_annotation_after(&self, line: LineNr) -> Option<LineNr> {
		let idx = self.annotations.partition_point(|a| a.line <= line);
		self.annotations.get(idx).map(|a| a.line)
	}

	/// Moves `end` back past blank lines, never before `floor`.
	pub fn trim_trailing_blanks(&self, floor: LineNr, mut end: LineNr) -> LineNr {
		while end > floor && self.is_blank(end) {
			end -= 1;
		}
		end
	}
}

/// Scans `doc` for guard annotations.
///
/// Unreadable lines are logged and skipped; they count as non-blank.
pub fn scan_document(
	doc: &dyn DocumentAccess,
	parser: &AnnotationParser,
	classifier: &dyn CommentClassifier,
) -> DocumentScan {
	let language = doc.language_id();
	let total = doc.line_count();
	let mut annotations = Vec::new();
	let mut blank = Vec::with_capacity(total);
	let mut commentary = Vec::with_capacity(total);
	let mut open_block: Option<&'static str> = None;

	for line in 1..=total {
		let text = match doc.line(line) {
			Ok(text) => text,
			Err(error) => {
				tracing::warn!(doc_id = %doc.id(), line, %error, "skipping unreadable line");
				blank.push(false);
				commentary.push(false);
				continue;
			}
		};
		blank.push(text.trim().is_empty());

		let is_comment = classifier.is_comment(&text, language.as_deref());
		let in_block = match open_block {
			Some(close) => {
				if text.contains(close) {
					open_block = None;
				}
				true
			}
			None => match doc_block_start(&text) {
				Some((close, closed)) => {
					if !closed {
						open_block = Some(close);
					}
					true
				}
				None => false,
			},
		};
		commentary.push(in_block || is_comment);

		if is_comment && let Some(annotation) = parser.parse(line, &text) {
			tracing::trace!(doc_id = %doc.id(), line, clauses = annotation.clauses.len(), scope = %annotation.scope, "found guard annotation");
			annotations.push(annotation);
		}
	}

	DocumentScan {
		total_lines: total,
		annotations,
		blank,
		commentary,
	}
}

/// Delimiters of multi-line documentation blocks.
const DOC_BLOCKS: [(&str, &str); 4] = [("\"\"\"", "\"\"\""), ("'''", "'''"), ("/*", "*/"), ("<!--", "-->")];

/// Closing delimiter of a documentation block starting on `text`, and
/// whether it also closes on that line.
fn doc_block_start(text: &str) -> Option<(&'static str, bool)> {
	let trimmed = text.trim_start();
	DOC_BLOCKS.iter().find_map(|(open, close)| {
		let rest = trimmed.strip_prefix(open)?;
		Some((*close, rest.contains(close)))
	})
}
