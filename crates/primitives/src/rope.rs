//! Rope utilities for line-oriented access.

use ropey::RopeSlice;

use crate::lines::LineNr;

/// Returns the number of document lines.
///
/// Unlike [`RopeSlice::len_lines`], the empty line after a trailing newline is
/// not counted, and empty text has zero lines.
#[inline]
pub fn document_line_count(text: RopeSlice) -> usize {
	if text.len_chars() == 0 {
		return 0;
	}
	let lines = text.len_lines();
	if lines > 1 && text.line(lines - 1).len_chars() == 0 {
		lines - 1
	} else {
		lines
	}
}

/// Returns the text of 1-based `line` without its line ending.
pub fn line_text(text: RopeSlice, line: LineNr) -> Option<String> {
	if line == 0 || line > document_line_count(text) {
		return None;
	}
	let mut content = text.line(line - 1).to_string();
	if content.ends_with('\n') {
		content.pop();
		if content.ends_with('\r') {
			content.pop();
		}
	}
	Some(content)
}
