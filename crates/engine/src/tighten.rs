//! Boundary tightening.
//!
//! Open block-style scopes are resolved to the end of the file before the
//! whole annotation list is known. Once it is, each such scope is cut back
//! to the line before the next open directive that assigns a permission to
//! one of its targets, then trimmed past trailing blank lines.
//!
//! Line-limited and semantically bounded directives never terminate an open
//! scope: the open scope resumes once they end.

use guardtag_annotation::GuardAnnotation;

use crate::scan::DocumentScan;

/// Tightens the boundaries of `annotations` in place. Returns the number changed.
///
/// `annotations` must be in ascending line order with boundaries attached.
pub fn tighten_boundaries(annotations: &mut [GuardAnnotation], scan: &DocumentScan) -> usize {
	let total = scan.total_lines;
	let mut changed = 0;

	for idx in 0..annotations.len() {
		let (head, tail) = annotations.split_at_mut(idx + 1);
		let annotation = &mut head[idx];
		let Some(boundary) = annotation.boundary() else {
			continue;
		};
		if !annotation.scope.is_block_style() || boundary.end() < total {
			continue;
		}

		let terminator = tail.iter().find(|next| {
			next.line > annotation.line
				&& is_open(next, total)
				&& next.permission_targets().any(|t| annotation.targets().any(|own| own == t))
		});
		let Some(terminator) = terminator else {
			continue;
		};

		let end = scan.trim_trailing_blanks(annotation.line, terminator.line - 1);
		let tightened = boundary.with_end(end);
		if tightened != boundary {
			tracing::trace!(line = annotation.line, from = %boundary, to = %tightened, "tightened open scope");
			*annotation = annotation.clone().with_boundary(tightened);
			changed += 1;
		}
	}
	changed
}

/// Block-style directive still running to the end of the file.
fn is_open(annotation: &GuardAnnotation, total: usize) -> bool {
	annotation.scope.is_block_style() && annotation.boundary().is_some_and(|b| b.end() >= total)
}
