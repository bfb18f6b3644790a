use super::*;

#[test]
fn reads_lines_one_based() {
	let doc = TextDocument::new("alpha\nbeta\ngamma\n", Some("python"));
	assert_eq!(doc.line_count(), 3);
	assert_eq!(doc.line(1).unwrap(), "alpha");
	assert_eq!(doc.line(3).unwrap(), "gamma");
	assert_eq!(doc.line(4), Err(LineReadError::OutOfRange { line: 4, len: 3 }));
	assert_eq!(doc.language_id().as_deref(), Some("python"));
}

#[test]
fn set_text_bumps_version() {
	let doc = TextDocument::new("a", None);
	assert_eq!(doc.version(), 0);
	assert_eq!(doc.set_text("b\nc"), 1);
	assert_eq!(doc.version(), 1);
	assert_eq!(doc.line_count(), 2);
}

#[test]
fn replace_lines_in_place_keeps_line_count() {
	let doc = TextDocument::new("1\n2\n3\n4\n", None);
	let edit = doc.replace_lines(2, 3, &["two", "three"]);
	assert_eq!(edit, EditRange::lines(2, 3));
	assert_eq!(doc.text(), "1\ntwo\nthree\n4\n");
	assert_eq!(doc.version(), 1);
}

#[test]
fn replace_lines_reports_delta() {
	let doc = TextDocument::new("1\n2\n3\n4\n", None);
	let edit = doc.replace_lines(2, 2, &["x", "y", "z"]);
	assert_eq!(edit.line_delta, 2);
	assert_eq!(doc.text(), "1\nx\ny\nz\n3\n4\n");

	let edit = doc.replace_lines(1, 3, &[]);
	assert_eq!(edit.line_delta, -3);
	assert_eq!(doc.text(), "z\n3\n4\n");
}
