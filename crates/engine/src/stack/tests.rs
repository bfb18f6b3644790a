use guardtag_annotation::{AnnotationParser, ScopeKind, ScopeSelector, Target};
use pretty_assertions::assert_eq;

use super::*;

const R: Option<Permission> = Some(Permission::Read);
const W: Option<Permission> = Some(Permission::Write);
const N: Option<Permission> = Some(Permission::None);

/// Parses `lines` and attaches boundaries: explicit `(line, start, end)`
/// overrides first, then the direct rules for open, counted and file scopes.
fn prepare(lines: &[&str], overrides: &[(usize, usize, usize)]) -> (Vec<GuardAnnotation>, DocumentScan) {
	let parser = AnnotationParser::default();
	let total = lines.len();
	let annotations: Vec<GuardAnnotation> = lines
		.iter()
		.enumerate()
		.filter_map(|(i, text)| parser.parse(i + 1, text))
		.map(|a| {
			let (start, end) = match overrides.iter().find(|(line, _, _)| *line == a.line) {
				Some(&(_, start, end)) => (start, end),
				None => match &a.scope {
					ScopeSelector::Lines(n) => (a.line, (a.line + n.get()).min(total)),
					ScopeSelector::Semantic(spec) if spec.kind == ScopeKind::File => (1, total),
					ScopeSelector::Semantic(_) => (a.line, a.line),
					ScopeSelector::Unscoped => (a.line, total),
				},
			};
			a.with_boundary(ScopeBoundary::new(start, end).unwrap())
		})
		.collect();
	let blank = lines.iter().map(|l| l.trim().is_empty()).collect();
	(annotations.clone(), DocumentScan::new(annotations, blank))
}

fn run(lines: &[&str], overrides: &[(usize, usize, usize)]) -> Vec<LinePermission> {
	let (annotations, scan) = prepare(lines, overrides);
	StackEngine::from_config(&EngineConfig::default())
		.run(&annotations, &scan)
		.unwrap()
}

fn ai(rows: &[LinePermission]) -> Vec<Option<Permission>> {
	rows.iter().map(|r| r.effective(&Target::automated(), None)).collect()
}

fn human(rows: &[LinePermission]) -> Vec<Option<Permission>> {
	rows.iter().map(|r| r.effective(&Target::human(), None)).collect()
}

fn ai_context(rows: &[LinePermission]) -> Vec<bool> {
	rows.iter().map(|r| r.is_context(&Target::automated(), None)).collect()
}

#[test]
fn basic_block_scopes() {
	let rows = run(
		&[
			"",
			"# plain comment",
			"# @guard:automated:write",
			"code{",
			"code}",
			"# @guard:human:read",
			"# comment",
		],
		&[],
	);
	assert_eq!(rows.len(), 8);
	assert_eq!(ai(&rows), vec![R, R, R, W, W, W, W, W]);
	assert_eq!(human(&rows), vec![W, W, W, W, W, W, R, R]);
}

#[test]
fn line_count_reverts_after_scope() {
	let rows = run(&["# @guard:ai:w.3", "a", "b", "c", "d", "e"], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, W, W, R, R]);
}

#[test]
fn bounded_scope_nested_in_open_scope_resumes_open_scope() {
	let rows = run(&["# @guard:ai:w", "a", "# @guard:ai:n.1", "b", "c", "d"], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, N, N, W, W]);
}

#[test]
fn context_keeps_permission_and_flags_lines() {
	let rows = run(&["# @guard:ai:w", "# @guard:ai:context", "a", "b", "", ""], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, W, W, W, W]);
	assert_eq!(ai_context(&rows), vec![false, false, true, true, true, false, false]);
}

#[test]
fn whole_file_context_includes_trailing_blanks() {
	let rows = run(&["# @guard:ai:context.file", "a", "", ""], &[]);
	assert_eq!(ai_context(&rows), vec![false, true, true, true, true]);
	assert_eq!(ai(&rows), vec![R, R, R, R, R]);
}

#[test]
fn context_is_not_resumed_after_interruption() {
	let rows = run(&["# @guard:ai:ctx", "a", "# @guard:hu:r.1", "b", "c", "d"], &[]);
	assert_eq!(ai_context(&rows), vec![false, true, true, false, false, false, false]);
	assert_eq!(human(&rows), vec![W, W, W, R, R, W, W]);
}

#[test]
fn context_entry_popped_by_end_is_not_resumed() {
	let rows = run(&["# @guard:ai:w", "# @guard:ai:ctx.2", "a", "b", "c"], &[]);
	assert_eq!(ai_context(&rows), vec![false, false, true, true, true, false]);
	assert_eq!(ai(&rows), vec![R, W, W, W, W, W]);
}

#[test]
fn context_reports_level_from_entry_beneath() {
	let rows = run(&["# @guard:ai:w", "# @guard:ai:n,ai:ctx", "a"], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, W]);
	assert_eq!(ai_context(&rows), vec![false, false, true, true]);
}

#[test]
fn independent_targets_overlap() {
	let rows = run(&["# @guard:automated:none", "a", "# @guard:human:read", "b", "c"], &[]);
	assert_eq!(ai(&rows), vec![R, N, N, N, N, N]);
	assert_eq!(human(&rows), vec![W, W, W, R, R, R]);
}

#[test]
fn trailing_blank_lines_report_enclosing_scope() {
	let rows = run(&["# @guard:ai:w.func", "def f():", "    pass", "", "", "x = 1"], &[(1, 1, 5)]);
	assert_eq!(ai(&rows), vec![R, W, W, W, R, R, R]);
}

#[test]
fn interior_blank_lines_keep_scope() {
	let rows = run(&["# @guard:ai:w.func", "def f():", "", "    pass", "x"], &[(1, 1, 4)]);
	assert_eq!(ai(&rows), vec![R, W, W, W, W, R]);
}

#[test]
fn blank_run_before_next_directive_is_trailing() {
	let rows = run(&["# @guard:ai:w", "a", "", "# @guard:hu:r", "b"], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, R, W, W]);
}

#[test]
fn line_limited_scopes_keep_blank_lines() {
	let rows = run(&["# @guard:ai:w.2", "a", ""], &[]);
	assert_eq!(ai(&rows), vec![R, W, W, W]);
}

#[test]
fn body_scope_activates_at_its_start() {
	let rows = run(&["# @guard:ai:n.body", "def f():", "    pass", "x"], &[(1, 3, 3)]);
	assert_eq!(ai(&rows), vec![R, R, R, N, R]);
}

#[test]
fn class_clause_replaces_member_overrides() {
	let rows = run(&["# @guard:ai[gpt]:w", "a", "# @guard:ai:n.1", "b", "c"], &[]);
	let gpt: Vec<_> = rows
		.iter()
		.map(|r| r.effective(&Target::automated(), Some("gpt")))
		.collect();
	assert_eq!(gpt, vec![R, W, W, N, N, W]);
	assert_eq!(ai(&rows), vec![R, R, R, N, N, R]);
}

#[test]
fn last_clause_for_a_subject_wins() {
	let rows = run(&["# @guard:ai:w,ai:n", "a"], &[]);
	assert_eq!(ai(&rows), vec![R, N, N]);
}

#[test]
fn unknown_targets_are_tracked() {
	let rows = run(&["# @guard:reviewer:w", "a"], &[]);
	let reviewer: Vec<_> = rows.iter().map(|r| r.effective(&Target::new("reviewer"), None)).collect();
	assert_eq!(reviewer, vec![None, W, W]);
}

#[test]
fn every_line_gets_a_row() {
	let rows = run(&["a", "", "b"], &[]);
	assert_eq!(rows.iter().map(|r| r.line).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
	assert!(rows.iter().all(|r| r.context.is_empty()));
}

#[test]
fn missing_boundary_is_internal_error() {
	let annotation = AnnotationParser::default().parse(1, "# @guard:ai:w").unwrap();
	let scan = DocumentScan::new(vec![annotation.clone()], vec![false]);
	let err = StackEngine::from_config(&EngineConfig::default())
		.run(&[annotation], &scan)
		.unwrap_err();
	assert!(matches!(err, ResolveError::Internal { line: 1, .. }));
}
