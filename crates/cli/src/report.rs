//! Output rendering.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use guardtag_annotation::{Permission, Subject, Target, TargetAliases};
use guardtag_engine::LinePermission;
use serde::Serialize;

use crate::check::CheckedFile;
use crate::cli::OutputFormat;

/// JSON shape of one file.
#[derive(Serialize)]
struct FileReport<'a> {
	path: String,
	language: Option<&'a str>,
	version: u64,
	unknown_target: Permission,
	lines: Vec<LinePermission>,
}

/// Resolves `--target` names through the configured aliases.
pub fn resolve_targets(names: &[String], aliases: &TargetAliases) -> Vec<Target> {
	names.iter().map(|name| aliases.resolve(name)).collect()
}

/// Renders `files`, keeping only subjects of `targets` when any are given.
pub fn render(files: &[CheckedFile], format: OutputFormat, targets: &[Target]) -> anyhow::Result<String> {
	let filter = TargetFilter::new(targets);
	match format {
		OutputFormat::Table => Ok(render_table(files, &filter)),
		OutputFormat::Json => render_json(files, &filter),
	}
}

fn render_table(files: &[CheckedFile], filter: &TargetFilter) -> String {
	let mut out = String::new();
	for (idx, file) in files.iter().enumerate() {
		if idx > 0 {
			out.push('\n');
		}
		let language = file.language.as_deref().unwrap_or("plain");
		let _ = writeln!(out, "==> {} [{language}]", file.path.display());

		let cells: Vec<String> = file
			.table
			.rows()
			.iter()
			.map(|row| permission_cell(&filter.apply(row)))
			.collect();
		let width = cells.iter().map(String::len).max().unwrap_or(0);
		for (line, cell) in cells.iter().enumerate() {
			let text = match line {
				0 => "(defaults)",
				n => file.lines.get(n - 1).map_or("", String::as_str),
			};
			let _ = writeln!(out, "{line:>5}  {cell:<width$}  {text}");
		}
	}
	out
}

fn render_json(files: &[CheckedFile], filter: &TargetFilter) -> anyhow::Result<String> {
	let reports: Vec<_> = files
		.iter()
		.map(|file| FileReport {
			path: file.path.display().to_string(),
			language: file.language.as_deref(),
			version: file.table.version,
			unknown_target: file.table.unknown_target,
			lines: file.table.rows().iter().map(|row| filter.apply(row)).collect(),
		})
		.collect();
	let mut json = serde_json::to_string_pretty(&reports)?;
	json.push('\n');
	Ok(json)
}

/// `automated:w human:r*`; `*` marks a context region and `-` a subject
/// flagged as context without a level of its own.
fn permission_cell(row: &LinePermission) -> String {
	let flagged = row.context.iter().filter(|(_, flag)| **flag).map(|(subject, _)| subject);
	let subjects: BTreeSet<&Subject> = row.permissions.keys().chain(flagged).collect();
	subjects
		.into_iter()
		.map(|subject| {
			let level = row.permissions.get(subject).map_or('-', |level| level.code());
			let context = if row.context.get(subject).copied().unwrap_or(false) {
				"*"
			} else {
				""
			};
			format!("{subject}:{level}{context}")
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Restricts rows to a set of targets; empty keeps everything.
struct TargetFilter {
	targets: BTreeSet<Target>,
}

impl TargetFilter {
	fn new(targets: &[Target]) -> Self {
		Self {
			targets: targets.iter().cloned().collect(),
		}
	}

	fn apply(&self, row: &LinePermission) -> LinePermission {
		if self.targets.is_empty() {
			return row.clone();
		}
		let keep = |target: &Target| self.targets.contains(target);
		LinePermission {
			line: row.line,
			permissions: row
				.permissions
				.iter()
				.filter(|(subject, _)| keep(&subject.target))
				.map(|(subject, level)| (subject.clone(), *level))
				.collect(),
			context: row
				.context
				.iter()
				.filter(|(subject, _)| keep(&subject.target))
				.map(|(subject, flag)| (subject.clone(), *flag))
				.collect(),
		}
	}
}
