use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "guardtag")]
#[command(about = "Resolve guard annotations to per-line permissions")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Files to check
	#[arg(required = true, value_name = "FILE")]
	pub files: Vec<PathBuf>,

	/// Output format
	#[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
	pub format: OutputFormat,

	/// Engine configuration (TOML)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Language-scope configuration (JSON) replacing the built-in one
	#[arg(long, value_name = "PATH")]
	pub languages: Option<PathBuf>,

	/// Language of every file, instead of detecting it from the path
	#[arg(long, short = 'l', value_name = "NAME")]
	pub language: Option<String>,

	/// Syntax tree (JSON) used to resolve symbolic scopes; needs a single file
	#[arg(long, value_name = "PATH")]
	pub syntax_tree: Option<PathBuf>,

	/// Only report these targets
	#[arg(long, short = 't', value_name = "TARGET")]
	pub target: Vec<String>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

/// How resolved tables are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
	/// One line per source line with its permissions
	Table,
	/// The permission tables as JSON
	Json,
}

#[cfg(test)]
mod tests;
