//! Resolution of the files named on the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, ensure};
use guardtag_engine::{EngineConfig, GuardSession, PermissionTable};
use guardtag_language::{LanguageLoader, NoProvider, ScopeProvider, SyntaxNode, TreeScopeProvider};
use guardtag_primitives::{DocumentAccess, TextDocument};
use tracing::debug;

use crate::cli::Cli;

/// One resolved file.
#[derive(Debug)]
pub struct CheckedFile {
	pub path: PathBuf,
	pub language: Option<String>,
	/// Source lines; `lines[0]` is line 1.
	pub lines: Vec<String>,
	pub table: Arc<PermissionTable>,
}

/// Engine configuration named by `--config`, or the defaults.
pub fn engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
	Ok(match &cli.config {
		Some(path) => EngineConfig::load(path)?,
		None => EngineConfig::default(),
	})
}

/// Resolves every file of `cli` in order. Stops at the first failure.
pub async fn check_files(cli: &Cli, config: EngineConfig) -> anyhow::Result<Vec<CheckedFile>> {
	let languages = Arc::new(match &cli.languages {
		Some(path) => LanguageLoader::from_path(path)?,
		None => LanguageLoader::from_embedded(),
	});
	let provider = scope_provider(cli, &languages)?;
	let session = GuardSession::new(config, languages.clone(), provider);

	let mut checked = Vec::with_capacity(cli.files.len());
	for path in &cli.files {
		checked.push(check_file(&session, &languages, path, cli.language.as_deref()).await?);
	}
	Ok(checked)
}

fn scope_provider(cli: &Cli, languages: &Arc<LanguageLoader>) -> anyhow::Result<Arc<dyn ScopeProvider>> {
	let Some(path) = &cli.syntax_tree else {
		return Ok(Arc::new(NoProvider));
	};
	ensure!(cli.files.len() == 1, "--syntax-tree applies to exactly one file, got {}", cli.files.len());

	let text = std::fs::read_to_string(path).with_context(|| format!("failed to read syntax tree {}", path.display()))?;
	let tree: SyntaxNode =
		serde_json::from_str(&text).with_context(|| format!("failed to parse syntax tree {}", path.display()))?;
	debug!(path = %path.display(), root = %tree.kind, "loaded syntax tree");
	Ok(Arc::new(TreeScopeProvider::new(Arc::new(tree), Arc::clone(languages))))
}

async fn check_file(
	session: &GuardSession,
	languages: &LanguageLoader,
	path: &Path,
	language: Option<&str>,
) -> anyhow::Result<CheckedFile> {
	let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	let language = language
		.or_else(|| languages.language_name_for_path(path))
		.map(str::to_owned);
	debug!(path = %path.display(), language = ?language, "checking file");

	let doc = Arc::new(TextDocument::new(&text, language.as_deref()));
	let doc_id = session.on_open(doc.clone());
	let resolved = session.resolve_document(doc_id).await;
	session.on_close(doc_id);
	let table = resolved.with_context(|| format!("failed to resolve {}", path.display()))?;

	let lines = (1..=doc.line_count())
		.map(|line| doc.line(line).unwrap_or_default())
		.collect();
	Ok(CheckedFile {
		path: path.to_path_buf(),
		language,
		lines,
		table,
	})
}
