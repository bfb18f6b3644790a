//! Language-scope configuration.
//!
//! Maps each language's scope keywords (`func`, `class`, `block`, ...) to the
//! syntax-tree node kinds that realize them. A language may `extends` another;
//! the parent's scopes are merged first and the child's node kinds appended.
//!
//! ```json
//! { "languages": { "typescript": { "extends": "javascript", "scopes": { "func": ["function_signature"] } } } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use guardtag_annotation::ScopeKind;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded default configuration.
pub const EMBEDDED_LANGUAGE_SCOPES: &str = include_str!("../assets/language-scopes.json");

/// Errors that can occur while loading a language-scope configuration.
#[derive(Error, Debug)]
pub enum LanguageConfigError {
	#[error("failed to read language config {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid language config: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageScopeFile {
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub languages: BTreeMap<String, LanguageEntry>,
}

/// One language as written in the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
	pub extends: Option<String>,
	pub extensions: Vec<String>,
	pub filenames: Vec<String>,
	pub comment_tokens: Vec<String>,
	pub block_comment: Option<(String, String)>,
	pub scopes: BTreeMap<String, Vec<String>>,
}

/// Resolved scope keyword to node kinds mapping for one language.
pub type ScopeTable = FxHashMap<ScopeKind, Vec<String>>;

impl LanguageScopeFile {
	/// Parses a configuration from JSON text.
	pub fn from_json(text: &str) -> Result<Self, LanguageConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Reads a configuration from a JSON file.
	pub fn from_path(path: &Path) -> Result<Self, LanguageConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| LanguageConfigError::Io {
			path: path.display().to_string(),
			source,
		})?;
		Self::from_json(&text)
	}

	/// The embedded default configuration.
	pub fn embedded() -> Self {
		Self::from_json(EMBEDDED_LANGUAGE_SCOPES).unwrap_or_else(|e| {
			tracing::error!(error = %e, "embedded language config is invalid");
			Self::default()
		})
	}

	/// Resolves the scope table of `lang_id`, following `extends` chains.
	///
	/// Cyclic chains are reported and resolve to an empty table.
	pub fn resolve_scopes(&self, lang_id: &str) -> ScopeTable {
		let mut visited = FxHashSet::default();
		self.resolve_scopes_inner(lang_id, &mut visited).unwrap_or_default()
	}

	fn resolve_scopes_inner(&self, lang_id: &str, visited: &mut FxHashSet<String>) -> Option<ScopeTable> {
		if !visited.insert(lang_id.to_owned()) {
			tracing::warn!(language = lang_id, "circular `extends` in language config");
			return None;
		}
		let entry = self.languages.get(lang_id)?;

		let mut scopes = match &entry.extends {
			Some(parent) => self.resolve_scopes_inner(parent, visited)?,
			None => ScopeTable::default(),
		};

		for (keyword, kinds) in &entry.scopes {
			let Some(kind) = ScopeKind::parse(keyword) else {
				tracing::debug!(language = lang_id, keyword, "ignoring unknown scope keyword");
				continue;
			};
			let merged = scopes.entry(kind).or_default();
			for node_kind in kinds {
				if !merged.contains(node_kind) {
					merged.push(node_kind.clone());
				}
			}
		}
		Some(scopes)
	}

	/// Comment tokens of `lang_id`, inherited from the parent when not declared.
	pub fn resolve_comment_tokens(&self, lang_id: &str) -> Vec<String> {
		let mut current = lang_id;
		let mut visited = FxHashSet::default();
		while visited.insert(current.to_owned()) {
			let Some(entry) = self.languages.get(current) else {
				break;
			};
			if !entry.comment_tokens.is_empty() {
				let mut tokens = entry.comment_tokens.clone();
				if let Some((open, _)) = &entry.block_comment {
					tokens.push(open.clone());
				}
				return tokens;
			}
			match &entry.extends {
				Some(parent) => current = parent,
				None => break,
			}
		}
		Vec::new()
	}
}
