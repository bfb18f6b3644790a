//! Language registry.
//!
//! Connects file types to language identifiers, comment tokens and the
//! resolved scope table of each language.

use std::path::Path;

use guardtag_annotation::{CommentClassifier, CommentTokens, ScopeKind};
use rustc_hash::FxHashMap;

use crate::config::{LanguageConfigError, LanguageScopeFile, ScopeTable};

/// Unique identifier for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageId(pub u32);

impl LanguageId {
	#[inline]
	pub fn idx(self) -> usize {
		self.0 as usize
	}
}

/// Configuration for a single language.
#[derive(Debug, Clone, Default)]
pub struct LanguageConfig {
	/// Language identifier (e.g., "rust", "python").
	pub language_id: String,

	/// File extensions associated with this language.
	pub extensions: Vec<String>,

	/// Exact filenames (e.g., "Makefile").
	pub filenames: Vec<String>,

	/// Tokens that open a comment, block openers included.
	pub comment_tokens: CommentTokens,

	/// Scope keyword to syntax node kinds.
	pub scopes: ScopeTable,
}

impl LanguageConfig {
	/// Node kinds that realize `kind`.
	pub fn node_kinds(&self, kind: ScopeKind) -> &[String] {
		self.scopes.get(&kind).map_or(&[], Vec::as_slice)
	}
}

/// Manages language configurations and provides lookups.
#[derive(Debug, Default)]
pub struct LanguageLoader {
	languages: Vec<LanguageConfig>,
	by_name: FxHashMap<String, LanguageId>,
	by_extension: FxHashMap<String, LanguageId>,
	by_filename: FxHashMap<String, LanguageId>,
	fallback_comments: CommentTokens,
}

impl LanguageLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loader populated from the embedded language-scope configuration.
	pub fn from_embedded() -> Self {
		Self::from_scope_file(&LanguageScopeFile::embedded())
	}

	/// Loader populated from JSON text.
	pub fn from_json(text: &str) -> Result<Self, LanguageConfigError> {
		Ok(Self::from_scope_file(&LanguageScopeFile::from_json(text)?))
	}

	/// Loader populated from a JSON file.
	pub fn from_path(path: &Path) -> Result<Self, LanguageConfigError> {
		Ok(Self::from_scope_file(&LanguageScopeFile::from_path(path)?))
	}

	/// Registers every language of a configuration document.
	pub fn from_scope_file(file: &LanguageScopeFile) -> Self {
		let mut loader = Self::new();
		for (name, entry) in &file.languages {
			loader.register(LanguageConfig {
				language_id: name.clone(),
				extensions: entry.extensions.clone(),
				filenames: entry.filenames.clone(),
				comment_tokens: CommentTokens::new(file.resolve_comment_tokens(name)),
				scopes: file.resolve_scopes(name),
			});
		}
		tracing::debug!(languages = loader.languages.len(), "loaded language scopes");
		loader
	}

	/// Registers a language configuration.
	///
	/// Registering an existing name replaces the previous lookups for it.
	pub fn register(&mut self, config: LanguageConfig) -> LanguageId {
		let id = LanguageId(self.languages.len() as u32);

		for ext in &config.extensions {
			self.by_extension.insert(ext.to_ascii_lowercase(), id);
		}

		for name in &config.filenames {
			self.by_filename.insert(name.clone(), id);
		}

		self.by_name.insert(config.language_id.clone(), id);
		self.languages.push(config);
		id
	}

	/// Gets a language configuration by ID.
	pub fn get(&self, id: LanguageId) -> Option<&LanguageConfig> {
		self.languages.get(id.idx())
	}

	/// Finds a language by name.
	pub fn language_for_name(&self, name: &str) -> Option<LanguageId> {
		self.by_name.get(name).copied()
	}

	/// Configuration of the language called `name`.
	pub fn config_for_name(&self, name: &str) -> Option<&LanguageConfig> {
		self.language_for_name(name).and_then(|id| self.get(id))
	}

	/// Finds a language by file path (exact filename, then extension).
	pub fn language_for_path(&self, path: &Path) -> Option<LanguageId> {
		if let Some(id) = path.file_name().and_then(|n| n.to_str()).and_then(|n| self.by_filename.get(n)) {
			return Some(*id);
		}

		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(|ext| self.by_extension.get(&ext.to_ascii_lowercase()).copied())
	}

	/// Name of the language detected for `path`.
	pub fn language_name_for_path(&self, path: &Path) -> Option<&str> {
		self.language_for_path(path)
			.and_then(|id| self.get(id))
			.map(|config| config.language_id.as_str())
	}

	/// Resolved scope table of the language called `name`.
	pub fn scopes(&self, name: &str) -> Option<&ScopeTable> {
		self.config_for_name(name).map(|config| &config.scopes)
	}

	/// Returns all registered languages.
	pub fn languages(&self) -> impl Iterator<Item = (LanguageId, &LanguageConfig)> {
		self.languages
			.iter()
			.enumerate()
			.map(|(idx, config)| (LanguageId(idx as u32), config))
	}
}

impl CommentClassifier for LanguageLoader {
	fn is_comment(&self, text: &str, language: Option<&str>) -> bool {
		match language.and_then(|name| self.config_for_name(name)) {
			Some(config) => config.comment_tokens.matches(text),
			None => self.fallback_comments.matches(text),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loader_registration() {
		let mut loader = LanguageLoader::new();
		let id = loader.register(LanguageConfig {
			language_id: "rust".to_string(),
			extensions: vec!["rs".to_string()],
			filenames: vec![],
			comment_tokens: CommentTokens::new(["//"]),
			scopes: ScopeTable::default(),
		});
		assert_eq!(id.idx(), 0);

		assert_eq!(loader.language_for_path(Path::new("src/main.rs")), Some(id));
		assert_eq!(loader.language_for_path(Path::new("LIB.RS")), Some(id));
		assert_eq!(loader.language_for_path(Path::new("main.py")), None);
		assert_eq!(loader.language_for_name("rust"), Some(id));
	}

	#[test]
	fn filename_wins_over_extension() {
		let mut loader = LanguageLoader::new();
		let shell = loader.register(LanguageConfig {
			language_id: "shellscript".to_string(),
			extensions: vec!["sh".to_string()],
			..Default::default()
		});
		let make = loader.register(LanguageConfig {
			language_id: "make".to_string(),
			filenames: vec!["build.sh".to_string()],
			..Default::default()
		});
		assert_eq!(loader.language_for_path(Path::new("build.sh")), Some(make));
		assert_eq!(loader.language_for_path(Path::new("run.sh")), Some(shell));
	}

	#[test]
	fn embedded_languages_are_registered() {
		let loader = LanguageLoader::from_embedded();
		assert_eq!(loader.language_name_for_path(Path::new("app.py")), Some("python"));
		assert_eq!(loader.language_name_for_path(Path::new("app.tsx")), Some("typescriptreact"));
		let python = loader.config_for_name("python").unwrap();
		assert!(python.node_kinds(ScopeKind::Class).contains(&"class_definition".to_string()));
		assert!(python.node_kinds(ScopeKind::File).is_empty());
	}

	#[test]
	fn comment_classification_per_language() {
		let loader = LanguageLoader::from_embedded();
		assert!(loader.is_comment("# @guard:ai:r", Some("python")));
		assert!(!loader.is_comment("# @guard:ai:r", Some("rust")));
		assert!(loader.is_comment("/// @guard:ai:r", Some("rust")));
		assert!(loader.is_comment("-- @guard:ai:r", Some("unknown")));
		assert!(loader.is_comment("; @guard:ai:r", None));
	}
}
