//! Scope providers.
//!
//! A [`ScopeProvider`] turns a symbolic scope at a directive line into a
//! concrete line range. [`TreeScopeProvider`] answers from a [`SyntaxNode`]
//! tree using the node kinds of the language-scope configuration.

use std::sync::Arc;

use async_trait::async_trait;
use guardtag_annotation::ScopeSpec;
use guardtag_primitives::{DocumentAccess, LineNr, ScopeBoundary};
use thiserror::Error;

use crate::loader::LanguageLoader;
use crate::tree::SyntaxNode;

mod select;

/// Errors surfaced by scope providers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
	/// No syntax tree could be produced for the document.
	#[error("syntax tree unavailable: {0}")]
	Unavailable(String),

	/// The tree was available but the query failed.
	#[error("scope query failed: {0}")]
	Query(String),
}

/// One scope lookup.
#[derive(Debug, Clone, Copy)]
pub struct ScopeQuery<'a> {
	/// Line of the directive.
	pub line: LineNr,
	pub spec: &'a ScopeSpec,
	pub language: Option<&'a str>,
	/// Line count of the document being resolved.
	pub total_lines: usize,
}

/// Resolves symbolic scopes to line ranges.
#[async_trait]
pub trait ScopeProvider: Send + Sync {
	/// Returns true if scopes can be resolved for `language`.
	///
	/// Errors from a supporting provider fail the resolution pass; languages
	/// that are not supported fall back to heuristics.
	fn supports(&self, language: Option<&str>) -> bool;

	/// Finds the boundary of `query.spec` at `query.line`.
	///
	/// `Ok(None)` means no matching node; the caller falls back to heuristics.
	async fn find_scope_node(
		&self,
		doc: &dyn DocumentAccess,
		query: ScopeQuery<'_>,
	) -> Result<Option<ScopeBoundary>, ProviderError>;
}

#[async_trait]
impl<P: ScopeProvider + ?Sized> ScopeProvider for Arc<P> {
	fn supports(&self, language: Option<&str>) -> bool {
		(**self).supports(language)
	}

	async fn find_scope_node(
		&self,
		doc: &dyn DocumentAccess,
		query: ScopeQuery<'_>,
	) -> Result<Option<ScopeBoundary>, ProviderError> {
		(**self).find_scope_node(doc, query).await
	}
}

/// Provider for environments without syntax trees. Supports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProvider;

#[async_trait]
impl ScopeProvider for NoProvider {
	fn supports(&self, _language: Option<&str>) -> bool {
		false
	}

	async fn find_scope_node(
		&self,
		_doc: &dyn DocumentAccess,
		_query: ScopeQuery<'_>,
	) -> Result<Option<ScopeBoundary>, ProviderError> {
		Ok(None)
	}
}

/// Supplies the current syntax tree of a document.
#[async_trait]
pub trait TreeSource: Send + Sync {
	/// Returns the tree for `doc`, or `None` if the document has not been parsed.
	async fn tree(&self, doc: &dyn DocumentAccess) -> Result<Option<Arc<SyntaxNode>>, ProviderError>;
}

/// A fixed tree, returned for every document.
#[async_trait]
impl TreeSource for Arc<SyntaxNode> {
	async fn tree(&self, _doc: &dyn DocumentAccess) -> Result<Option<Arc<SyntaxNode>>, ProviderError> {
		Ok(Some(Arc::clone(self)))
	}
}

/// [`ScopeProvider`] over trees from a [`TreeSource`].
pub struct TreeScopeProvider<S> {
	source: S,
	languages: Arc<LanguageLoader>,
}

impl<S: TreeSource> TreeScopeProvider<S> {
	pub fn new(source: S, languages: Arc<LanguageLoader>) -> Self {
		Self { source, languages }
	}
}

#[async_trait]
impl<S: TreeSource> ScopeProvider for TreeScopeProvider<S> {
	fn supports(&self, language: Option<&str>) -> bool {
		language
			.and_then(|name| self.languages.config_for_name(name))
			.is_some_and(|config| !config.scopes.is_empty())
	}

	async fn find_scope_node(
		&self,
		doc: &dyn DocumentAccess,
		query: ScopeQuery<'_>,
	) -> Result<Option<ScopeBoundary>, ProviderError> {
		let Some(config) = query.language.and_then(|name| self.languages.config_for_name(name)) else {
			return Ok(None);
		};
		let Some(tree) = self.source.tree(doc).await? else {
			return Err(ProviderError::Unavailable(format!("{} has not been parsed", doc.id())));
		};

		let found = select::select_scope(&tree, query.line, query.spec, config, query.total_lines);
		tracing::trace!(
			doc_id = %doc.id(),
			line = query.line,
			scope = %query.spec,
			found = ?found,
			"tree scope lookup"
		);
		Ok(found)
	}
}
