//! Document sessions.
//!
//! [`GuardSession`] owns the open documents, their resolution caches and the
//! last table published for each. Passes on one document are serialized by
//! an async per-document lock; different documents resolve independently.
//!
//! A pass captures the document version before scanning and re-checks it,
//! under the cache lock, once the provider phase is done. If the document
//! changed, the pass's provider results are dropped and the pass restarts
//! against the new text.

use std::sync::Arc;

use guardtag_annotation::{AnnotationParser, CommentClassifier, CommentTokens};
use guardtag_language::{NoProvider, ScopeProvider};
use guardtag_primitives::{DocumentAccess, DocumentId, EditRange};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::cache::{CacheRegistry, SharedCache};
use crate::config::EngineConfig;
use crate::error::ResolveError;
use crate::resolver::ScopeResolver;
use crate::scan::scan_document;
use crate::stack::StackEngine;
use crate::table::PermissionTable;
use crate::tighten::tighten_boundaries;

/// State of one open document.
struct DocumentEntry {
	doc: Arc<dyn DocumentAccess>,
	cache: SharedCache,
	/// Held for the duration of a pass.
	pass: tokio::sync::Mutex<()>,
	last_table: RwLock<Option<Arc<PermissionTable>>>,
}

/// Resolves guard annotations for a set of open documents.
pub struct GuardSession {
	config: EngineConfig,
	parser: AnnotationParser,
	classifier: Arc<dyn CommentClassifier>,
	resolver: ScopeResolver,
	engine: StackEngine,
	caches: CacheRegistry,
	documents: RwLock<FxHashMap<DocumentId, Arc<DocumentEntry>>>,
}

impl GuardSession {
	pub fn new(config: EngineConfig, classifier: Arc<dyn CommentClassifier>, provider: Arc<dyn ScopeProvider>) -> Self {
		Self {
			parser: config.parser(),
			engine: StackEngine::from_config(&config),
			config,
			classifier,
			resolver: ScopeResolver::new(provider),
			caches: CacheRegistry::new(),
			documents: RwLock::new(FxHashMap::default()),
		}
	}

	/// Session with the default configuration, common comment tokens and no
	/// scope provider.
	pub fn with_defaults() -> Self {
		Self::new(
			EngineConfig::default(),
			Arc::new(CommentTokens::default()),
			Arc::new(NoProvider),
		)
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn caches(&self) -> &CacheRegistry {
		&self.caches
	}

	/// Registers `doc`. Re-opening a document starts over with an empty cache.
	pub fn on_open(&self, doc: Arc<dyn DocumentAccess>) -> DocumentId {
		let doc_id = doc.id();
		let cache = self.caches.on_open(doc_id);
		let entry = DocumentEntry {
			doc,
			cache,
			pass: tokio::sync::Mutex::new(()),
			last_table: RwLock::new(None),
		};
		if self.documents.write().insert(doc_id, Arc::new(entry)).is_some() {
			if let Some(cache) = self.caches.get(doc_id) {
				cache.lock().clear();
			}
			debug!(%doc_id, "document reopened");
		} else {
			debug!(%doc_id, "document opened");
		}
		doc_id
	}

	/// Invalidates cached scopes touched by `edits`. Returns the number of
	/// cache entries removed.
	///
	/// Call after the document's text and version have been updated.
	pub fn on_edit(&self, doc_id: DocumentId, edits: &[EditRange]) -> Result<usize, ResolveError> {
		self.entry(doc_id)?;
		Ok(self.caches.on_edit(doc_id, edits))
	}

	/// Forgets the document and drops its cache. Returns false if it was not open.
	pub fn on_close(&self, doc_id: DocumentId) -> bool {
		let removed = self.documents.write().remove(&doc_id).is_some();
		self.caches.on_close(doc_id);
		if removed {
			debug!(%doc_id, "document closed");
		}
		removed
	}

	pub fn is_open(&self, doc_id: DocumentId) -> bool {
		self.documents.read().contains_key(&doc_id)
	}

	/// The accessor registered for `doc_id`.
	pub fn document(&self, doc_id: DocumentId) -> Option<Arc<dyn DocumentAccess>> {
		self.documents.read().get(&doc_id).map(|entry| Arc::clone(&entry.doc))
	}

	/// Last successfully published table of the document.
	pub fn last_table(&self, doc_id: DocumentId) -> Option<Arc<PermissionTable>> {
		self.documents
			.read()
			.get(&doc_id)
			.and_then(|entry| entry.last_table.read().clone())
	}

	/// Invalidates the cache for `edits`, then re-resolves the document.
	pub async fn apply_edits(&self, doc_id: DocumentId, edits: &[EditRange]) -> Result<Arc<PermissionTable>, ResolveError> {
		self.on_edit(doc_id, edits)?;
		self.resolve_document(doc_id).await
	}

	/// Runs a resolution pass and publishes its table.
	///
	/// On failure nothing is published and [`last_table`](Self::last_table)
	/// keeps returning the previous table.
	pub async fn resolve_document(&self, doc_id: DocumentId) -> Result<Arc<PermissionTable>, ResolveError> {
		let entry = self.entry(doc_id)?;
		let _pass = entry.pass.lock().await;
		let doc = entry.doc.as_ref();
		let mut restarts = 0;

		loop {
			let started = doc.version();
			trace!(%doc_id, version = started, restarts, "resolution pass started");

			let scan = scan_document(doc, &self.parser, self.classifier.as_ref());
			let resolved = self.resolver.resolve(doc, &scan, &entry.cache).await?;

			{
				let mut cache = entry.cache.lock();
				let current = doc.version();
				if current != started {
					if restarts >= self.config.max_restarts {
						debug!(%doc_id, started, current, restarts, "giving up on a document that keeps changing");
						return Err(ResolveError::Superseded {
							document: doc_id,
							started,
							current,
						});
					}
					restarts += 1;
					debug!(%doc_id, started, current, dropped = resolved.fills.len(), "document changed during resolution; restarting");
					continue;
				}
				for fill in resolved.fills {
					cache.put(fill.line, fill.key, fill.outcome);
				}
			}

			let mut annotations = resolved.annotations;
			let tightened = tighten_boundaries(&mut annotations, &scan);
			let rows = self.engine.run(&annotations, &scan)?;
			let table = Arc::new(PermissionTable::new(doc_id, started, self.config.unknown_target, rows));
			*entry.last_table.write() = Some(Arc::clone(&table));

			debug!(
				%doc_id,
				version = started,
				lines = scan.total_lines,
				annotations = annotations.len(),
				tightened,
				queries = resolved.queries,
				cache_hits = resolved.cache_hits,
				"published permission table"
			);
			return Ok(table);
		}
	}

	fn entry(&self, doc_id: DocumentId) -> Result<Arc<DocumentEntry>, ResolveError> {
		self.documents
			.read()
			.get(&doc_id)
			.cloned()
			.ok_or(ResolveError::UnknownDocument(doc_id))
	}
}
