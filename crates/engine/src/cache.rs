//! Per-document memo of scope provider results.
//!
//! Entries are keyed by `(directive line, scope key)` and hold the provider's
//! raw outcome, misses included, so a pass over unchanged text never queries
//! the provider again. Heuristic fallbacks are not cached.
//!
//! A found node depends on every line from the directive to the node's end,
//! including any gap above the node. A miss depends on the directive line and
//! everything below it, since an edit there can introduce the node.

use std::sync::Arc;

use guardtag_annotation::ScopeKey;
use guardtag_primitives::{DocumentId, EditRange, LineNr, ScopeBoundary};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

/// Provider outcome for one lookup; `None` records that no node matched.
pub type ScopeOutcome = Option<ScopeBoundary>;

/// Cache key for resolved scopes.
pub type ScopeCacheKey = (LineNr, ScopeKey);

/// Resolved scopes of one document.
#[derive(Debug, Default)]
pub struct ResolutionCache {
	entries: FxHashMap<ScopeCacheKey, ScopeOutcome>,
}

impl ResolutionCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cached outcome for `(line, key)`. The outer `None` is a cache miss.
	pub fn get(&self, line: LineNr, key: &ScopeKey) -> Option<ScopeOutcome> {
		self.entries.get(&(line, key.clone())).copied()
	}

	pub fn put(&mut self, line: LineNr, key: ScopeKey, outcome: ScopeOutcome) {
		self.entries.insert((line, key), outcome);
	}

	/// Removes every entry that `[start, end]` may have changed.
	///
	/// Returns the number of entries removed.
	pub fn invalidate_range(&mut self, start: LineNr, end: LineNr) -> usize {
		let (start, end) = (start.min(end), start.max(end));
		let before = self.entries.len();
		self.entries
			.retain(|(line, _), outcome| !stale(*line, *outcome, start, end));
		before - self.entries.len()
	}

	/// Invalidates the edited lines and moves entries after them by the edit's line delta.
	pub fn apply_edit(&mut self, edit: EditRange) -> usize {
		let removed = self.invalidate_range(edit.start, edit.end);
		if edit.line_delta == 0 {
			return removed;
		}

		let shift = |line: LineNr| {
			if line > edit.end {
				line.saturating_add_signed(edit.line_delta).max(1)
			} else {
				line
			}
		};
		self.entries = std::mem::take(&mut self.entries)
			.into_iter()
			.map(|((line, key), outcome)| {
				let outcome = outcome.map(|b| ScopeBoundary::single(shift(b.start())).with_end(shift(b.end())));
				((shift(line), key), outcome)
			})
			.collect();
		removed
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn stale(line: LineNr, outcome: ScopeOutcome, start: LineNr, end: LineNr) -> bool {
	match outcome {
		Some(boundary) => ScopeBoundary::single(line.min(boundary.start()))
			.with_end(line.max(boundary.end()))
			.overlaps(start, end),
		None => end >= line,
	}
}

/// Shared handle to one document's cache.
pub type SharedCache = Arc<Mutex<ResolutionCache>>;

/// Maps open documents to their caches.
///
/// A cache lives from [`on_open`](Self::on_open) to [`on_close`](Self::on_close).
#[derive(Debug, Default)]
pub struct CacheRegistry {
	caches: RwLock<FxHashMap<DocumentId, SharedCache>>,
}

impl CacheRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cache of `doc_id`, creating it if needed.
	pub fn on_open(&self, doc_id: DocumentId) -> SharedCache {
		Arc::clone(self.caches.write().entry(doc_id).or_default())
	}

	/// Applies `edits` to the document's cache. Returns the number of entries removed.
	pub fn on_edit(&self, doc_id: DocumentId, edits: &[EditRange]) -> usize {
		let Some(cache) = self.get(doc_id) else {
			return 0;
		};
		let mut cache = cache.lock();
		let removed: usize = edits.iter().map(|edit| cache.apply_edit(*edit)).sum();
		tracing::trace!(%doc_id, edits = edits.len(), removed, remaining = cache.len(), "invalidated cached scopes");
		removed
	}

	/// Drops the document's cache. Returns false if none existed.
	pub fn on_close(&self, doc_id: DocumentId) -> bool {
		self.caches.write().remove(&doc_id).is_some()
	}

	pub fn get(&self, doc_id: DocumentId) -> Option<SharedCache> {
		self.caches.read().get(&doc_id).cloned()
	}

	/// Number of documents with a cache.
	pub fn len(&self) -> usize {
		self.caches.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.caches.read().is_empty()
	}
}
