//! Scope resolution.
//!
//! Explicit line counts, open scopes and the whole-file scope are computed
//! directly. An unscoped context marker covers the comment or docstring run
//! below it. Other symbolic scopes are looked up in the document's
//! [`ResolutionCache`]; all misses are then sent to the [`ScopeProvider`] in
//! one async phase. Provider results are returned as [`CacheFill`]s rather
//! than written back, so the caller can drop them if the document changed
//! in the meantime.

use std::sync::Arc;

use guardtag_annotation::{GuardAnnotation, ScopeKey, ScopeKind, ScopeSelector, ScopeSpec};
use guardtag_language::{ScopeProvider, ScopeQuery};
use guardtag_primitives::{DocumentAccess, LineNr, ScopeBoundary};
use parking_lot::Mutex;

use crate::cache::{ResolutionCache, ScopeOutcome};
use crate::error::ResolveError;
use crate::scan::DocumentScan;

/// A provider result waiting to be committed to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFill {
	pub line: LineNr,
	pub key: ScopeKey,
	pub outcome: ScopeOutcome,
}

/// Annotations of one pass with their boundaries attached.
#[derive(Debug, Default)]
pub struct Resolved {
	/// Same order as the scan.
	pub annotations: Vec<GuardAnnotation>,
	pub fills: Vec<CacheFill>,
	/// Number of provider queries issued.
	pub queries: usize,
	pub cache_hits: usize,
}

/// Resolves annotation scopes against a provider.
pub struct ScopeResolver {
	provider: Arc<dyn ScopeProvider>,
}

impl ScopeResolver {
	pub fn new(provider: Arc<dyn ScopeProvider>) -> Self {
		Self { provider }
	}

	/// Attaches a boundary to every annotation of `scan`.
	///
	/// The cache lock is only held while collecting hits, never across the
	/// provider phase.
	pub async fn resolve(
		&self,
		doc: &dyn DocumentAccess,
		scan: &DocumentScan,
		cache: &Mutex<ResolutionCache>,
	) -> Result<Resolved, ResolveError> {
		let mut outcomes: Vec<Option<ScopeOutcome>> = vec![None; scan.annotations.len()];
		let mut pending = Vec::new();
		let mut cache_hits = 0;
		{
			let cache = cache.lock();
			for (idx, annotation) in scan.annotations.iter().enumerate() {
				let Some(spec) = provider_spec(annotation) else {
					continue;
				};
				match cache.get(annotation.line, &spec.key()) {
					Some(outcome) => {
						outcomes[idx] = Some(outcome);
						cache_hits += 1;
					}
					None => pending.push(idx),
				}
			}
		}

		let language = doc.language_id();
		let mut fills = Vec::with_capacity(pending.len());
		if !pending.is_empty() {
			if self.provider.supports(language.as_deref()) {
				for idx in pending {
					let annotation = &scan.annotations[idx];
					let Some(spec) = provider_spec(annotation) else {
						continue;
					};
					let query = ScopeQuery {
						line: annotation.line,
						spec,
						language: language.as_deref(),
						total_lines: scan.total_lines,
					};
					let outcome = self.provider.find_scope_node(doc, query).await.map_err(|source| {
						tracing::debug!(doc_id = %doc.id(), line = annotation.line, scope = %spec, %source, "scope provider failed");
						ResolveError::Scope {
							line: annotation.line,
							scope: spec.key(),
							source,
						}
					})?;
					outcomes[idx] = Some(outcome);
					fills.push(CacheFill {
						line: annotation.line,
						key: spec.key(),
						outcome,
					});
				}
			} else {
				tracing::trace!(doc_id = %doc.id(), language = ?language, misses = pending.len(), "no scope provider for language; using heuristics");
			}
		}

		let queries = fills.len();
		let annotations = scan
			.annotations
			.iter()
			.zip(outcomes)
			.map(|(annotation, outcome)| {
				let boundary = boundary_for(annotation, outcome.flatten(), scan);
				annotation.clone().with_boundary(boundary)
			})
			.collect();

		tracing::debug!(doc_id = %doc.id(), cache_hits, queries, "resolved scopes");
		Ok(Resolved {
			annotations,
			fills,
			queries,
			cache_hits,
		})
	}
}

/// The scope spec to send to the provider, if the annotation needs one.
fn provider_spec(annotation: &GuardAnnotation) -> Option<&ScopeSpec> {
	annotation.scope.spec().filter(|spec| spec.kind != ScopeKind::File)
}

/// Final boundary of `annotation` given the provider's outcome.
fn boundary_for(annotation: &GuardAnnotation, found: Option<ScopeBoundary>, scan: &DocumentScan) -> ScopeBoundary {
	let line = annotation.line;
	let total = scan.total_lines.max(line);
	let rest_of_file = ScopeBoundary::single(line).with_end(total);

	match &annotation.scope {
		ScopeSelector::Lines(count) => ScopeBoundary::single(line).with_end((line + count.get()).min(total)),
		ScopeSelector::Unscoped if annotation.is_context_only() => {
			ScopeBoundary::single(line).with_end(scan.comment_block_end(line).min(total))
		}
		ScopeSelector::Unscoped => rest_of_file,
		ScopeSelector::Semantic(spec) if spec.kind == ScopeKind::File => ScopeBoundary::single(1).with_end(total),
		ScopeSelector::Semantic(spec) => match found {
			Some(boundary) if boundary.end() <= total && boundary != rest_of_file => boundary,
			Some(boundary) if boundary.end() > total && boundary.start() <= total => {
				let clamped = boundary.with_end(total);
				if clamped == rest_of_file {
					heuristic(line, spec, scan)
				} else {
					clamped
				}
			}
			_ => heuristic(line, spec, scan),
		},
	}
}

/// Fallback when no usable node was found.
///
/// Blocks run to the line before the next directive, minus trailing blank
/// lines; every other scope covers the directive line only.
fn heuristic(line: LineNr, spec: &ScopeSpec, scan: &DocumentScan) -> ScopeBoundary {
	if spec.kind != ScopeKind::Block {
		return ScopeBoundary::single(line);
	}
	let end = scan
		.next_annotation_after(line)
		.map_or(scan.total_lines, |next| next - 1)
		.max(line);
	ScopeBoundary::single(line).with_end(scan.trim_trailing_blanks(line, end))
}
