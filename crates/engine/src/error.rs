use guardtag_annotation::ScopeKey;
use guardtag_language::ProviderError;
use guardtag_primitives::{DocumentId, LineNr};
use thiserror::Error;

/// Errors that abort a resolution pass.
///
/// No partial table is produced when a pass fails; the previously published
/// table stays available.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
	/// The provider failed for a language it claims to support.
	#[error("failed to resolve scope `{scope}` at line {line}: {source}")]
	Scope {
		line: LineNr,
		scope: ScopeKey,
		#[source]
		source: ProviderError,
	},

	/// An engine invariant did not hold.
	#[error("internal resolution error at line {line}: {message}")]
	Internal { line: LineNr, message: String },

	/// The document kept changing while it was being resolved.
	#[error("{document} changed during resolution (version {started} -> {current})")]
	Superseded { document: DocumentId, started: u64, current: u64 },

	#[error("{0} is not open")]
	UnknownDocument(DocumentId),
}

impl ResolveError {
	pub(crate) fn internal(line: LineNr, message: impl Into<String>) -> Self {
		Self::Internal {
			line,
			message: message.into(),
		}
	}
}
