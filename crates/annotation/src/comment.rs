//! Comment classification contract.
//!
//! Only lines classified as comments are offered to the parser. Real
//! classification (tree-sitter comment nodes, editor tokenizers) lives with the
//! caller; [`CommentTokens`] is a token-scanning fallback.

/// Decides whether a line carries a comment.
pub trait CommentClassifier: Send + Sync {
	fn is_comment(&self, text: &str, language: Option<&str>) -> bool;
}

/// Classifies a line as a comment if it contains any of a set of comment tokens.
#[derive(Debug, Clone)]
pub struct CommentTokens {
	tokens: Vec<String>,
}

impl CommentTokens {
	pub const COMMON: [&'static str; 8] = ["//", "#", "--", "/*", "*", ";", "<!--", "\"\"\""];

	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			tokens: tokens.into_iter().map(Into::into).filter(|t: &String| !t.is_empty()).collect(),
		}
	}

	/// Returns true if `text` contains one of the tokens.
	pub fn matches(&self, text: &str) -> bool {
		self.tokens.iter().any(|t| text.contains(t.as_str()))
	}
}

impl Default for CommentTokens {
	fn default() -> Self {
		Self::new(Self::COMMON)
	}
}

impl CommentClassifier for CommentTokens {
	fn is_comment(&self, text: &str, _language: Option<&str>) -> bool {
		self.matches(text)
	}
}
