use std::fmt;

use serde::{Deserialize, Serialize};

/// An access level held by a subject on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
	Read,
	Write,
	None,
}

impl Permission {
	pub fn as_str(self) -> &'static str {
		match self {
			Permission::Read => "read",
			Permission::Write => "write",
			Permission::None => "none",
		}
	}

	/// Single-letter code used by compact reports.
	pub fn code(self) -> char {
		match self {
			Permission::Read => 'r',
			Permission::Write => 'w',
			Permission::None => 'n',
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What a directive clause does to its subject.
///
/// `Context` is a modifier rather than a level: it flags lines as
/// informational for the subject and leaves the permission untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
	Read,
	Write,
	None,
	Context,
}

impl Effect {
	const WORDS: [(&'static str, Effect); 4] = [
		("read", Effect::Read),
		("write", Effect::Write),
		("none", Effect::None),
		("context", Effect::Context),
	];

	const ALIASES: [(&'static str, Effect); 5] = [
		("ro", Effect::Read),
		("readonly", Effect::Read),
		("rw", Effect::Write),
		("noaccess", Effect::None),
		("ctx", Effect::Context),
	];

	/// Parses an effect keyword, case-insensitively.
	///
	/// Any non-empty prefix of a full word is accepted (`r`, `wr`, `non`,
	/// `cont`), as are a few conventional aliases.
	pub fn parse(token: &str) -> Option<Self> {
		let token = token.trim().to_ascii_lowercase();
		if token.is_empty() {
			return None;
		}
		if let Some((_, effect)) = Self::ALIASES.iter().find(|(alias, _)| *alias == token) {
			return Some(*effect);
		}
		Self::WORDS
			.iter()
			.find(|(word, _)| word.starts_with(token.as_str()))
			.map(|(_, effect)| *effect)
	}

	/// The permission level this effect assigns, or `None` for the context modifier.
	pub fn permission(self) -> Option<Permission> {
		match self {
			Effect::Read => Some(Permission::Read),
			Effect::Write => Some(Permission::Write),
			Effect::None => Some(Permission::None),
			Effect::Context => None,
		}
	}

	pub fn is_context(self) -> bool {
		matches!(self, Effect::Context)
	}
}

impl From<Permission> for Effect {
	fn from(permission: Permission) -> Self {
		match permission {
			Permission::Read => Effect::Read,
			Permission::Write => Effect::Write,
			Permission::None => Effect::None,
		}
	}
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.permission() {
			Some(permission) => permission.fmt(f),
			None => f.write_str("context"),
		}
	}
}
