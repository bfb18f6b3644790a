//! Target identities.
//!
//! Targets are open, case-folded identities. The two built-in classes are
//! [`Target::automated`] and [`Target::human`]; any other name found in a
//! directive is accepted verbatim so new classes need no code changes.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An identity class a permission applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(Arc<str>);

impl Target {
	pub const AUTOMATED: &'static str = "automated";
	pub const HUMAN: &'static str = "human";

	/// Creates a target, folding the name to lowercase.
	pub fn new(name: &str) -> Self {
		Self(Arc::from(name.trim().to_ascii_lowercase()))
	}

	/// The automated-agent class.
	pub fn automated() -> Self {
		Self::new(Self::AUTOMATED)
	}

	/// The human class.
	pub fn human() -> Self {
		Self::new(Self::HUMAN)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Serialize for Target {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for Target {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let name = String::deserialize(deserializer)?;
		Ok(Self::new(&name))
	}
}

/// A target optionally narrowed to one named member (`ai[gpt-4]`).
///
/// A subject without an identifier speaks for every member of its target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subject {
	pub target: Target,
	pub identifier: Option<Arc<str>>,
}

impl Subject {
	/// A subject covering the whole target class.
	pub fn class(target: Target) -> Self {
		Self { target, identifier: None }
	}

	/// A subject narrowed to one identifier, folded to lowercase.
	pub fn member(target: Target, identifier: &str) -> Self {
		Self {
			target,
			identifier: Some(Arc::from(identifier.trim().to_ascii_lowercase())),
		}
	}

	/// Returns true if this subject covers the whole class.
	pub fn is_class(&self) -> bool {
		self.identifier.is_none()
	}

	/// Returns the class-wide subject for this subject's target.
	pub fn to_class(&self) -> Self {
		Self::class(self.target.clone())
	}
}

impl From<Target> for Subject {
	fn from(target: Target) -> Self {
		Self::class(target)
	}
}

impl fmt::Display for Subject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.identifier {
			Some(id) => write!(f, "{}[{}]", self.target, id),
			None => write!(f, "{}", self.target),
		}
	}
}

impl Serialize for Subject {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Subject {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		match text.split_once('[') {
			Some((target, rest)) => Ok(Self::member(Target::new(target), rest.trim_end_matches(']'))),
			None => Ok(Self::class(Target::new(&text))),
		}
	}
}

/// Maps alternate spellings to canonical targets.
#[derive(Debug, Clone)]
pub struct TargetAliases {
	map: FxHashMap<String, Target>,
}

impl TargetAliases {
	/// An alias table with no entries.
	pub fn empty() -> Self {
		Self { map: FxHashMap::default() }
	}

	/// Registers `alias` as another spelling of `target`.
	pub fn insert(&mut self, alias: &str, target: Target) {
		self.map.insert(alias.trim().to_ascii_lowercase(), target);
	}

	/// Resolves a directive's target name. Unknown names become their own target.
	pub fn resolve(&self, name: &str) -> Target {
		let folded = name.trim().to_ascii_lowercase();
		self.map.get(&folded).cloned().unwrap_or_else(|| Target::new(&folded))
	}
}

impl Default for TargetAliases {
	/// `ai` and `agent` name the automated class, `hu` names the human class.
	fn default() -> Self {
		let mut aliases = Self::empty();
		aliases.insert("ai", Target::automated());
		aliases.insert("agent", Target::automated());
		aliases.insert("hu", Target::human());
		aliases
	}
}

impl<'a> FromIterator<(&'a str, &'a str)> for TargetAliases {
	fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
		let mut aliases = Self::default();
		for (alias, target) in iter {
			aliases.insert(alias, Target::new(target));
		}
		aliases
	}
}
