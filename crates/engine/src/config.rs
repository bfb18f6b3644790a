//! Engine configuration.
//!
//! ```toml
//! unknown_target = "read"
//! max_restarts = 3
//!
//! [defaults]
//! automated = "read"
//! human = "write"
//!
//! [aliases]
//! bot = "automated"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use guardtag_annotation::{AnnotationParser, Permission, Subject, Target, TargetAliases};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Read-only configuration shared by every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Baseline permission of each target class.
	pub defaults: BTreeMap<Target, Permission>,

	/// Permission reported for targets with no baseline and no directive.
	pub unknown_target: Permission,

	/// Extra spellings of target names, on top of the built-in `ai`, `agent` and `hu`.
	pub aliases: BTreeMap<String, Target>,

	/// How often a pass restarts after racing an edit before giving up.
	pub max_restarts: u32,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			defaults: BTreeMap::from([(Target::automated(), Permission::Read), (Target::human(), Permission::Write)]),
			unknown_target: Permission::Read,
			aliases: BTreeMap::new(),
			max_restarts: 3,
		}
	}
}

impl EngineConfig {
	/// Parses a configuration from TOML text; missing keys keep their defaults.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads a TOML configuration file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.display().to_string(),
			source,
		})?;
		Self::from_toml(&text)
	}

	/// Built-in aliases extended with the configured ones.
	pub fn target_aliases(&self) -> TargetAliases {
		let mut aliases = TargetAliases::default();
		for (alias, target) in &self.aliases {
			aliases.insert(alias, target.clone());
		}
		aliases
	}

	/// Parser using [`Self::target_aliases`].
	pub fn parser(&self) -> AnnotationParser {
		AnnotationParser::new(self.target_aliases())
	}

	/// Permissions of the synthetic baseline entry.
	pub fn baseline(&self) -> BTreeMap<Subject, Permission> {
		self.defaults
			.iter()
			.map(|(target, permission)| (Subject::class(target.clone()), *permission))
			.collect()
	}
}
