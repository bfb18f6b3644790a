//! Directive grammar.
//!
//! ```text
//! @guard:target[identifier]:effect[.scope][+added][-removed]
//! @guard:target[identifier]:effect.N
//! ```
//!
//! Every token is case-insensitive. Clauses may be comma-joined after one
//! prefix or written as repeated `@guard:` prefixes on the same line. Text
//! that does not match the grammar is skipped without error.

use std::num::NonZeroUsize;
use std::sync::LazyLock;

use guardtag_primitives::LineNr;
use regex::{Captures, Regex};
use smallvec::SmallVec;

use crate::annotation::{GuardAnnotation, TargetClause};
use crate::effect::Effect;
use crate::scope::{ScopeKind, ScopeSelector, ScopeSpec};
use crate::target::{Subject, TargetAliases};

static PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@guard:").expect("valid prefix regex"));

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?ix)
		^\s*
		(?P<target>[a-z][a-z0-9_]*)
		(?:\[(?P<ident>[^\]]*)\])?
		:
		(?P<effect>[a-z]+)
		(?:\.(?P<scope>[a-z0-9]+))?
		(?P<mods>(?:[+-][a-z]+)*)
		",
	)
	.expect("valid clause regex")
});

/// Suffix turning a permission clause into a context marker (`read.context`).
const CONTEXT_SUFFIX: &str = "context";

/// Parses directive text into [`GuardAnnotation`]s.
#[derive(Debug, Clone, Default)]
pub struct AnnotationParser {
	aliases: TargetAliases,
}

/// A clause plus the scope it declared, before scopes are merged.
struct ParsedClause {
	clause: TargetClause,
	scope: Option<ScopeSelector>,
}

impl AnnotationParser {
	pub fn new(aliases: TargetAliases) -> Self {
		Self { aliases }
	}

	/// Parses the comment text of `line`.
	///
	/// Returns `None` when the text holds no valid directive clause.
	pub fn parse(&self, line: LineNr, text: &str) -> Option<GuardAnnotation> {
		let starts: SmallVec<[usize; 2]> = PREFIX.find_iter(text).map(|m| m.end()).collect();
		if starts.is_empty() {
			return None;
		}

		let mut parsed: SmallVec<[ParsedClause; 2]> = SmallVec::new();
		for (i, &start) in starts.iter().enumerate() {
			let end = starts.get(i + 1).map_or(text.len(), |next| next - "@guard:".len());
			self.parse_clause_list(&text[start..end], &mut parsed);
		}

		if parsed.is_empty() {
			tracing::trace!(line, "guard prefix without valid clauses");
			return None;
		}

		let scope = parsed
			.iter()
			.rev()
			.find_map(|p| p.scope.clone())
			.unwrap_or(ScopeSelector::Unscoped);

		Some(GuardAnnotation::new(line, parsed.into_iter().map(|p| p.clause), scope))
	}

	/// Parses `clause(,clause)*`, stopping at the first malformed clause.
	fn parse_clause_list(&self, mut rest: &str, out: &mut SmallVec<[ParsedClause; 2]>) {
		loop {
			let Some(caps) = CLAUSE.captures(rest) else {
				return;
			};
			let consumed = caps.get(0).map_or(0, |m| m.end());
			if let Some(clause) = self.build_clause(&caps) {
				out.push(clause);
			}

			rest = rest[consumed..].trim_start();
			match rest.strip_prefix(',') {
				Some(next) => rest = next,
				None => return,
			}
		}
	}

	fn build_clause(&self, caps: &Captures<'_>) -> Option<ParsedClause> {
		let target = self.aliases.resolve(&caps["target"]);
		let subject = match caps.name("ident").map(|m| m.as_str().trim()) {
			Some(ident) if !ident.is_empty() => Subject::member(target, ident),
			_ => Subject::class(target),
		};
		let mut effect = Effect::parse(&caps["effect"])?;

		let mods = parse_modifiers(caps.name("mods").map_or("", |m| m.as_str()))?;
		let scope = match caps.name("scope").map(|m| m.as_str().to_ascii_lowercase()) {
			None if mods.is_empty() => None,
			None => return None,
			Some(token) if token == CONTEXT_SUFFIX => {
				if !mods.is_empty() {
					return None;
				}
				effect = Effect::Context;
				None
			}
			Some(token) if token.bytes().all(|b| b.is_ascii_digit()) => {
				if !mods.is_empty() {
					return None;
				}
				let count = token.parse::<usize>().ok().and_then(NonZeroUsize::new)?;
				Some(ScopeSelector::Lines(count))
			}
			Some(token) => {
				let mut spec = ScopeSpec::new(ScopeKind::parse(&token)?);
				for (added, kind) in mods {
					if added {
						spec.add.push(kind);
					} else {
						spec.remove.push(kind);
					}
				}
				Some(ScopeSelector::Semantic(spec))
			}
		};

		Some(ParsedClause {
			clause: TargetClause::new(subject, effect),
			scope,
		})
	}
}

/// Splits `+sig-body` into `[(true, Signature), (false, Body)]`.
fn parse_modifiers(text: &str) -> Option<SmallVec<[(bool, ScopeKind); 2]>> {
	let mut out = SmallVec::new();
	let mut rest = text;
	while let Some(sign) = rest.chars().next() {
		let body = &rest[1..];
		let len = body.find(['+', '-']).unwrap_or(body.len());
		out.push((sign == '+', ScopeKind::parse(&body[..len])?));
		rest = &body[len..];
	}
	Some(out)
}
