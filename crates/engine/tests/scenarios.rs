//! End-to-end resolution through [`GuardSession`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use guardtag_annotation::{AnnotationParser, CommentTokens, Permission, Target};
use guardtag_engine::{
	EngineConfig, GuardSession, PermissionTable, ResolutionCache, ResolveError, ScopeResolver, scan_document,
};
use guardtag_language::{
	LanguageLoader, NoProvider, ProviderError, ScopeProvider, ScopeQuery, SyntaxNode, TreeScopeProvider, TreeSource,
};
use guardtag_primitives::{DocumentAccess, ScopeBoundary, TextDocument};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

const R: Option<Permission> = Some(Permission::Read);
const W: Option<Permission> = Some(Permission::Write);
const N: Option<Permission> = Some(Permission::None);

const PYTHON: &str = "\
# @guard:ai:w.func
def alpha():
    return 1

# @guard:hu:r.class
class Beta:
    x = 1

y = 2
";

fn python_tree() -> Arc<SyntaxNode> {
	let alpha = SyntaxNode::new("function_definition", 2, 3)
		.with_child(SyntaxNode::new("identifier", 2, 2).with_field("name"))
		.with_child(
			SyntaxNode::new("block", 3, 3)
				.with_field("body")
				.with_child(SyntaxNode::new("return_statement", 3, 3)),
		);
	let beta = SyntaxNode::new("class_definition", 6, 7)
		.with_child(SyntaxNode::new("identifier", 6, 6).with_field("name"))
		.with_child(
			SyntaxNode::new("block", 7, 7)
				.with_field("body")
				.with_child(SyntaxNode::new("expression_statement", 7, 7)),
		);
	Arc::new(SyntaxNode::new("module", 1, 9).with_children([
		SyntaxNode::new("comment", 1, 1),
		alpha,
		SyntaxNode::new("comment", 5, 5),
		beta,
		SyntaxNode::new("expression_statement", 9, 9),
	]))
}

/// Counts queries reaching the wrapped provider.
struct Counting<P> {
	inner: P,
	queries: AtomicUsize,
}

impl<P> Counting<P> {
	fn new(inner: P) -> Self {
		Self {
			inner,
			queries: AtomicUsize::new(0),
		}
	}

	fn queries(&self) -> usize {
		self.queries.load(Ordering::Relaxed)
	}
}

#[async_trait]
impl<P: ScopeProvider> ScopeProvider for Counting<P> {
	fn supports(&self, language: Option<&str>) -> bool {
		self.inner.supports(language)
	}

	async fn find_scope_node(
		&self,
		doc: &dyn DocumentAccess,
		query: ScopeQuery<'_>,
	) -> Result<Option<ScopeBoundary>, ProviderError> {
		self.queries.fetch_add(1, Ordering::Relaxed);
		self.inner.find_scope_node(doc, query).await
	}
}

/// Never has a tree.
struct Unparsed;

#[async_trait]
impl TreeSource for Unparsed {
	async fn tree(&self, _doc: &dyn DocumentAccess) -> Result<Option<Arc<SyntaxNode>>, ProviderError> {
		Ok(None)
	}
}

fn tree_session() -> (GuardSession, Arc<Counting<TreeScopeProvider<Arc<SyntaxNode>>>>) {
	let languages = Arc::new(LanguageLoader::from_embedded());
	let provider = Arc::new(Counting::new(TreeScopeProvider::new(python_tree(), languages.clone())));
	let session = GuardSession::new(EngineConfig::default(), languages, provider.clone());
	(session, provider)
}

async fn resolve_text(session: &GuardSession, text: &str) -> Arc<PermissionTable> {
	let doc_id = session.on_open(Arc::new(TextDocument::new(text, None)));
	session.resolve_document(doc_id).await.unwrap()
}

fn column(table: &PermissionTable, target: &Target) -> Vec<Option<Permission>> {
	table.rows().iter().map(|row| row.effective(target, None)).collect()
}

fn context_column(table: &PermissionTable, target: &Target) -> Vec<bool> {
	table.rows().iter().map(|row| row.is_context(target, None)).collect()
}

#[tokio::test]
async fn scenario_basic_block_scopes() {
	let session = GuardSession::with_defaults();
	let table = resolve_text(
		&session,
		"\n# plain comment\n# @guard:automated:write\ncode{\ncode}\n# @guard:human:read\n# comment\n",
	)
	.await;

	assert_eq!(table.len(), 7);
	assert_eq!(column(&table, &Target::automated()), vec![R, R, R, W, W, W, W, W]);
	assert_eq!(column(&table, &Target::human()), vec![W, W, W, W, W, W, R, R]);
}

#[tokio::test]
async fn scenario_line_count_bounded() {
	let config = EngineConfig::from_toml("[defaults]\nautomated = \"write\"\n").unwrap();
	let session = GuardSession::new(config, Arc::new(CommentTokens::default()), Arc::new(NoProvider));
	let table = resolve_text(&session, "# @guard:automated:read.3\na\nb\nc\nd\ne\n").await;

	assert_eq!(column(&table, &Target::automated()), vec![W, R, R, R, R, W, W]);
}

#[tokio::test]
async fn scenario_context_modifier() {
	let session = GuardSession::with_defaults();
	let table = resolve_text(&session, "x = 0\n# @guard:automated:context\n# a\n# b\n\n\n").await;
	assert_eq!(column(&table, &Target::automated()), vec![R; 7]);
	assert_eq!(
		context_column(&table, &Target::automated()),
		vec![false, false, true, true, true, false, false]
	);

	let table = resolve_text(&session, "# @guard:automated:context.file\na\nb\n\n").await;
	assert_eq!(column(&table, &Target::automated()), vec![R; 5]);
	assert_eq!(
		context_column(&table, &Target::automated()),
		vec![false, true, true, true, true]
	);
}

#[tokio::test]
async fn scenario_independent_targets() {
	let session = GuardSession::with_defaults();
	let table = resolve_text(&session, "# @guard:automated:none\na\n# @guard:human:read\nb\nc\n").await;

	for line in 3..=5 {
		assert_eq!(table.permission_at(line, &Target::automated(), None), N);
		assert_eq!(table.permission_at(line, &Target::human(), None), R);
	}
	assert_eq!(table.permission_at(2, &Target::human(), None), W);
}

#[tokio::test]
async fn tree_scopes_resolve_to_nodes() {
	let (session, provider) = tree_session();
	let doc_id = session.on_open(Arc::new(TextDocument::new(PYTHON, Some("python"))));
	let table = session.resolve_document(doc_id).await.unwrap();

	assert_eq!(column(&table, &Target::automated()), vec![R, W, W, W, R, R, R, R, R, R]);
	assert_eq!(column(&table, &Target::human()), vec![W, W, W, W, W, R, R, R, W, W]);
	assert_eq!(provider.queries(), 2);
}

#[tokio::test]
async fn repeated_resolution_is_identical_and_served_from_cache() {
	let (session, provider) = tree_session();
	let doc_id = session.on_open(Arc::new(TextDocument::new(PYTHON, Some("python"))));

	let first = session.resolve_document(doc_id).await.unwrap();
	let queries = provider.queries();
	let second = session.resolve_document(doc_id).await.unwrap();

	assert_eq!(provider.queries(), queries);
	assert_eq!(
		serde_json::to_string(&*first).unwrap(),
		serde_json::to_string(&*second).unwrap()
	);
}

#[tokio::test]
async fn edits_leave_unrelated_lines_untouched() {
	let (session, provider) = tree_session();
	let doc = Arc::new(TextDocument::new(PYTHON, Some("python")));
	let doc_id = session.on_open(doc.clone());
	let before = session.resolve_document(doc_id).await.unwrap();

	let edit = doc.replace_lines(7, 7, &["    x = 2"]);
	let after = session.apply_edits(doc_id, &[edit]).await.unwrap();

	assert_eq!(provider.queries(), 3);
	assert_eq!(after.version, before.version + 1);
	for line in (0..=9).filter(|line| !(5..=7).contains(line)) {
		assert_eq!(before.line(line), after.line(line), "line {line}");
	}
}

#[tokio::test]
async fn interrupted_context_does_not_come_back() {
	let session = GuardSession::with_defaults();
	let table = resolve_text(&session, "# @guard:ai:context\n# a\n# @guard:hu:r.1\n# b\nc\nd\n").await;

	let flags = context_column(&table, &Target::automated());
	assert_eq!(&flags[..3], &[false, true, true]);
	assert!(flags[3..].iter().all(|flag| !flag));
}

/// Context markers over comment runs, docstrings and a nested class docstring.
const CONTEXT_GUARDS: &str = r#"# context markers

# @guard:internal:read.context
# notes for readers
# continued
# last note
def public_function():
    # plain code comment
    print("open")

# @guard:sensitive:none.context
"""
Docstring lines are covered
up to the closing quotes

including blank lines inside
"""
def sensitive_function(name):
    # plain code comment
    return f"Hello {name}"

class MyClass:
    # @guard:private:write.context
    """
    Method documentation
    """
    def my_method(self):
        # plain code comment
        return 42

# unknown effects are ignored
# @guard:admin:execute.context
"""
Module docstring
"""
some_code = "open"

# bare comment markers keep the run going
# @guard:team:read.context
# first
#
# after an empty marker
#
# last
more_code = "open"

# @guard:special:none.context
# one
# two
# three

# a separate comment block
unrelated_code = True
"#;

#[tokio::test]
async fn context_covers_only_the_documentation_after_it() {
	let session = GuardSession::with_defaults();
	let doc_id = session.on_open(Arc::new(TextDocument::new(CONTEXT_GUARDS, Some("python"))));
	let table = session.resolve_document(doc_id).await.unwrap();

	let flagged: Vec<(usize, String)> = table
		.rows()
		.iter()
		.flat_map(|row| {
			row.context
				.iter()
				.filter(|(_, flag)| **flag)
				.map(move |(subject, _)| (row.line, subject.to_string()))
		})
		.collect();
	let expected: Vec<(usize, String)> = [
		("internal", 3..=6),
		("sensitive", 11..=17),
		("private", 23..=26),
		("team", 39..=44),
		("special", 47..=50),
	]
	.into_iter()
	.flat_map(|(target, lines)| lines.map(move |line| (line, target.to_string())))
	.collect();
	assert_eq!(flagged, expected);
}

#[tokio::test]
async fn every_line_has_a_row() {
	let session = GuardSession::with_defaults();
	for text in ["", "a\n", "# @guard:ai:w.2\n\n\n\n", "# @guard:ai:context\n\n"] {
		let table = resolve_text(&session, text).await;
		let total = TextDocument::new(text, None).line_count();
		assert_eq!(table.rows().len(), total + 1, "{text:?}");
		assert!(table.baseline().is_some());
	}
}

#[tokio::test]
async fn resolved_boundaries_are_ordered_and_in_range() {
	let doc = TextDocument::new(PYTHON, Some("python"));
	let scan = scan_document(&doc, &AnnotationParser::default(), &CommentTokens::default());
	let provider = TreeScopeProvider::new(python_tree(), Arc::new(LanguageLoader::from_embedded()));
	let cache = Mutex::new(ResolutionCache::new());
	let resolved = ScopeResolver::new(Arc::new(provider))
		.resolve(&doc, &scan, &cache)
		.await
		.unwrap();

	assert_eq!(resolved.annotations.len(), 2);
	for annotation in &resolved.annotations {
		let boundary = annotation.boundary().unwrap();
		assert!(boundary.start() <= boundary.end());
		assert!(boundary.start() >= 1 && boundary.end() <= scan.total_lines);
	}
}

#[tokio::test]
async fn missing_tree_fails_the_pass() {
	let languages = Arc::new(LanguageLoader::from_embedded());
	let provider = Arc::new(TreeScopeProvider::new(Unparsed, languages.clone()));
	let session = GuardSession::new(EngineConfig::default(), languages, provider);
	let doc_id = session.on_open(Arc::new(TextDocument::new(PYTHON, Some("python"))));

	let err = session.resolve_document(doc_id).await.unwrap_err();
	assert!(
		matches!(err, ResolveError::Scope { line: 1, source: ProviderError::Unavailable(_), .. }),
		"unexpected error: {err}"
	);
	assert!(session.last_table(doc_id).is_none());
}
