use super::*;

#[test]
fn files_are_required() {
	assert!(Cli::try_parse_from(["guardtag"]).is_err());
}

#[test]
fn defaults() {
	let cli = Cli::try_parse_from(["guardtag", "a.py", "b.rs"]).unwrap();
	assert_eq!(cli.files, vec![PathBuf::from("a.py"), PathBuf::from("b.rs")]);
	assert_eq!(cli.format, OutputFormat::Table);
	assert!(cli.config.is_none());
	assert!(cli.language.is_none());
	assert!(cli.target.is_empty());
	assert!(!cli.verbose);
}

#[test]
fn parse_all_options() {
	let cli = Cli::try_parse_from([
		"guardtag",
		"--format",
		"json",
		"-c",
		"guardtag.toml",
		"--language",
		"python",
		"--syntax-tree",
		"tree.json",
		"-t",
		"automated",
		"-t",
		"human",
		"-v",
		"main.py",
	])
	.unwrap();
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.config, Some(PathBuf::from("guardtag.toml")));
	assert_eq!(cli.language.as_deref(), Some("python"));
	assert_eq!(cli.syntax_tree, Some(PathBuf::from("tree.json")));
	assert_eq!(cli.target, vec!["automated", "human"]);
	assert!(cli.verbose);
}

#[test]
fn unknown_format_is_rejected() {
	assert!(Cli::try_parse_from(["guardtag", "--format", "yaml", "a.py"]).is_err());
}
