//! `guardtag` command-line checker.
//!
//! Resolves the guard annotations of each file and prints the effective
//! permissions of every line.

mod check;
mod cli;
mod report;

use std::io::Write;

use clap::Parser;
use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = check::engine_config(&cli)?;
	let targets = report::resolve_targets(&cli.target, &config.target_aliases());
	let checked = check::check_files(&cli, config).await?;
	let output = report::render(&checked, cli.format, &targets)?;

	let mut stdout = std::io::stdout().lock();
	stdout.write_all(output.as_bytes())?;
	stdout.flush()?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_env("GUARDTAG_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("guardtag=debug,warn")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(true),
		)
		.init();
}
