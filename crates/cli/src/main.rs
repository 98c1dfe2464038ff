//! `moonscript-grammar` binary.
//!
//! Front end for the grammar load check plus the tooling around it:
//! building the grammar library, listing search paths and inspecting
//! compiled libraries. `check` exits non-zero when the grammar fails to load.

mod cli;

use std::num::NonZeroUsize;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use moonscript_grammar::build::{BuildStatus, build_grammar};
use moonscript_grammar::inspect::inspect_library;
use moonscript_grammar::{
	GrammarConfig, LoadCheckError, MOONSCRIPT, SearchPathProvider, check_grammar,
};
use tracing::info;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:#}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
	let mut config =
		GrammarConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

	match cli.command {
		Command::Check { library, repeat } => {
			if library.is_some() {
				config.library = library;
			}
			let outcome = repeat_check(repeat, |attempt| {
				let handle = check_grammar(&MOONSCRIPT, &config)?;
				info!(attempt, grammar = handle.name(), "Grammar loaded");
				Ok(())
			});
			if let Err(e) = outcome {
				eprintln!("{e}");
				return Ok(ExitCode::FAILURE);
			}
			println!("ok: {} grammar loads", config.name);
		}
		Command::Build { source, force } => {
			if source.is_some() {
				config.source = source;
			}
			let status = build_grammar(&config, force).context("grammar build failed")?;
			let label = match status {
				BuildStatus::Built(_) => "built",
				BuildStatus::AlreadyBuilt(_) => "up to date",
			};
			println!("{label}: {}", status.library().display());
		}
		Command::Paths => {
			if let Some(library) = &config.library {
				println!("{} (explicit)", library.display());
			}
			for dir in config.search_paths() {
				let marker = if dir.is_dir() { "" } else { " (missing)" };
				println!("{}{marker}", dir.display());
			}
		}
		Command::Inspect { path } => {
			let path = match path.or_else(|| config.library.clone()) {
				Some(path) => path,
				None => SearchPathProvider::from_config(&MOONSCRIPT, &config)
					.locate()?
					.path()
					.to_path_buf(),
			};
			let report = inspect_library(&path, &MOONSCRIPT)?;

			println!("library: {}", report.path.display());
			match report.entry_name {
				Some(name) => println!("entry:   tree_sitter_{name}"),
				None => println!("entry:   missing"),
			}
			for (entry_point, present) in &report.scanner {
				println!("scanner: {entry_point:<12} {}", if *present { "yes" } else { "no" });
			}
			if report.has_complete_scanner() {
				println!("tokens:  {}", MOONSCRIPT.external_tokens.join(", "));
			}
			if report.entry_name.is_none() {
				return Ok(ExitCode::FAILURE);
			}
		}
	}

	Ok(ExitCode::SUCCESS)
}

/// Runs `check` up to `repeat` times, stopping at the first failure.
fn repeat_check(
	repeat: NonZeroUsize,
	check: impl FnMut(usize) -> Result<(), LoadCheckError>,
) -> Result<(), LoadCheckError> {
	(1..=repeat.get()).try_for_each(check)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("MOONSCRIPT_GRAMMAR_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("moonscript_grammar=debug,info")
			} else {
				EnvFilter::new("info")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;

	fn same_code(left: ExitCode, right: ExitCode) -> bool {
		format!("{left:?}") == format!("{right:?}")
	}

	/// Runs the binary's dispatch with an empty config file so the user's
	/// configuration is never read.
	fn run_with(config: &Path, args: &[&str]) -> ExitCode {
		let config = config.to_str().unwrap();
		let argv = ["moonscript-grammar", "--config", config].into_iter().chain(args.iter().copied());
		run(Cli::try_parse_from(argv).unwrap()).unwrap()
	}

	#[test]
	fn test_check_with_missing_library_exits_with_failure() {
		let dir = tempfile::tempdir().unwrap();
		let config = dir.path().join("config.toml");
		std::fs::write(&config, "").unwrap();
		let missing = dir.path().join("libmoonscript.so");

		let code = run_with(&config, &["check", "--library", missing.to_str().unwrap()]);
		assert!(same_code(code, ExitCode::FAILURE));
	}

	#[test]
	fn test_check_with_corrupt_library_exits_with_failure_on_every_repeat_count() {
		let dir = tempfile::tempdir().unwrap();
		let config = dir.path().join("config.toml");
		std::fs::write(&config, "").unwrap();
		let corrupt = dir.path().join("libmoonscript.so");
		std::fs::write(&corrupt, b"not a shared library").unwrap();

		for repeat in ["1", "3"] {
			let code = run_with(
				&config,
				&["check", "--library", corrupt.to_str().unwrap(), "--repeat", repeat],
			);
			assert!(same_code(code, ExitCode::FAILURE));
		}
	}

	#[test]
	fn test_unreadable_config_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let config = dir.path().join("config.toml");
		std::fs::write(&config, "unknown_key = 1").unwrap();

		let argv = ["moonscript-grammar", "--config", config.to_str().unwrap(), "paths"];
		let cli = Cli::try_parse_from(argv).unwrap();
		assert!(run(cli).is_err());
	}

	#[test]
	fn test_repeat_check_stops_at_first_failure() {
		let mut attempts = Vec::new();
		let result = repeat_check(NonZeroUsize::new(5).unwrap(), |attempt| {
			attempts.push(attempt);
			if attempt == 2 {
				return Err(LoadCheckError::GrammarLoadFailure {
					grammar: "moonscript".into(),
					stage: moonscript_grammar::FailureStage::Rejected,
				});
			}
			Ok(())
		});

		assert!(result.unwrap_err().to_string().starts_with("Error loading grammar"));
		assert_eq!(attempts, [1, 2]);
	}

	#[test]
	fn test_repeat_check_runs_every_attempt_on_success() {
		let mut calls = 0;
		repeat_check(NonZeroUsize::new(3).unwrap(), |_| {
			calls += 1;
			Ok(())
		})
		.unwrap();
		assert_eq!(calls, 3);
	}
}
