use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "moonscript-grammar")]
#[command(about = "Check, build and inspect the MoonScript tree-sitter grammar")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to ~/.config/moonscript-grammar/config.toml)
	#[arg(long, short = 'c', value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Check that the compiled grammar loads into the tree-sitter runtime
	Check {
		/// Load this library instead of searching for one
		#[arg(long, value_name = "PATH")]
		library: Option<PathBuf>,

		/// Run the check this many times
		#[arg(long, default_value = "1")]
		repeat: NonZeroUsize,
	},
	/// Compile the grammar sources into a shared library
	Build {
		/// Grammar checkout containing src/parser.c
		#[arg(long, value_name = "DIR")]
		source: Option<PathBuf>,

		/// Rebuild even if the library is up to date
		#[arg(long)]
		force: bool,
	},
	/// Print the directories searched for compiled grammars
	Paths,
	/// Report the entry points a grammar library exports
	Inspect {
		/// Library to inspect (defaults to the one the search finds)
		path: Option<PathBuf>,
	},
}
