// Grammar operations report through tracing; the CLI owns the terminal.
#![deny(clippy::print_stderr)]

//! MoonScript grammar loading for the tree-sitter runtime.
//!
//! This crate answers one question: can the compiled MoonScript grammar be
//! turned into a usable tree-sitter language? Everything else exists to
//! produce or locate the compiled grammar that question is asked about.
//!
//! # Architecture
//!
//! * [`provider`]: Grammar providers that hand out the raw compiled artifact
//! * [`runtime`]: Parsing runtimes that turn an artifact into a [`LanguageHandle`]
//! * [`check`]: The grammar load check tying a provider to a runtime
//! * [`paths`]: Search directories and platform library naming
//! * [`config`]: TOML configuration with environment overrides
//! * [`build`]: Compiling `parser.c` and the external scanner into a shared library
//! * [`inspect`]: Probing a library for its exported entry points
//! * [`info`]: Static metadata about the MoonScript grammar

pub mod build;
pub mod check;
pub mod config;
pub mod info;
pub mod inspect;
pub mod paths;
pub mod provider;
pub mod runtime;

pub use check::{FailureStage, GrammarLoadCheck, LoadCheckError, check_grammar};
pub use config::{ConfigError, GrammarConfig};
pub use info::{GrammarInfo, MOONSCRIPT};
pub use provider::{
	GrammarArtifact, GrammarError, GrammarProvider, LibraryProvider, SearchPathProvider,
	default_provider,
};
pub use runtime::{LanguageHandle, ParsingRuntime, TreeSitterRuntime};
