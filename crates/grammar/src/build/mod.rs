//! Compiling grammar sources into a shared library.
//!
//! A grammar checkout holds the generated `src/parser.c` and the hand-written
//! external scanner (`src/scanner.c`, or `src/scanner.cc` for older grammars).
//! Both are compiled and linked into a library the providers can find.

mod compile;

use std::path::PathBuf;

pub use compile::{BuildStatus, build_grammar, grammar_src_dir};
use thiserror::Error;

/// Errors that can occur while building a grammar.
#[derive(Debug, Error)]
pub enum GrammarBuildError {
	#[error("no grammar source configured (set `source` or MOONSCRIPT_GRAMMAR_SRC)")]
	NoSource,
	#[error("no parser.c found in {0}")]
	NoParserSource(PathBuf),
	#[error("compilation failed: {0}")]
	Compilation(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for grammar build operations.
pub type Result<T> = std::result::Result<T, GrammarBuildError>;
