//! The grammar load check.
//!
//! Asks a [`GrammarProvider`] for the compiled grammar, hands it to a
//! [`ParsingRuntime`], and passes if a language comes back. The check keeps
//! no state between runs, so repeating it with the same collaborators gives
//! the same outcome.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::Grammar;

use crate::config::GrammarConfig;
use crate::info::GrammarInfo;
use crate::provider::{GrammarProvider, default_provider};
use crate::runtime::{LanguageHandle, ParsingRuntime, TreeSitterRuntime};

/// Where the load came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
	/// The provider had no artifact to hand out.
	NoArtifact,
	/// The runtime could not construct a language from the artifact.
	Rejected,
}

impl fmt::Display for FailureStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoArtifact => f.write_str("no compiled grammar was provided"),
			Self::Rejected => f.write_str("the parsing runtime rejected the compiled grammar"),
		}
	}
}

/// Failure of the grammar load check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadCheckError {
	/// The runtime produced no language for the grammar.
	#[error("Error loading grammar '{grammar}': {stage}")]
	GrammarLoadFailure { grammar: String, stage: FailureStage },
}

/// Checks that a provider's grammar loads in a runtime.
#[derive(Debug, Clone)]
pub struct GrammarLoadCheck<P, R> {
	grammar: String,
	provider: P,
	runtime: R,
}

impl<P: GrammarProvider, R: ParsingRuntime> GrammarLoadCheck<P, R> {
	/// Creates a check for the grammar called `grammar`.
	pub fn new(grammar: impl Into<String>, provider: P, runtime: R) -> Self {
		Self { grammar: grammar.into(), provider, runtime }
	}

	/// Runs the check, returning the loaded language on success.
	///
	/// # Errors
	///
	/// Returns [`LoadCheckError::GrammarLoadFailure`] if no language could be constructed.
	pub fn run(&self) -> Result<LanguageHandle<R::Language>, LoadCheckError> {
		let Some(artifact) = self.provider.artifact() else {
			return Err(self.failure(FailureStage::NoArtifact));
		};
		debug!(grammar = %self.grammar, path = %artifact.path().display(), "Loading grammar artifact");

		self.runtime
			.language(&artifact)
			.ok_or_else(|| self.failure(FailureStage::Rejected))
	}

	fn failure(&self, stage: FailureStage) -> LoadCheckError {
		warn!(grammar = %self.grammar, %stage, "Grammar load check failed");
		LoadCheckError::GrammarLoadFailure { grammar: self.grammar.clone(), stage }
	}
}

/// Runs the load check for the grammar named in `config` against the
/// configured provider and the tree-sitter runtime.
pub fn check_grammar(
	info: &'static GrammarInfo,
	config: &GrammarConfig,
) -> Result<LanguageHandle<Grammar>, LoadCheckError> {
	GrammarLoadCheck::new(&config.name, default_provider(info, config), TreeSitterRuntime).run()
}
