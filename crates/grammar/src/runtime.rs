//! Parsing runtimes and the language handles they produce.

use tracing::{info, warn};
use tree_sitter::Grammar;

use crate::provider::GrammarArtifact;

/// A successfully loaded grammar.
///
/// The wrapped language belongs to the runtime that produced it; callers only
/// hand it on to a parser.
#[derive(Debug, Clone)]
pub struct LanguageHandle<L> {
	name: String,
	language: L,
}

impl<L> LanguageHandle<L> {
	/// Wraps a runtime language loaded under `name`.
	pub fn new(name: impl Into<String>, language: L) -> Self {
		Self { name: name.into(), language }
	}

	/// Entry name the language was loaded under.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The runtime's language value.
	pub fn get(&self) -> &L {
		&self.language
	}
}

/// Turns raw grammar artifacts into usable languages.
pub trait ParsingRuntime {
	/// The runtime's own language representation.
	type Language;

	/// Constructs a language from `artifact`, or `None` if the artifact is unusable.
	fn language(&self, artifact: &GrammarArtifact) -> Option<LanguageHandle<Self::Language>>;
}

impl<R: ParsingRuntime + ?Sized> ParsingRuntime for &R {
	type Language = R::Language;

	fn language(&self, artifact: &GrammarArtifact) -> Option<LanguageHandle<Self::Language>> {
		(**self).language(artifact)
	}
}

/// The tree-sitter runtime.
///
/// Loads the library, resolves `tree_sitter_<name>` and checks the grammar's
/// ABI version against the runtime's supported range. A loaded library stays
/// mapped for the rest of the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterRuntime;

impl ParsingRuntime for TreeSitterRuntime {
	type Language = Grammar;

	fn language(&self, artifact: &GrammarArtifact) -> Option<LanguageHandle<Grammar>> {
		let path = artifact.path();

		// SAFETY: The artifact is provided as a tree-sitter grammar library. The
		// bindings reject libraries that fail to open, lack the entry point, or
		// report an incompatible ABI version.
		match unsafe { Grammar::new(artifact.name(), path) } {
			Ok(grammar) => {
				info!(grammar = artifact.name(), path = %path.display(), "Loaded grammar");
				Some(LanguageHandle::new(artifact.name(), grammar))
			}
			Err(e) => {
				warn!(
					grammar = artifact.name(),
					path = %path.display(),
					error = %e,
					"Failed to load grammar"
				);
				None
			}
		}
	}
}
