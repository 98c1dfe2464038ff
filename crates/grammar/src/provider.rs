//! Grammar providers.
//!
//! A provider hands out the raw compiled grammar: a shared library on disk and
//! the name its `tree_sitter_<name>` entry point is exported under. Providers
//! report absence as `None`; turning the artifact into a language is the
//! runtime's job.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GrammarConfig;
use crate::info::GrammarInfo;
use crate::inspect::detect_entry_name;
use crate::paths::grammar_library_names;

/// Errors that can occur when locating a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
	/// Grammar library not found in any search path.
	#[error("grammar not found: {0}")]
	NotFound(String),

	/// Failed to open the dynamic library.
	#[error("failed to load grammar library: {0}")]
	LoadError(String),

	/// Grammar library exists but doesn't export the expected symbol.
	#[error("grammar library missing language function: {0}")]
	MissingSymbol(String),
}

/// A raw compiled grammar as handed out by a [`GrammarProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarArtifact {
	name: String,
	path: PathBuf,
}

impl GrammarArtifact {
	/// Creates an artifact for the library at `path` exporting `tree_sitter_<name>`.
	pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
		Self { name: name.into(), path: path.into() }
	}

	/// Entry name used to resolve the language function.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Path of the shared library.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

/// Source of the raw compiled grammar.
pub trait GrammarProvider {
	/// Returns the compiled grammar artifact, or `None` if there is none to give.
	fn artifact(&self) -> Option<GrammarArtifact>;
}

impl<P: GrammarProvider + ?Sized> GrammarProvider for &P {
	fn artifact(&self) -> Option<GrammarArtifact> {
		(**self).artifact()
	}
}

impl<P: GrammarProvider + ?Sized> GrammarProvider for Box<P> {
	fn artifact(&self) -> Option<GrammarArtifact> {
		(**self).artifact()
	}
}

/// Provides the library at a fixed path.
#[derive(Debug, Clone)]
pub struct LibraryProvider {
	info: &'static GrammarInfo,
	path: PathBuf,
}

impl LibraryProvider {
	/// Creates a provider for an explicit library path.
	pub fn new(info: &'static GrammarInfo, path: impl Into<PathBuf>) -> Self {
		Self { info, path: path.into() }
	}
}

impl GrammarProvider for LibraryProvider {
	fn artifact(&self) -> Option<GrammarArtifact> {
		if !self.path.exists() {
			warn!(grammar = self.info.name, path = %self.path.display(), "Grammar library does not exist");
			return None;
		}
		Some(GrammarArtifact::new(entry_name_for(&self.path, self.info), &self.path))
	}
}

/// Provides the first matching library found in a list of directories.
#[derive(Debug, Clone)]
pub struct SearchPathProvider {
	info: &'static GrammarInfo,
	/// Library file stem searched for.
	name: String,
	dirs: Vec<PathBuf>,
}

impl SearchPathProvider {
	/// Creates a provider searching `dirs` in order for the grammar's canonical library.
	pub fn new(info: &'static GrammarInfo, dirs: Vec<PathBuf>) -> Self {
		Self { info, name: info.name.to_string(), dirs }
	}

	/// Searches for `lib<name>` instead of the canonical library name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Creates a provider using the configured name and search paths.
	pub fn from_config(info: &'static GrammarInfo, config: &GrammarConfig) -> Self {
		Self::new(info, config.search_paths()).with_name(&config.name)
	}

	/// Library file stem searched for.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Directories searched, in order.
	pub fn dirs(&self) -> &[PathBuf] {
		&self.dirs
	}

	/// Finds the grammar library and resolves the name it exports.
	///
	/// # Errors
	///
	/// Returns [`GrammarError::NotFound`] if no search directory holds a
	/// library for this grammar.
	pub fn locate(&self) -> Result<GrammarArtifact, GrammarError> {
		let names = grammar_library_names(&self.name);

		for dir in &self.dirs {
			for lib_name in &names {
				let lib_path = dir.join(lib_name);
				if lib_path.exists() {
					debug!(grammar = %self.name, path = %lib_path.display(), "Found grammar library");
					return Ok(GrammarArtifact::new(entry_name_for(&lib_path, self.info), lib_path));
				}
			}
		}

		Err(GrammarError::NotFound(self.name.clone()))
	}
}

impl GrammarProvider for SearchPathProvider {
	fn artifact(&self) -> Option<GrammarArtifact> {
		self.locate()
			.map_err(|e| warn!(grammar = %self.name, error = %e, "Failed to locate grammar"))
			.ok()
	}
}

/// Returns the provider described by `config`: the explicit library if one is
/// configured, otherwise a search for `config.name` over the configured and
/// built-in paths.
pub fn default_provider(
	info: &'static GrammarInfo,
	config: &GrammarConfig,
) -> Box<dyn GrammarProvider> {
	match &config.library {
		Some(path) => Box::new(LibraryProvider::new(info, path)),
		None => Box::new(SearchPathProvider::from_config(info, config)),
	}
}

/// Picks the entry name a library exports, falling back to the canonical
/// name when the library cannot be probed so the runtime reports the failure.
fn entry_name_for(path: &Path, info: &GrammarInfo) -> &'static str {
	match detect_entry_name(path, info) {
		Ok(name) => name,
		Err(e) => {
			debug!(path = %path.display(), error = %e, "Could not probe grammar library");
			info.name
		}
	}
}
