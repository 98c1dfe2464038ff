//! Grammar configuration.
//!
//! Configuration is read from TOML, then environment overrides are applied:
//!
//! ```toml
//! name = "moonscript"
//! library = "/opt/grammars/libmoonscript.so"
//! search_paths = ["/opt/grammars"]
//! source = "/src/tree-sitter-moonscript"
//! output_dir = "/tmp/grammars"
//! ```
//!
//! | Variable                  | Overrides                                   |
//! |---------------------------|---------------------------------------------|
//! | `MOONSCRIPT_GRAMMAR_LIB`  | `library`                                   |
//! | `MOONSCRIPT_GRAMMAR_PATH` | prepends to `search_paths` (path list)      |
//! | `MOONSCRIPT_GRAMMAR_SRC`  | `source`                                    |

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::info::MOONSCRIPT;
use crate::paths::{config_dir, grammar_lib_dir, grammar_search_paths, split_path_list};

/// Environment variable naming an explicit grammar library.
pub const ENV_LIBRARY: &str = "MOONSCRIPT_GRAMMAR_LIB";
/// Environment variable with extra search directories.
pub const ENV_SEARCH_PATH: &str = "MOONSCRIPT_GRAMMAR_PATH";
/// Environment variable naming the grammar source directory.
pub const ENV_SOURCE: &str = "MOONSCRIPT_GRAMMAR_SRC";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

/// Where to find, and how to build, the compiled grammar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarConfig {
	/// Grammar name; also the library file stem.
	pub name: String,
	/// Explicit library path. Skips the search when set.
	pub library: Option<PathBuf>,
	/// Extra directories searched before the built-in ones.
	pub search_paths: Vec<PathBuf>,
	/// Grammar source checkout containing `src/parser.c`.
	pub source: Option<PathBuf>,
	/// Directory compiled libraries are written to.
	pub output_dir: Option<PathBuf>,
}

impl Default for GrammarConfig {
	fn default() -> Self {
		Self {
			name: MOONSCRIPT.name.to_string(),
			library: None,
			search_paths: Vec::new(),
			source: None,
			output_dir: None,
		}
	}
}

impl GrammarConfig {
	/// Parses configuration from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// Reads configuration from a TOML file.
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
		Self::from_toml_str(&text)
			.map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
	}

	/// Loads configuration from `path`, or from the user config file when it
	/// exists, then applies environment overrides.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let config = match path.map(Path::to_path_buf).or_else(default_config_file) {
			Some(path) => {
				debug!(path = %path.display(), "Loading grammar configuration");
				Self::from_file(&path)?
			}
			None => Self::default(),
		};
		Ok(config.with_env(|key| std::env::var_os(key)))
	}

	/// Applies environment overrides read through `lookup`.
	pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
		if let Some(library) = lookup(ENV_LIBRARY).filter(|v| !v.is_empty()) {
			self.library = Some(PathBuf::from(library));
		}
		if let Some(list) = lookup(ENV_SEARCH_PATH) {
			let mut dirs = split_path_list(&list);
			dirs.append(&mut self.search_paths);
			self.search_paths = dirs;
		}
		if let Some(source) = lookup(ENV_SOURCE).filter(|v| !v.is_empty()) {
			self.source = Some(PathBuf::from(source));
		}
		self
	}

	/// Returns configured search paths followed by the built-in ones.
	pub fn search_paths(&self) -> Vec<PathBuf> {
		let mut dirs = self.search_paths.clone();
		for dir in grammar_search_paths() {
			if !dirs.contains(&dir) {
				dirs.push(dir);
			}
		}
		dirs
	}

	/// Returns the directory compiled libraries are written to.
	pub fn output_dir(&self) -> PathBuf {
		self.output_dir.clone().unwrap_or_else(grammar_lib_dir)
	}
}

/// Returns the user configuration file if one exists.
pub fn default_config_file() -> Option<PathBuf> {
	config_dir()
		.map(|dir| dir.join("config.toml"))
		.filter(|path| path.is_file())
}
