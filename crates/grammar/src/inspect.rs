//! Probing a compiled grammar library for its exported entry points.
//!
//! The library is opened with [`libloading`] and only symbol presence is
//! checked; nothing inside it is called.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::debug;

use crate::info::{GrammarInfo, SCANNER_ENTRY_POINTS};
use crate::provider::GrammarError;

/// What a grammar library exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryReport {
	/// Library that was inspected.
	pub path: PathBuf,
	/// Entry name whose `tree_sitter_<name>` function is exported, if any.
	pub entry_name: Option<&'static str>,
	/// External scanner entry points and whether each one is exported.
	pub scanner: Vec<(&'static str, bool)>,
}

impl LibraryReport {
	/// Returns true if every external scanner entry point is exported.
	pub fn has_complete_scanner(&self) -> bool {
		!self.scanner.is_empty() && self.scanner.iter().all(|(_, present)| *present)
	}

	/// Returns the scanner entry points the library lacks.
	pub fn missing_scanner_entry_points(&self) -> Vec<&'static str> {
		self.scanner
			.iter()
			.filter(|(_, present)| !present)
			.map(|(name, _)| *name)
			.collect()
	}
}

/// Opens `path` and reports which of `info`'s entry points it exports.
///
/// # Errors
///
/// Returns [`GrammarError::LoadError`] if the file cannot be opened as a shared library.
pub fn inspect_library(path: &Path, info: &GrammarInfo) -> Result<LibraryReport, GrammarError> {
	// SAFETY: Opening a grammar library runs no initialisers beyond the C
	// runtime's own; symbols are only looked up, never called.
	let library = unsafe { Library::new(path) }
		.map_err(|e| GrammarError::LoadError(format!("{}: {}", path.display(), e)))?;

	let entry_name = info
		.entry_names
		.iter()
		.copied()
		.find(|name| has_symbol(&library, &GrammarInfo::entry_symbol(name)));

	let scanner = match entry_name {
		Some(name) => SCANNER_ENTRY_POINTS
			.iter()
			.map(|point| (*point, has_symbol(&library, &GrammarInfo::scanner_symbol(name, point))))
			.collect(),
		None => Vec::new(),
	};

	debug!(path = %path.display(), entry = ?entry_name, "Inspected grammar library");

	Ok(LibraryReport { path: path.to_path_buf(), entry_name, scanner })
}

/// Returns the entry name exported by the library at `path`.
///
/// # Errors
///
/// Returns [`GrammarError::MissingSymbol`] if none of `info`'s spellings are exported.
pub fn detect_entry_name(path: &Path, info: &GrammarInfo) -> Result<&'static str, GrammarError> {
	inspect_library(path, info)?.entry_name.ok_or_else(|| {
		GrammarError::MissingSymbol(format!(
			"{}: none of {}",
			path.display(),
			info.entry_names
				.iter()
				.map(|name| GrammarInfo::entry_symbol(name))
				.collect::<Vec<_>>()
				.join(", ")
		))
	})
}

fn has_symbol(library: &Library, symbol: &str) -> bool {
	// SAFETY: The symbol is resolved but never called or dereferenced.
	unsafe { library.get::<unsafe extern "C" fn()>(symbol.as_bytes()) }.is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::info::MOONSCRIPT;

	#[test]
	fn test_inspect_rejects_non_library() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("libmoonscript.so");
		std::fs::write(&path, b"definitely not an object file").unwrap();

		let err = inspect_library(&path, &MOONSCRIPT).unwrap_err();
		assert!(matches!(err, GrammarError::LoadError(_)));
	}

	#[test]
	fn test_detect_entry_name_propagates_load_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = detect_entry_name(&dir.path().join("missing.so"), &MOONSCRIPT).unwrap_err();
		assert!(matches!(err, GrammarError::LoadError(_)));
	}

	#[test]
	fn test_report_scanner_helpers() {
		let report = LibraryReport {
			path: PathBuf::from("libmoonscript.so"),
			entry_name: Some("moonscript"),
			scanner: vec![("create", true), ("destroy", true), ("scan", false)],
		};
		assert!(!report.has_complete_scanner());
		assert_eq!(report.missing_scanner_entry_points(), vec!["scan"]);

		let empty = LibraryReport { scanner: Vec::new(), ..report };
		assert!(!empty.has_complete_scanner());
	}
}
