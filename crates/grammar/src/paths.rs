//! Search directories and platform library naming.
//!
//! Compiled grammars are looked up in, in order:
//!
//! 1. `target/grammars` of the workspace (development builds)
//! 2. `~/.cache/moonscript-grammar/grammars/` (where [`crate::build`] writes)
//! 3. `~/.local/share/moonscript-grammar/grammars/`
//! 4. Helix runtime `grammars/` directories, for users who already built grammars there
//!
//! Directories from configuration are searched before all of these.

use std::path::PathBuf;

/// Directory name used under the platform cache, data and config roots.
pub const APP_DIR: &str = "moonscript-grammar";

/// Returns the runtime directory: `$MOONSCRIPT_GRAMMAR_RUNTIME` or `~/.local/share/moonscript-grammar/`.
pub fn runtime_dir() -> PathBuf {
	if let Ok(runtime) = std::env::var("MOONSCRIPT_GRAMMAR_RUNTIME") {
		return PathBuf::from(runtime);
	}

	data_local_dir()
		.map(|d| d.join(APP_DIR))
		.unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the cache directory: `~/.cache/moonscript-grammar/`.
pub fn cache_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_CACHE_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
			.map(|p| p.join(APP_DIR))
	}
	#[cfg(windows)]
	{
		std::env::var_os("LOCALAPPDATA").map(|p| PathBuf::from(p).join(APP_DIR).join("cache"))
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

/// Returns the directory holding the user configuration file.
pub fn config_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_CONFIG_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
			.map(|p| p.join(APP_DIR))
	}
	#[cfg(windows)]
	{
		std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(APP_DIR))
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

/// Returns the default directory compiled grammars are written to.
pub fn grammar_lib_dir() -> PathBuf {
	cache_dir().unwrap_or_else(runtime_dir).join("grammars")
}

/// Returns the built-in directories to search for compiled grammar libraries.
pub fn grammar_search_paths() -> Vec<PathBuf> {
	let mut dirs = Vec::new();

	if let Ok(manifest) = std::env::var("CARGO_MANIFEST_DIR")
		&& let Some(workspace) = PathBuf::from(manifest).ancestors().nth(2)
	{
		dirs.push(workspace.join("target").join("grammars"));
	}

	dirs.push(grammar_lib_dir());

	if let Some(data) = data_local_dir() {
		let dir = data.join(APP_DIR).join("grammars");
		if !dirs.contains(&dir) {
			dirs.push(dir);
		}
	}

	for helix_dir in helix_runtime_dirs() {
		dirs.push(helix_dir.join("grammars"));
	}

	dirs
}

/// Returns the candidate library file names for a grammar, in lookup order.
///
/// The `lib` prefixed name is what [`crate::build`] produces; the bare name is
/// what Helix and the tree-sitter CLI write.
pub fn grammar_library_names(name: &str) -> [String; 2] {
	let safe_name = name.replace('-', "_");
	[
		grammar_library_name(&safe_name),
		format!("{safe_name}.{}", library_extension()),
	]
}

/// Returns the platform-specific library filename for a grammar.
pub fn grammar_library_name(name: &str) -> String {
	let safe_name = name.replace('-', "_");
	#[cfg(target_os = "windows")]
	{
		format!("{safe_name}.{}", library_extension())
	}
	#[cfg(not(target_os = "windows"))]
	{
		format!("lib{safe_name}.{}", library_extension())
	}
}

/// Returns the shared library extension for the current platform.
pub fn library_extension() -> &'static str {
	#[cfg(target_os = "windows")]
	{
		"dll"
	}
	#[cfg(target_os = "macos")]
	{
		"dylib"
	}
	#[cfg(not(any(target_os = "windows", target_os = "macos")))]
	{
		"so"
	}
}

/// Splits a platform path list (`PATH`-style) into directories, skipping empty entries.
pub fn split_path_list(list: &std::ffi::OsStr) -> Vec<PathBuf> {
	std::env::split_paths(list)
		.filter(|p| !p.as_os_str().is_empty())
		.collect()
}

/// Returns the platform-specific local data directory.
fn data_local_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_DATA_HOME")
			.map(PathBuf::from)
			.or_else(|| {
				std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
			})
	}
	#[cfg(windows)]
	{
		std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

/// Returns Helix runtime directories for fallback grammar loading.
fn helix_runtime_dirs() -> Vec<PathBuf> {
	let mut dirs = Vec::new();

	if let Ok(runtime) = std::env::var("HELIX_RUNTIME") {
		dirs.push(PathBuf::from(runtime));
	}

	#[cfg(unix)]
	if let Some(config) = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
	{
		let helix_runtime = config.join("helix").join("runtime");
		if helix_runtime.exists() {
			dirs.push(helix_runtime);
		}
	}

	if let Some(data) = data_local_dir() {
		let helix_runtime = data.join("helix").join("runtime");
		if helix_runtime.exists() {
			dirs.push(helix_runtime);
		}
	}

	dirs
}

#[cfg(test)]
mod tests {
	use std::ffi::OsString;

	use super::*;

	#[test]
	fn test_grammar_search_paths_not_empty() {
		let dirs = grammar_search_paths();
		assert!(!dirs.is_empty());
		assert!(dirs.contains(&grammar_lib_dir()));
	}

	#[test]
	fn test_grammar_library_name() {
		let name = grammar_library_name("moonscript");
		#[cfg(target_os = "linux")]
		assert_eq!(name, "libmoonscript.so");
		#[cfg(target_os = "macos")]
		assert_eq!(name, "libmoonscript.dylib");
		#[cfg(target_os = "windows")]
		assert_eq!(name, "moonscript.dll");
	}

	#[test]
	#[cfg(target_os = "linux")]
	fn test_grammar_library_names_cover_helix_layout() {
		assert_eq!(
			grammar_library_names("moon-script"),
			["libmoon_script.so".to_string(), "moon_script.so".to_string()]
		);
	}

	#[test]
	fn test_split_path_list_skips_empty() {
		let joined = std::env::join_paths(["/a", "", "/b"]).unwrap();
		assert_eq!(split_path_list(&joined), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
		assert!(split_path_list(&OsString::new()).is_empty());
	}

	#[test]
	fn test_cache_dir_is_some() {
		#[cfg(unix)]
		if std::env::var_os("HOME").is_some() || std::env::var_os("XDG_CACHE_HOME").is_some() {
			assert!(cache_dir().is_some());
		}
	}
}
