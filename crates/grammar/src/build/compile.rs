//! Grammar compilation into dynamic libraries.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use super::{GrammarBuildError, Result};
use crate::config::GrammarConfig;
use crate::paths::grammar_library_name;

/// Returns the first compiler from `candidates` that executes successfully.
fn find_compiler<'a>(candidates: &[&'a str]) -> Option<&'a str> {
	candidates.iter().copied().find(|name| {
		Command::new(name)
			.arg("--version")
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()
			.is_ok()
	})
}

/// Resolves C and C++ compilers, preferring `CC`/`CXX` then probing common names.
fn resolve_compilers() -> (Option<String>, Option<String>) {
	#[cfg(windows)]
	const CC_CANDIDATES: &[&str] = &["cl", "clang-cl", "clang", "gcc"];
	#[cfg(windows)]
	const CXX_CANDIDATES: &[&str] = &["cl", "clang-cl", "clang++", "g++"];
	#[cfg(not(windows))]
	const CC_CANDIDATES: &[&str] = &["cc", "clang", "gcc"];
	#[cfg(not(windows))]
	const CXX_CANDIDATES: &[&str] = &["c++", "clang++", "g++"];

	let cc = std::env::var("CC")
		.ok()
		.or_else(|| find_compiler(CC_CANDIDATES).map(str::to_owned));
	let cxx = std::env::var("CXX")
		.ok()
		.or_else(|| find_compiler(CXX_CANDIDATES).map(str::to_owned));
	(cc, cxx)
}

/// Status of a build operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
	/// Library was newer than every source file.
	AlreadyBuilt(PathBuf),
	/// Library was (re)compiled.
	Built(PathBuf),
}

impl BuildStatus {
	/// Path of the compiled library.
	pub fn library(&self) -> &Path {
		match self {
			Self::AlreadyBuilt(path) | Self::Built(path) => path,
		}
	}
}

/// Returns the `src` directory of the configured grammar checkout.
pub fn grammar_src_dir(config: &GrammarConfig) -> Result<PathBuf> {
	config
		.source
		.as_ref()
		.map(|source| source.join("src"))
		.ok_or(GrammarBuildError::NoSource)
}

/// Returns true if any source file is newer than the compiled library.
fn needs_recompile(src_dir: &Path, lib_path: &Path) -> bool {
	let Ok(lib_mtime) = fs::metadata(lib_path).and_then(|m| m.modified()) else {
		return true;
	};

	["parser.c", "scanner.c", "scanner.cc"].iter().any(|file| {
		fs::metadata(src_dir.join(file))
			.and_then(|m| m.modified())
			.is_ok_and(|src_mtime| src_mtime > lib_mtime)
	})
}

/// Compiles the configured grammar into a dynamic library.
///
/// Objects are compiled with [`cc`] and linked with the system compiler.
/// Unless `force` is set, compilation is skipped when the library is newer
/// than every source file.
///
/// # Errors
///
/// * [`GrammarBuildError::NoSource`] if no source checkout is configured.
/// * [`GrammarBuildError::NoParserSource`] if `parser.c` is missing.
/// * [`GrammarBuildError::Compilation`] if no compiler is found or a stage fails.
pub fn build_grammar(config: &GrammarConfig, force: bool) -> Result<BuildStatus> {
	let src_dir = grammar_src_dir(config)?;
	if !src_dir.join("parser.c").exists() {
		return Err(GrammarBuildError::NoParserSource(src_dir));
	}

	let lib_dir = config.output_dir();
	fs::create_dir_all(&lib_dir)?;
	let lib_path = lib_dir.join(grammar_library_name(&config.name));

	tracing::debug!(
		grammar = %config.name,
		lib_path = %lib_path.display(),
		lib_exists = lib_path.exists(),
		"Grammar library path"
	);

	if !force && !needs_recompile(&src_dir, &lib_path) {
		return Ok(BuildStatus::AlreadyBuilt(lib_path));
	}

	info!(grammar = %config.name, lib_path = %lib_path.display(), "Compiling grammar");

	let needs_cxx = src_dir.join("scanner.cc").exists();
	let compiler = get_compiler(needs_cxx, &config.name)?;

	let objects = compile_objects(&src_dir, &lib_dir, &config.name, &compiler, needs_cxx)?;
	link_shared_library(&compiler, &objects, &lib_path, needs_cxx)?;

	if !lib_path.exists() {
		return Err(GrammarBuildError::Compilation(format!(
			"compilation succeeded but library not found at {}",
			lib_path.display()
		)));
	}

	info!(grammar = %config.name, lib_path = %lib_path.display(), "Compiled grammar");
	Ok(BuildStatus::Built(lib_path))
}

fn get_compiler(needs_cxx: bool, grammar: &str) -> Result<String> {
	let (cc, cxx) = resolve_compilers();
	if needs_cxx {
		cxx.ok_or_else(|| {
			GrammarBuildError::Compilation(format!(
				"C++ compiler required for {grammar} but none found. \
				 Install clang++/g++ or set CXX env var."
			))
		})
	} else {
		cc.ok_or_else(|| {
			GrammarBuildError::Compilation(
				"C compiler required but none found. Install clang/gcc or set CC env var.".into(),
			)
		})
	}
}

/// Target triple of the running host, for driving [`cc`] outside a build script.
fn host_target() -> String {
	std::env::var("TARGET").unwrap_or_else(|_| {
		target_triple(std::env::consts::ARCH, std::env::consts::OS, host_env())
	})
}

/// ABI suffix of the running host (`gnu`, `musl`, `msvc`, or empty).
fn host_env() -> &'static str {
	if cfg!(target_env = "musl") {
		"musl"
	} else if cfg!(target_env = "msvc") {
		"msvc"
	} else if cfg!(target_env = "gnu") {
		"gnu"
	} else {
		""
	}
}

fn target_triple(arch: &str, os: &str, env: &str) -> String {
	match (os, env) {
		("macos", _) => format!("{arch}-apple-darwin"),
		("ios", _) => format!("{arch}-apple-ios"),
		("windows", "gnu") => format!("{arch}-pc-windows-gnu"),
		("windows", _) => format!("{arch}-pc-windows-msvc"),
		("android", _) => format!("{arch}-linux-android"),
		("linux", "") => format!("{arch}-unknown-linux-gnu"),
		("linux", env) => format!("{arch}-unknown-linux-{env}"),
		(os, _) => format!("{arch}-unknown-{os}"),
	}
}

fn compile_objects(
	src_dir: &Path,
	lib_dir: &Path,
	grammar: &str,
	compiler: &str,
	needs_cxx: bool,
) -> Result<Vec<PathBuf>> {
	let target = host_target();
	let obj_dir = lib_dir.join("obj").join(grammar);
	fs::create_dir_all(&obj_dir)?;

	let mut build = cc::Build::new();
	build
		.compiler(compiler)
		.opt_level(3)
		.debug(false)
		.pic(true)
		.cargo_metadata(false)
		.warnings(false)
		.include(src_dir)
		.host(&target)
		.target(&target)
		.out_dir(&obj_dir)
		.file(src_dir.join("parser.c"));

	if needs_cxx {
		build.cpp(true).std("c++14").file(src_dir.join("scanner.cc"));
	} else if src_dir.join("scanner.c").exists() {
		build.file(src_dir.join("scanner.c"));
	}

	build
		.try_compile_intermediates()
		.map_err(|e| GrammarBuildError::Compilation(e.to_string()))
}

/// Links object files into a shared library using the system compiler.
fn link_shared_library(compiler: &str, objects: &[PathBuf], lib_path: &Path, needs_cxx: bool) -> Result<()> {
	#[cfg(windows)]
	{
		let _ = needs_cxx;
		let mut cmd = Command::new(compiler);
		cmd.args(["/nologo", "/LD"])
			.args(objects)
			.arg(format!("/Fe:{}", lib_path.display()));
		run_compiler(cmd)
	}

	#[cfg(not(windows))]
	{
		let mut cmd = Command::new(compiler);
		cmd.arg("-shared").args(objects).arg("-o").arg(lib_path);

		if needs_cxx {
			cmd.arg("-lstdc++");
		}

		#[cfg(target_os = "linux")]
		cmd.arg("-Wl,-z,relro,-z,now");

		run_compiler(cmd)
	}
}

fn run_compiler(mut cmd: Command) -> Result<()> {
	let output = cmd
		.output()
		.map_err(|e| GrammarBuildError::Compilation(e.to_string()))?;

	if output.status.success() {
		Ok(())
	} else {
		Err(GrammarBuildError::Compilation(
			String::from_utf8_lossy(&output.stderr).into(),
		))
	}
}
