#![allow(unused_crate_dependencies)]

use std::fs;
use std::path::Path;

use moonscript_grammar::build::{BuildStatus, GrammarBuildError, build_grammar};
use moonscript_grammar::inspect::inspect_library;
use moonscript_grammar::{
	FailureStage, GrammarConfig, GrammarLoadCheck, LoadCheckError, MOONSCRIPT, SearchPathProvider,
	TreeSitterRuntime, check_grammar,
};

/// Just enough of a tree-sitter language for the runtime's ABI check: the
/// leading `abi_version` field is 14, every count and table is zero.
const STUB_PARSER: &str = r#"
#include <stdint.h>

static const uint32_t LANGUAGE[512] __attribute__((aligned(16))) = {14};

const void *tree_sitter_moonscript(void) { return LANGUAGE; }
"#;

const STUB_SCANNER: &str = r#"
#include <stdbool.h>

void *tree_sitter_moonscript_external_scanner_create(void) { return 0; }
void tree_sitter_moonscript_external_scanner_destroy(void *payload) { (void)payload; }
bool tree_sitter_moonscript_external_scanner_scan(void *payload, void *lexer, const bool *valid) {
	(void)payload; (void)lexer; (void)valid;
	return false;
}
unsigned tree_sitter_moonscript_external_scanner_serialize(void *payload, char *buffer) {
	(void)payload; (void)buffer;
	return 0;
}
void tree_sitter_moonscript_external_scanner_deserialize(void *payload, const char *buffer, unsigned length) {
	(void)payload; (void)buffer; (void)length;
}
"#;

/// Builds the stub grammar as `lib<name>`, or returns `None` when no C
/// compiler is available.
fn build_stub(source: &Path, output: &Path, name: &str) -> Option<GrammarConfig> {
	let src_dir = source.join("src");
	fs::create_dir_all(&src_dir).unwrap();
	fs::write(src_dir.join("parser.c"), STUB_PARSER).unwrap();
	fs::write(src_dir.join("scanner.c"), STUB_SCANNER).unwrap();

	let config = GrammarConfig {
		name: name.to_string(),
		source: Some(source.to_path_buf()),
		output_dir: Some(output.to_path_buf()),
		search_paths: vec![output.to_path_buf()],
		..GrammarConfig::default()
	};

	match build_grammar(&config, false) {
		Ok(status) => {
			assert!(matches!(status, BuildStatus::Built(_)));
			Some(config)
		}
		Err(GrammarBuildError::Compilation(msg)) if msg.contains("none found") => {
			eprintln!("skipping: {msg}");
			None
		}
		Err(e) => panic!("stub grammar failed to build: {e}"),
	}
}

#[test]
#[cfg(unix)]
fn built_grammar_loads_and_rebuild_is_skipped() {
	let source = tempfile::tempdir().unwrap();
	let output = tempfile::tempdir().unwrap();
	let Some(config) = build_stub(source.path(), output.path(), "moonscript") else {
		return;
	};

	let handle = check_grammar(&MOONSCRIPT, &config).expect("Error loading grammar");
	assert_eq!(handle.name(), "moonscript");

	let again = build_grammar(&config, false).unwrap();
	assert!(matches!(again, BuildStatus::AlreadyBuilt(_)));

	let report = inspect_library(again.library(), &MOONSCRIPT).unwrap();
	assert_eq!(report.entry_name, Some("moonscript"));
	assert!(report.has_complete_scanner());
}

#[test]
#[cfg(unix)]
fn repeated_checks_against_built_grammar_agree() {
	let source = tempfile::tempdir().unwrap();
	let output = tempfile::tempdir().unwrap();
	let Some(config) = build_stub(source.path(), output.path(), "moonscript") else {
		return;
	};

	let check = GrammarLoadCheck::new(
		MOONSCRIPT.name,
		SearchPathProvider::new(&MOONSCRIPT, vec![output.path().to_path_buf()]),
		TreeSitterRuntime,
	);
	for _ in 0..3 {
		assert!(check.run().is_ok());
	}
}

#[test]
#[cfg(unix)]
fn grammar_built_under_custom_name_is_found_by_check() {
	let source = tempfile::tempdir().unwrap();
	let output = tempfile::tempdir().unwrap();
	let Some(config) = build_stub(source.path(), output.path(), "moon") else {
		return;
	};
	assert!(output.path().join(moonscript_grammar::paths::grammar_library_name("moon")).exists());

	let handle = check_grammar(&MOONSCRIPT, &config).expect("Error loading grammar");
	assert_eq!(handle.name(), "moonscript");
}

#[test]
fn corrupt_library_is_reported_as_load_failure() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join(moonscript_grammar::paths::grammar_library_name("moonscript"));
	fs::write(&path, b"not a shared library").unwrap();

	let config = GrammarConfig { library: Some(path), ..GrammarConfig::default() };
	let err = check_grammar(&MOONSCRIPT, &config).unwrap_err();

	assert_eq!(
		err,
		LoadCheckError::GrammarLoadFailure {
			grammar: "moonscript".into(),
			stage: FailureStage::Rejected,
		}
	);
	assert!(err.to_string().starts_with("Error loading grammar"));
}

#[test]
fn installed_grammar_loads() {
	let config = GrammarConfig::default().with_env(|key| std::env::var_os(key));
	let provider = SearchPathProvider::from_config(&MOONSCRIPT, &config);
	if config.library.is_none() && provider.locate().is_err() {
		eprintln!("skipping: no compiled MoonScript grammar installed");
		return;
	}

	check_grammar(&MOONSCRIPT, &config).expect("Error loading grammar");
}
