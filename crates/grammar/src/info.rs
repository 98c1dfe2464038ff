//! Static metadata about the MoonScript grammar.

/// Describes a compiled tree-sitter grammar well enough to find and load it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarInfo {
	/// Canonical language name, also the default library stem.
	pub name: &'static str,
	/// Accepted spellings of the `tree_sitter_<name>` entry point, most preferred first.
	pub entry_names: &'static [&'static str],
	/// File extensions (without dot).
	pub extensions: &'static [&'static str],
	/// Tokens produced by the external scanner, in scanner enum order.
	pub external_tokens: &'static [&'static str],
}

/// The MoonScript grammar.
///
/// Older builds export `tree_sitter_MoonScript`, so both spellings are accepted.
pub const MOONSCRIPT: GrammarInfo = GrammarInfo {
	name: "moonscript",
	entry_names: &["moonscript", "MoonScript"],
	extensions: &["moon"],
	external_tokens: &[
		"_indent",
		"_dedent",
		"_soft_dedent",
		"_newline",
		"_unary_minus",
		"_unary_iter",
		"error",
	],
};

/// Entry points every external scanner exports, as `tree_sitter_<name>_external_scanner_<suffix>`.
pub const SCANNER_ENTRY_POINTS: [&str; 5] = ["create", "destroy", "scan", "serialize", "deserialize"];

impl GrammarInfo {
	/// Returns the language function symbol for an entry name.
	pub fn entry_symbol(entry_name: &str) -> String {
		format!("tree_sitter_{}", entry_name.replace('-', "_"))
	}

	/// Returns the external scanner symbol for an entry name and scanner entry point.
	pub fn scanner_symbol(entry_name: &str, entry_point: &str) -> String {
		format!("{}_external_scanner_{entry_point}", Self::entry_symbol(entry_name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entry_symbol_normalizes_dashes() {
		assert_eq!(GrammarInfo::entry_symbol("moonscript"), "tree_sitter_moonscript");
		assert_eq!(GrammarInfo::entry_symbol("moon-script"), "tree_sitter_moon_script");
	}

	#[test]
	fn scanner_symbol_layout() {
		assert_eq!(
			GrammarInfo::scanner_symbol("moonscript", "scan"),
			"tree_sitter_moonscript_external_scanner_scan"
		);
	}

	#[test]
	fn moonscript_prefers_lowercase_entry() {
		assert_eq!(MOONSCRIPT.entry_names.first(), Some(&MOONSCRIPT.name));
		assert_eq!(MOONSCRIPT.extensions, &["moon"]);
	}
}
