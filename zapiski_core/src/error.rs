use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ZapiskiError {
	#[error("failure to parse markdown: {0}")]
	#[diagnostic(code(zapiski::markdown))]
	Markdown(String),

	#[error("failed to parse locale dictionary: {0}")]
	#[diagnostic(
		code(zapiski::dictionary_parse),
		help("locale dictionaries are YAML mappings of strings, string lists, plural forms, and nested mappings")
	)]
	DictionaryParse(String),

	#[error("invalid dictionary value at `{path}`: {reason}")]
	#[diagnostic(
		code(zapiski::dictionary_shape),
		help("translation values must be strings, lists of strings, plural-form mappings, or nested mappings")
	)]
	DictionaryShape { path: String, reason: String },
}

pub type ZapiskiResult<T> = Result<T, ZapiskiError>;
