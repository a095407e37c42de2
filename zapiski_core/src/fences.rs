use crate::tree::Code;
use crate::tree::Html;
use crate::tree::Node;

/// Canonical name of the site's pseudocode DSL for syntax highlighting.
pub const CANONICAL_DSL: &str = "just-ncv";

/// Fence language of diagram blocks extracted for client-side rendering.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Map a fence language tag (case-insensitive) to the canonical DSL name.
/// Returns `None` for languages that pass through unchanged.
fn canonical_language(lang: &str) -> Option<&'static str> {
	match lang.to_lowercase().as_str() {
		"just-ncv" | "pseudocode" | "ncv" | "ncvl" | "ps" => Some(CANONICAL_DSL),
		_ => None,
	}
}

/// Rewrite aliased DSL spellings on a code block to the canonical form.
/// Pure lookup, no side effects beyond the tag.
pub(crate) fn normalize_code_language(code: &mut Code) {
	let Some(lang) = &code.lang else {
		return;
	};

	if let Some(canonical) = canonical_language(lang) {
		code.lang = Some(canonical.to_string());
	}
}

pub(crate) fn is_diagram(code: &Code) -> bool {
	code.lang
		.as_deref()
		.is_some_and(|lang| lang.eq_ignore_ascii_case(DIAGRAM_LANGUAGE))
}

/// Escape a value for embedding in a double-quoted markup attribute.
/// Ampersands are escaped first so produced entities are never re-escaped;
/// newlines become `&#10;` to survive attribute transport.
fn escape_attribute(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for ch in value.chars() {
		match ch {
			'&' => escaped.push_str("&amp;"),
			'"' => escaped.push_str("&quot;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'\n' => escaped.push_str("&#10;"),
			_ => escaped.push(ch),
		}
	}

	escaped
}

/// Build the raw-markup replacement for a diagram block, carrying the
/// original source as an escaped attribute for the client renderer.
pub(crate) fn diagram_node(code: &Code) -> Node {
	let raw = escape_attribute(&code.value);

	Node::Html(Html {
		value: format!(r#"<div class="mermaid-block" data-mermaid="{raw}"></div>"#),
	})
}
