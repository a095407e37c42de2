use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Default maximum excerpt length in characters, before the ellipsis.
pub const DEFAULT_EXCERPT_LIMIT: usize = 160;

/// Minimum cut position for a word-boundary excerpt cut. A space earlier
/// than this is ignored so a long first word cannot shrink the excerpt to
/// almost nothing.
const EXCERPT_EDGE: usize = 40;

/// Default cap on the number of search tokens kept per record.
pub const MAX_SEARCH_TOKENS: usize = 512;

/// Default cap, in characters, on how much plain-texted body feeds the
/// tokenizer.
pub const MAX_SEARCH_BODY_LENGTH: usize = 6000;

static CODE_FENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code fence pattern compiles"));
static INLINE_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"`[^`]*`").expect("inline code pattern compiles"));
static IMAGE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("image pattern compiles"));
static LINK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("link pattern compiles"));
static MARKER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[>#*_~\[\]{}()=+\-]").expect("marker pattern compiles"));
static NEWLINES: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\n+").expect("newline pattern compiles"));
static WHITESPACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// Convert markdown into plain prose by stripping the common syntactic
/// tokens in a fixed order: fenced code, inline code, image syntax (alt
/// text kept), link syntax (link text kept), leftover punctuation markers,
/// then whitespace collapse. Idempotent on its own output.
pub fn markdown_to_plain(markdown: &str) -> String {
	if markdown.is_empty() {
		return String::new();
	}

	let text = CODE_FENCE.replace_all(markdown, " ");
	let text = INLINE_CODE.replace_all(&text, " ");
	let text = IMAGE.replace_all(&text, "$1 ");
	let text = LINK.replace_all(&text, "$1");
	let text = MARKER.replace_all(&text, " ");
	let text = NEWLINES.replace_all(&text, " ");
	let text = WHITESPACE.replace_all(&text, " ");

	text.trim().to_string()
}

/// Build a bounded excerpt from markdown. At most `limit` characters plus
/// one ellipsis; the cut backs up to the last space within the slice when
/// that space sits deeper than [`EXCERPT_EDGE`] characters in.
pub fn excerpt(markdown: &str, limit: usize) -> String {
	let plain = markdown_to_plain(markdown);
	if plain.chars().count() <= limit {
		return plain;
	}

	let end = plain
		.char_indices()
		.nth(limit)
		.map_or(plain.len(), |(index, _)| index);
	let truncated = &plain[..end];

	let cut = truncated
		.rfind(' ')
		.filter(|&space| truncated[..space].chars().count() > EXCERPT_EDGE)
		.unwrap_or(truncated.len());

	format!("{}…", truncated[..cut].trim())
}

/// Common English and Russian function words excluded from search tokens.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
	HashSet::from([
		"a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
		"it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
		"these", "they", "this", "to", "was", "will", "with", "you", "your", "я", "мы", "вы",
		"они", "он", "она", "оно", "это", "в", "во", "на", "не", "но", "для", "что", "как", "из",
		"за", "от", "по", "при", "к", "ко", "у", "же", "ли", "а", "и", "с", "со", "ещё", "бы",
		"есть", "был", "была", "были",
	])
});

/// Inputs to [`search_tokens`]. Use struct update syntax with
/// [`TokenSource::default`] for the caps.
#[derive(Clone, Debug)]
pub struct TokenSource<'a> {
	pub title: Option<&'a str>,
	pub description: Option<&'a str>,
	pub body: Option<&'a str>,
	pub tags: &'a [String],
	pub max_tokens: usize,
	pub max_body_length: usize,
}

impl Default for TokenSource<'_> {
	fn default() -> Self {
		Self {
			title: None,
			description: None,
			body: None,
			tags: &[],
			max_tokens: MAX_SEARCH_TOKENS,
			max_body_length: MAX_SEARCH_BODY_LENGTH,
		}
	}
}

fn is_token_char(ch: char) -> bool {
	matches!(ch, '0'..='9' | 'a'..='z' | '\u{0430}'..='\u{044f}' | 'ё')
}

/// Build the compact search field for one record: title, description,
/// tags, and plain-texted body concatenated, lower-cased, NFKD-normalized
/// with combining diacritics stripped, split on anything outside
/// digits/Latin/Cyrillic, filtered by length and stopwords, deduplicated
/// preserving first occurrence, capped, and space-joined. Empty input at
/// any stage yields an empty string.
pub fn search_tokens(source: &TokenSource<'_>) -> String {
	let mut segments: Vec<String> = vec![];

	if let Some(title) = source.title {
		if !title.is_empty() {
			segments.push(title.to_string());
		}
	}
	if let Some(description) = source.description {
		if !description.is_empty() {
			segments.push(description.to_string());
		}
	}
	if !source.tags.is_empty() {
		segments.push(source.tags.join(" "));
	}

	let plain_body = markdown_to_plain(source.body.unwrap_or_default());
	if !plain_body.is_empty() {
		let body: String = plain_body.chars().take(source.max_body_length).collect();
		segments.push(body);
	}

	if segments.is_empty() {
		return String::new();
	}

	let normalized: String = segments
		.join(" ")
		.to_lowercase()
		.nfkd()
		.filter(|ch| !matches!(ch, '\u{0300}'..='\u{036f}'))
		.collect();

	let mut seen: HashSet<&str> = HashSet::new();
	let mut tokens: Vec<&str> = vec![];

	for token in normalized.split(|ch: char| !is_token_char(ch)) {
		let length = token.chars().count();
		if length <= 1 || length > 40 || STOPWORDS.contains(token) {
			continue;
		}
		if seen.insert(token) {
			tokens.push(token);
			if tokens.len() >= source.max_tokens {
				break;
			}
		}
	}

	tokens.join(" ")
}
