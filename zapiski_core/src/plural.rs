use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

use crate::tree::Node;

/// Grammatical-number form tags shared by the inline pluralization pass and
/// the translation resolver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PluralForm {
	One,
	Few,
	Many,
	Other,
}

impl PluralForm {
	pub fn key(self) -> &'static str {
		match self {
			PluralForm::One => "one",
			PluralForm::Few => "few",
			PluralForm::Many => "many",
			PluralForm::Other => "other",
		}
	}
}

/// Russian cardinal rule over a non-negative integer count: 1, 21, 101 take
/// "one"; 2-4, 22-24 take "few" (except 12-14); everything else "many".
pub fn russian_plural_form(n: u64) -> PluralForm {
	let m10 = n % 10;
	let m100 = n % 100;

	if m10 == 1 && m100 != 11 {
		PluralForm::One
	} else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
		PluralForm::Few
	} else {
		PluralForm::Many
	}
}

/// `{plural:<count>|<one>|<few>|<many>}` where `<count>` is a literal
/// integer or `n`, and each form is double-quoted, single-quoted, or bare
/// (bare forms cannot contain a pipe or closing brace).
static PLURAL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?x)
		\{\s*plural\s*:\s*([0-9]+|n)\s*
		\|\s*(?:"([^"]+)"|'([^']+)'|([^|}]+))\s*
		\|\s*(?:"([^"]+)"|'([^']+)'|([^|}]+))\s*
		\|\s*(?:"([^"]+)"|'([^']+)'|([^|}]+))\s*\}"#,
	)
	.expect("plural token pattern compiles")
});

static INTEGER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[0-9]+").expect("integer pattern compiles"));

/// Pick one plural form out of the three alternative captures starting at
/// `base` (double-quoted, single-quoted, bare).
fn form<'t>(caps: &Captures<'t>, base: usize) -> &'t str {
	caps.get(base)
		.or_else(|| caps.get(base + 1))
		.or_else(|| caps.get(base + 2))
		.map_or("", |capture| capture.as_str())
}

/// The rightmost integer within a text slice, if any.
fn last_integer(text: &str) -> Option<u64> {
	INTEGER
		.find_iter(text)
		.last()
		.and_then(|found| found.as_str().parse().ok())
}

/// Resolve an `n` count token: the rightmost integer before the match in
/// the same text node, else the rightmost integer of the nearest preceding
/// value-bearing sibling. Stops at the first sibling containing one.
fn preceding_count(prefix: &str, preceding: &[Node]) -> Option<u64> {
	if let Some(count) = last_integer(prefix) {
		return Some(count);
	}

	for sibling in preceding.iter().rev() {
		let Some(value) = sibling.value() else {
			continue;
		};
		if INTEGER.is_match(value) {
			return last_integer(value);
		}
	}

	None
}

/// Replace every resolvable plural token in `value`, leaving unmatched text
/// and unresolvable tokens byte-for-byte intact. All `n` lookups read the
/// original text, never the progressively rewritten result. Returns `None`
/// when no token matched at all.
pub(crate) fn rewrite_plural_tokens(value: &str, preceding: &[Node]) -> Option<String> {
	let mut result = String::new();
	let mut last_index = 0;

	for caps in PLURAL_TOKEN.captures_iter(value) {
		let whole = caps.get(0).expect("match has a whole capture");
		let count_token = &caps[1];

		let count = if count_token == "n" {
			preceding_count(&value[..whole.start()], preceding)
		} else {
			count_token.parse().ok()
		};

		let replacement = match count {
			Some(count) => match russian_plural_form(count) {
				PluralForm::One => form(&caps, 2),
				PluralForm::Few => form(&caps, 5),
				PluralForm::Many | PluralForm::Other => form(&caps, 8),
			},
			// No integer found anywhere: leave the literal token.
			None => whole.as_str(),
		};

		result.push_str(&value[last_index..whole.start()]);
		result.push_str(replacement);
		last_index = whole.end();
	}

	if last_index == 0 {
		return None;
	}

	result.push_str(&value[last_index..]);
	Some(result)
}
