use logos::Logos;

use crate::tree::AttrValue;
use crate::tree::Heading;
use crate::tree::Node;

/// Raw tokens produced by logos for the interior of a `{...}` attribute
/// group.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[regex(r"#[A-Za-z0-9_:.\-]+")]
	IdShorthand,
	#[regex(r"\.[A-Za-z0-9_:.\-]+")]
	ClassShorthand,
	#[token("=")]
	Equals,
	#[token(":")]
	Colon,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'([^'\\]|\\.)*'")]
	SingleQuotedString,
	#[regex(r"[0-9]+")]
	Number,
	#[regex(r"[A-Za-z_][-A-Za-z0-9_:.]*")]
	Ident,
}

/// Walks the raw token stream of one attribute group, collecting the id
/// shorthand, class shorthands, and key/value entries.
struct AttrWalker<'a> {
	source: &'a str,
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	cursor: usize,
	id: Option<String>,
	classes: Vec<String>,
	entries: Vec<(String, AttrValue)>,
}

impl<'a> AttrWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			id: None,
			classes: vec![],
			entries: vec![],
		}
	}

	/// Get the text slice for the current raw token.
	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	fn current(&self) -> Option<&Result<RawToken, ()>> {
		self.raw_tokens.get(self.cursor).map(|(result, _)| result)
	}

	fn skip_whitespace(&mut self) {
		while matches!(self.current(), Some(Ok(RawToken::Whitespace))) {
			self.cursor += 1;
		}
	}

	/// Set a key, overwriting any earlier entry for the same key in place.
	fn set(&mut self, key: &str, value: AttrValue) {
		if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == key) {
			entry.1 = value;
		} else {
			self.entries.push((key.to_string(), value));
		}
	}

	fn process(&mut self) {
		while self.cursor < self.raw_tokens.len() {
			let (result, _) = &self.raw_tokens[self.cursor];

			let Ok(raw) = result else {
				// Unrecognized bytes outside a value position are skipped.
				self.cursor += 1;
				continue;
			};

			match raw {
				RawToken::IdShorthand => {
					// `#id`: repeated occurrences overwrite, last one wins.
					self.id = Some(self.current_slice()[1..].to_string());
					self.cursor += 1;
				}
				RawToken::ClassShorthand => {
					// `.class`: all occurrences accumulate in source order.
					let class = self.current_slice()[1..].to_string();
					self.classes.push(class);
					self.cursor += 1;
				}
				RawToken::Ident => self.process_ident(),
				// Stray separators, numbers, and quoted strings with no
				// preceding key carry no meaning on their own.
				RawToken::Whitespace
				| RawToken::Equals
				| RawToken::Colon
				| RawToken::Number
				| RawToken::DoubleQuotedString
				| RawToken::SingleQuotedString => {
					self.cursor += 1;
				}
			}
		}
	}

	/// Handle an identifier run: a bare flag, a key followed by a `=`/`:`
	/// separator, or a run with the separator colon glued inside it.
	fn process_ident(&mut self) {
		let name = self.current_slice().to_string();
		self.cursor += 1;

		let checkpoint = self.cursor;
		self.skip_whitespace();
		if matches!(self.current(), Some(Ok(RawToken::Equals | RawToken::Colon))) {
			self.cursor += 1;
			self.skip_whitespace();
			if let Some(value) = self.read_value() {
				self.set(&name, value);
				return;
			}
			// A separator with no value degrades to a bare flag.
			self.set(&name, AttrValue::Bool(true));
			return;
		}
		self.cursor = checkpoint;

		if let Some(colon) = name.rfind(':') {
			if colon + 1 == name.len() {
				// Trailing colon donates the separator: `key: value`.
				self.skip_whitespace();
				if let Some(value) = self.read_value() {
					self.set(&name[..colon], value);
					return;
				}
				self.set(&name, AttrValue::Bool(true));
				return;
			}
			if colon > 0 {
				// Glued `key:value` splits at the last colon of the run.
				let value = coerce(&name[colon + 1..]);
				self.set(&name[..colon], value);
				return;
			}
		}

		self.set(&name, AttrValue::Bool(true));
	}

	/// Read a value after a separator: a quoted string, or a bare run of
	/// raw slices up to the next whitespace or quote.
	fn read_value(&mut self) -> Option<AttrValue> {
		match self.current()? {
			Ok(RawToken::DoubleQuotedString | RawToken::SingleQuotedString) => {
				let slice = self.current_slice();
				let inner = &slice[1..slice.len() - 1];
				self.cursor += 1;
				Some(AttrValue::String(unescape(inner)))
			}
			Ok(RawToken::Whitespace) => None,
			_ => {
				let mut value = String::new();

				while self.cursor < self.raw_tokens.len() {
					match self.current() {
						Some(Ok(RawToken::Whitespace)) => break,
						Some(Ok(
							RawToken::DoubleQuotedString | RawToken::SingleQuotedString,
						)) => break,
						_ => {
							value.push_str(self.current_slice());
							self.cursor += 1;
						}
					}
				}

				if value.is_empty() {
					None
				} else {
					Some(coerce(&value))
				}
			}
		}
	}
}

/// Resolve the escapes `\\`, `\"`, and `\'` inside a quoted value. Other
/// backslash sequences are kept verbatim.
fn unescape(inner: &str) -> String {
	if !inner.contains('\\') {
		return inner.to_string();
	}

	let mut unescaped = String::with_capacity(inner.len());
	let mut chars = inner.chars();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			unescaped.push(ch);
			continue;
		}

		match chars.next() {
			Some(escaped @ ('\\' | '"' | '\'')) => unescaped.push(escaped),
			Some(other) => {
				unescaped.push('\\');
				unescaped.push(other);
			}
			None => unescaped.push('\\'),
		}
	}

	unescaped
}

/// Coerce a bare value: all-digit runs become integers (when they fit in
/// `i64`), `true`/`false` become booleans, everything else stays a string.
fn coerce(raw: &str) -> AttrValue {
	if !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
		if let Ok(number) = raw.parse::<i64>() {
			return AttrValue::Int(number);
		}
		return AttrValue::String(raw.to_string());
	}

	match raw {
		"true" => AttrValue::Bool(true),
		"false" => AttrValue::Bool(false),
		_ => AttrValue::String(raw.to_string()),
	}
}

/// Parse the interior of an attribute group into its final entry list:
/// key/value entries in source order (last write wins per key), then the
/// accumulated `class` list, then the `#id` shorthand, matching the merge
/// precedence of the group syntax.
pub(crate) fn parse_attribute_group(source: &str) -> Vec<(String, AttrValue)> {
	let mut walker = AttrWalker::new(source);
	walker.process();

	let mut entries = std::mem::take(&mut walker.entries);

	if !walker.classes.is_empty() {
		let joined = walker.classes.join(" ");
		if let Some(entry) = entries.iter_mut().find(|(name, _)| name == "class") {
			entry.1 = AttrValue::String(joined);
		} else {
			entries.push(("class".to_string(), AttrValue::String(joined)));
		}
	}

	if let Some(id) = walker.id {
		if let Some(entry) = entries.iter_mut().find(|(name, _)| name == "id") {
			entry.1 = AttrValue::String(id);
		} else {
			entries.push(("id".to_string(), AttrValue::String(id)));
		}
	}

	entries
}

/// Detect a trailing `{...}` attribute group in a heading's last text
/// value. Returns the byte offset of the opening brace and the group
/// interior. Groups that are empty after trimming are not a match.
fn detect_attribute_group(value: &str) -> Option<(usize, &str)> {
	let trimmed = value.trim_end();
	if !trimmed.ends_with('}') {
		return None;
	}

	let open = value.find('{')?;
	let inner = trimmed.get(open + 1..trimmed.len() - 1)?;
	if inner.trim().is_empty() {
		return None;
	}

	Some((open, inner))
}

/// Parse and strip a trailing attribute group on a heading, merging the
/// parsed attributes into the heading's attribute bag. `id` overwrites any
/// previous id; `class` appends to any previous class value; all other
/// keys are set directly. Headings without a group are left untouched.
pub(crate) fn apply_heading_attributes(heading: &mut Heading) {
	let Some(Node::Text(text)) = heading.children.last() else {
		return;
	};
	let Some((open, inner)) = detect_attribute_group(&text.value) else {
		return;
	};

	let entries = parse_attribute_group(inner);
	let remaining = text.value[..open].trim_end().to_string();

	if remaining.is_empty() {
		heading.children.pop();
	} else if let Some(Node::Text(text)) = heading.children.last_mut() {
		text.value = remaining;
	}

	for (key, value) in entries {
		match key.as_str() {
			"id" => {
				heading.attributes.insert("id".to_string(), value);
			}
			"class" | "className" => append_class(heading, &value),
			_ => {
				heading.attributes.insert(key, value);
			}
		}
	}
}

fn append_class(heading: &mut Heading, value: &AttrValue) {
	let existing = heading
		.attributes
		.get("class")
		.or_else(|| heading.attributes.get("className"))
		.map(AttrValue::to_string);

	let class = match existing {
		Some(existing) => format!("{existing} {value}").trim().to_string(),
		None => value.to_string(),
	};

	heading
		.attributes
		.insert("class".to_string(), AttrValue::String(class));
}
