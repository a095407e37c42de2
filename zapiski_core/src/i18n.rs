use std::collections::BTreeMap;
use std::sync::LazyLock;

use derive_more::Deref;
use derive_more::DerefMut;
use regex::Captures;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::ZapiskiError;
use crate::ZapiskiResult;
use crate::plural::PluralForm;

/// The grammatical-form keys a plural-form mapping may carry.
pub const PLURAL_FORM_KEYS: [&str; 4] = ["one", "few", "many", "other"];

/// Alternative templates for one message, keyed by grammatical number.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PluralForms {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub one: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub few: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub many: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub other: Option<String>,
}

impl PluralForms {
	pub fn get(&self, form: PluralForm) -> Option<&str> {
		match form {
			PluralForm::One => self.one.as_deref(),
			PluralForm::Few => self.few.as_deref(),
			PluralForm::Many => self.many.as_deref(),
			PluralForm::Other => self.other.as_deref(),
		}
	}

	/// Last-resort rendering when neither the selected form nor "many"
	/// exists: a raw dump of the mapping, visible in the UI on purpose.
	fn dump(&self) -> String {
		serde_json::to_string(self).unwrap_or_default()
	}
}

/// One node of a typed locale dictionary. The YAML shapes are validated
/// and converted once at the loading boundary so resolution never probes
/// value shapes at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum TranslationNode {
	/// A single interpolable template string.
	Leaf(String),
	/// A list translation, returned verbatim without interpolation.
	List(Vec<String>),
	/// A plural-form mapping.
	Plural(PluralForms),
	/// A nested mapping, insertion order preserved.
	Nested(Vec<(String, TranslationNode)>),
}

/// All translatable strings of one locale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
	root: Vec<(String, TranslationNode)>,
}

impl Dictionary {
	/// Parse a YAML document into a typed dictionary.
	pub fn from_yaml(source: &str) -> ZapiskiResult<Self> {
		let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(source)
			.map_err(|e| ZapiskiError::DictionaryParse(e.to_string()))?;

		Self::from_value(value)
	}

	/// Convert an already-loaded YAML value into a typed dictionary. The
	/// root must be a mapping.
	pub fn from_value(value: serde_yaml_ng::Value) -> ZapiskiResult<Self> {
		match convert_node(value, "")? {
			TranslationNode::Nested(root) => Ok(Self { root }),
			_ => {
				Err(ZapiskiError::DictionaryShape {
					path: String::new(),
					reason: "dictionary root must be a mapping".to_string(),
				})
			}
		}
	}

	/// Walk a dot-path key level by level. Returns `None` as soon as an
	/// intermediate level is not a nested mapping or a segment is absent.
	pub fn lookup(&self, key: &str) -> Option<&TranslationNode> {
		let mut children: &[(String, TranslationNode)] = &self.root;
		let mut segments = key.split('.').peekable();
		let mut found: Option<&TranslationNode> = None;

		while let Some(segment) = segments.next() {
			let node = children
				.iter()
				.find(|(name, _)| name == segment)
				.map(|(_, node)| node)?;

			if segments.peek().is_some() {
				match node {
					TranslationNode::Nested(next) => children = next,
					_ => return None,
				}
			} else {
				found = Some(node);
			}
		}

		found
	}
}

fn joined(path: &str, key: &str) -> String {
	if path.is_empty() {
		key.to_string()
	} else {
		format!("{path}.{key}")
	}
}

fn convert_node(value: serde_yaml_ng::Value, path: &str) -> ZapiskiResult<TranslationNode> {
	match value {
		serde_yaml_ng::Value::String(leaf) => Ok(TranslationNode::Leaf(leaf)),
		serde_yaml_ng::Value::Sequence(sequence) => {
			let mut items = Vec::with_capacity(sequence.len());
			for item in sequence {
				match item {
					serde_yaml_ng::Value::String(item) => items.push(item),
					_ => {
						return Err(ZapiskiError::DictionaryShape {
							path: path.to_string(),
							reason: "list translations may only contain strings".to_string(),
						});
					}
				}
			}
			Ok(TranslationNode::List(items))
		}
		serde_yaml_ng::Value::Mapping(mapping) => convert_mapping(mapping, path),
		_ => {
			Err(ZapiskiError::DictionaryShape {
				path: path.to_string(),
				reason: "expected a string, a list of strings, or a mapping".to_string(),
			})
		}
	}
}

fn convert_mapping(
	mapping: serde_yaml_ng::Mapping,
	path: &str,
) -> ZapiskiResult<TranslationNode> {
	let mut entries: Vec<(String, serde_yaml_ng::Value)> = Vec::with_capacity(mapping.len());
	for (key, value) in mapping {
		let serde_yaml_ng::Value::String(key) = key else {
			return Err(ZapiskiError::DictionaryShape {
				path: path.to_string(),
				reason: "mapping keys must be strings".to_string(),
			});
		};
		entries.push((key, value));
	}

	// A mapping whose keys are a subset of the grammatical-form tags, with
	// plain string values throughout, is a plural-form mapping. Everything
	// else nests.
	let is_plural = !entries.is_empty()
		&& entries.iter().all(|(key, value)| {
			PLURAL_FORM_KEYS.contains(&key.as_str())
				&& matches!(value, serde_yaml_ng::Value::String(_))
		});

	if is_plural {
		let mut forms = PluralForms::default();
		for (key, value) in entries {
			let serde_yaml_ng::Value::String(template) = value else {
				continue;
			};
			match key.as_str() {
				"one" => forms.one = Some(template),
				"few" => forms.few = Some(template),
				"many" => forms.many = Some(template),
				_ => forms.other = Some(template),
			}
		}
		return Ok(TranslationNode::Plural(forms));
	}

	let mut children = Vec::with_capacity(entries.len());
	for (key, value) in entries {
		let child = convert_node(value, &joined(path, &key))?;
		children.push((key, child));
	}

	Ok(TranslationNode::Nested(children))
}

/// One interpolation parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
	Text(String),
	Number(f64),
	List(Vec<String>),
}

impl ParamValue {
	/// Numeric coercion for the integer-selection path. Strings parse the
	/// way a loose numeric cast would; non-finite values are rejected;
	/// lists never coerce.
	fn as_number(&self) -> Option<f64> {
		match self {
			ParamValue::Number(number) => Some(*number).filter(|n| n.is_finite()),
			ParamValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
			ParamValue::List(_) => None,
		}
	}

	/// The substitutable text of this value: lists join with `", "`.
	fn interpolated(&self) -> String {
		match self {
			ParamValue::Text(text) => text.clone(),
			ParamValue::Number(number) => number.to_string(),
			ParamValue::List(items) => items.join(", "),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		ParamValue::Text(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		ParamValue::Text(value)
	}
}

impl From<f64> for ParamValue {
	fn from(value: f64) -> Self {
		ParamValue::Number(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		ParamValue::Number(f64::from(value))
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		ParamValue::Number(value as f64)
	}
}

impl From<u64> for ParamValue {
	fn from(value: u64) -> Self {
		ParamValue::Number(value as f64)
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(value: Vec<String>) -> Self {
		ParamValue::List(value)
	}
}

impl From<&[&str]> for ParamValue {
	fn from(value: &[&str]) -> Self {
		ParamValue::List(value.iter().map(|item| (*item).to_string()).collect())
	}
}

/// Interpolation parameters passed to [`Translator::resolve`].
#[derive(Clone, Debug, Default, Deref, DerefMut, PartialEq)]
pub struct Params(
	#[deref]
	#[deref_mut]
	BTreeMap<String, ParamValue>,
);

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Chainable insertion, mainly for call sites building params inline.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}
}

/// A resolved translation: either a single rendered string or a raw list.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
	Text(String),
	List(Vec<String>),
}

impl Resolved {
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Resolved::Text(text) => Some(text),
			Resolved::List(_) => None,
		}
	}

	pub fn as_list(&self) -> Option<&[String]> {
		match self {
			Resolved::List(items) => Some(items),
			Resolved::Text(_) => None,
		}
	}
}

/// Placeholder syntax: `{name}`, ASCII word characters only.
static PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern compiles"));

/// Replace `{name}` placeholders from `params`. Unknown placeholders stay
/// in the output verbatim, a deliberate debugging aid.
fn interpolate(template: &str, params: Option<&Params>) -> String {
	PLACEHOLDER
		.replace_all(template, |caps: &Captures<'_>| {
			params
				.and_then(|params| params.get(&caps[1]))
				.map_or_else(|| caps[0].to_string(), ParamValue::interpolated)
		})
		.into_owned()
}

/// Integer-path form selection: the Russian cardinal rule for `ru*`
/// locales, the `n == 1` rule otherwise.
#[allow(clippy::float_cmp)]
fn integer_form(locale: &str, n: f64) -> PluralForm {
	if locale.starts_with("ru") {
		let m10 = n % 10.0;
		let m100 = n % 100.0;

		if m10 == 1.0 && m100 != 11.0 {
			return PluralForm::One;
		}
		if (2.0..=4.0).contains(&m10) && !(12.0..=14.0).contains(&m100) {
			return PluralForm::Few;
		}
		return PluralForm::Many;
	}

	if n == 1.0 {
		PluralForm::One
	} else {
		PluralForm::Many
	}
}

/// Text-path form selection is identity-only: lexical items do not carry
/// the "few" agreement bare integers do, in any supported locale.
fn text_form(count: usize) -> PluralForm {
	if count == 1 {
		PluralForm::One
	} else {
		PluralForm::Many
	}
}

/// How the plural selector was derived from the params.
enum Selector {
	/// `integer`/`count` coerced to a finite number.
	Count(f64),
	/// `text`/`words`: a scalar counts as one, a list by its length.
	Words(usize),
}

fn selector_from(params: &Params) -> Option<Selector> {
	if let Some(value) = params.get("integer").or_else(|| params.get("count")) {
		// A present but non-numeric count never falls through to the text
		// path.
		return value.as_number().map(Selector::Count);
	}

	match params.get("text").or_else(|| params.get("words"))? {
		ParamValue::Text(_) | ParamValue::Number(_) => Some(Selector::Words(1)),
		ParamValue::List(items) => Some(Selector::Words(items.len())),
	}
}

/// The translation resolver: all locale dictionaries plus the designated
/// default locale, constructed once at process start and read-only after.
#[derive(Clone, Debug)]
pub struct Translator {
	locales: BTreeMap<String, Dictionary>,
	default_locale: String,
}

impl Translator {
	pub fn new(default_locale: impl Into<String>) -> Self {
		Self {
			locales: BTreeMap::new(),
			default_locale: default_locale.into(),
		}
	}

	/// Chainable dictionary registration for process-start construction.
	pub fn with_locale(mut self, code: impl Into<String>, dictionary: Dictionary) -> Self {
		self.locales.insert(code.into(), dictionary);
		self
	}

	pub fn add_locale(&mut self, code: impl Into<String>, dictionary: Dictionary) {
		self.locales.insert(code.into(), dictionary);
	}

	pub fn default_locale(&self) -> &str {
		&self.default_locale
	}

	fn lookup(&self, locale: &str, key: &str) -> Option<&TranslationNode> {
		self.locales.get(locale)?.lookup(key)
	}

	/// Resolve a dot-path key against a locale, falling back to the
	/// default locale, then to the key itself. Never fails: missing keys,
	/// unusable plural params, and unknown placeholders all degrade to
	/// visible output.
	pub fn resolve(&self, locale: &str, key: &str, params: Option<&Params>) -> Resolved {
		let node = self.lookup(locale, key).or_else(|| {
			debug!(locale, key, "falling back to default locale");
			self.lookup(&self.default_locale, key)
		});

		let Some(node) = node else {
			debug!(locale, key, "translation missing, echoing key");
			return Resolved::Text(key.to_string());
		};

		match node {
			TranslationNode::List(items) => Resolved::List(items.clone()),
			TranslationNode::Leaf(template) => Resolved::Text(interpolate(template, params)),
			TranslationNode::Plural(forms) => self.resolve_plural(locale, key, forms, params),
			TranslationNode::Nested(children) => {
				// A mapping resolves only through a plural-form child:
				// probe in insertion order, first match wins.
				for (_, child) in children {
					if let TranslationNode::Plural(forms) = child {
						return self.resolve_plural(locale, key, forms, params);
					}
				}
				Resolved::Text(key.to_string())
			}
		}
	}

	fn resolve_plural(
		&self,
		locale: &str,
		key: &str,
		forms: &PluralForms,
		params: Option<&Params>,
	) -> Resolved {
		let Some(selector) = params.and_then(selector_from) else {
			// No usable selector param: behave as if the key had no
			// translation.
			return Resolved::Text(key.to_string());
		};

		let form = match selector {
			Selector::Count(n) => integer_form(locale, n),
			Selector::Words(count) => text_form(count),
		};

		let template = forms
			.get(form)
			.or_else(|| forms.get(PluralForm::Many))
			.map_or_else(|| forms.dump(), str::to_string);

		Resolved::Text(interpolate(&template, params))
	}
}
