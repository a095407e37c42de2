use std::collections::BTreeMap;
use std::fmt::Display;

use markdown::ParseOptions;
use markdown::mdast;
use markdown::to_mdast;
use serde::Deserialize;
use serde::Serialize;

use crate::ZapiskiError;
use crate::ZapiskiResult;

/// A rendering attribute attached to a heading, parsed from a trailing
/// `{...}` attribute group.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
	String(String),
	Int(i64),
	Bool(bool),
}

impl AttrValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttrValue::String(value) => Some(value),
			_ => None,
		}
	}
}

impl Display for AttrValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AttrValue::String(value) => write!(f, "{value}"),
			AttrValue::Int(value) => write!(f, "{value}"),
			AttrValue::Bool(value) => write!(f, "{value}"),
		}
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::String(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		AttrValue::String(value)
	}
}

impl From<i64> for AttrValue {
	fn from(value: i64) -> Self {
		AttrValue::Int(value)
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

/// The rendering-attribute bag of a heading, keyed by attribute name.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A heading node (`# ...` through `###### ...`).
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
	/// Heading level, 1 through 6.
	pub depth: u8,
	pub children: Vec<Node>,
	/// Rendering attributes, empty until the rewriter parses a trailing
	/// attribute group.
	pub attributes: AttrMap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
	pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
	pub value: String,
}

/// A fenced code block together with its declared language tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Code {
	pub value: String,
	pub lang: Option<String>,
	pub meta: Option<String>,
}

/// Raw markup passed through to the renderer verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct Html {
	pub value: String,
}

/// Any node kind the rewriter does not special-case. Carried through the
/// pipeline byte-identical; `kind` keeps the original tag for the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Other {
	pub kind: String,
	pub value: Option<String>,
	pub children: Vec<Node>,
}

/// One node of the document tree.
///
/// Invariant: a node carries either a `value` or `children`, never both.
/// The conversion from mdast upholds this; the rewriter preserves it.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Node {
	Heading(Heading),
	Paragraph(Paragraph),
	Text(Text),
	Code(Code),
	Html(Html),
	Other(Other),
}

impl Node {
	/// The raw text of value-bearing nodes (text, code, html, and
	/// value-carrying passthrough nodes such as inline code).
	pub fn value(&self) -> Option<&str> {
		match self {
			Node::Text(text) => Some(&text.value),
			Node::Code(code) => Some(&code.value),
			Node::Html(html) => Some(&html.value),
			Node::Other(other) => other.value.as_deref(),
			Node::Heading(_) | Node::Paragraph(_) => None,
		}
	}

	pub fn children(&self) -> Option<&[Node]> {
		match self {
			Node::Heading(heading) => Some(&heading.children),
			Node::Paragraph(paragraph) => Some(&paragraph.children),
			Node::Other(other) if !other.children.is_empty() => Some(&other.children),
			_ => None,
		}
	}

	pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
		match self {
			Node::Heading(heading) => Some(&mut heading.children),
			Node::Paragraph(paragraph) => Some(&mut paragraph.children),
			Node::Other(other) if !other.children.is_empty() => Some(&mut other.children),
			_ => None,
		}
	}
}

/// A parsed markdown document: the ordered forest the rewriter operates on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
	pub children: Vec<Node>,
}

impl Document {
	/// Parse markdown into a document tree using the external markdown
	/// parser, converting its mdast output into the closed node set above.
	pub fn from_markdown(content: impl AsRef<str>) -> ZapiskiResult<Self> {
		let options = ParseOptions::gfm();
		let mdast = to_mdast(content.as_ref(), &options)
			.map_err(|e| ZapiskiError::Markdown(e.to_string()))?;

		let children = match mdast {
			mdast::Node::Root(root) => root.children.into_iter().map(convert).collect(),
			node => vec![convert(node)],
		};

		Ok(Self { children })
	}
}

fn convert(node: mdast::Node) -> Node {
	match node {
		mdast::Node::Heading(heading) => Node::Heading(Heading {
			depth: heading.depth,
			children: heading.children.into_iter().map(convert).collect(),
			attributes: AttrMap::new(),
		}),
		mdast::Node::Paragraph(paragraph) => Node::Paragraph(Paragraph {
			children: paragraph.children.into_iter().map(convert).collect(),
		}),
		mdast::Node::Text(text) => Node::Text(Text { value: text.value }),
		mdast::Node::Code(code) => Node::Code(Code {
			value: code.value,
			lang: code.lang,
			meta: code.meta,
		}),
		mdast::Node::Html(html) => Node::Html(Html { value: html.value }),
		node => convert_other(node),
	}
}

/// Convert a node kind the rewriter does not special-case. Value-bearing
/// kinds keep their raw value so sibling scans (inline pluralization) can
/// still see them.
fn convert_other(node: mdast::Node) -> Node {
	let kind = kind_of(&node).to_string();

	match node {
		mdast::Node::InlineCode(code) => Node::Other(Other {
			kind,
			value: Some(code.value),
			children: vec![],
		}),
		mdast::Node::InlineMath(math) => Node::Other(Other {
			kind,
			value: Some(math.value),
			children: vec![],
		}),
		mdast::Node::Math(math) => Node::Other(Other {
			kind,
			value: Some(math.value),
			children: vec![],
		}),
		mdast::Node::Toml(toml) => Node::Other(Other {
			kind,
			value: Some(toml.value),
			children: vec![],
		}),
		mdast::Node::Yaml(yaml) => Node::Other(Other {
			kind,
			value: Some(yaml.value),
			children: vec![],
		}),
		mut node => {
			let children = node
				.children_mut()
				.map(std::mem::take)
				.unwrap_or_default()
				.into_iter()
				.map(convert)
				.collect();

			Node::Other(Other {
				kind,
				value: None,
				children,
			})
		}
	}
}

fn kind_of(node: &mdast::Node) -> &'static str {
	match node {
		mdast::Node::Break(_) => "break",
		mdast::Node::Definition(_) => "definition",
		mdast::Node::Delete(_) => "delete",
		mdast::Node::Emphasis(_) => "emphasis",
		mdast::Node::FootnoteDefinition(_) => "footnoteDefinition",
		mdast::Node::FootnoteReference(_) => "footnoteReference",
		mdast::Node::Image(_) => "image",
		mdast::Node::ImageReference(_) => "imageReference",
		mdast::Node::InlineCode(_) => "inlineCode",
		mdast::Node::InlineMath(_) => "inlineMath",
		mdast::Node::Link(_) => "link",
		mdast::Node::LinkReference(_) => "linkReference",
		mdast::Node::List(_) => "list",
		mdast::Node::ListItem(_) => "listItem",
		mdast::Node::Math(_) => "math",
		mdast::Node::Strong(_) => "strong",
		mdast::Node::Table(_) => "table",
		mdast::Node::TableCell(_) => "tableCell",
		mdast::Node::TableRow(_) => "tableRow",
		mdast::Node::ThematicBreak(_) => "thematicBreak",
		mdast::Node::Toml(_) => "toml",
		mdast::Node::Yaml(_) => "yaml",
		_ => "unknown",
	}
}
