use tracing::trace;

use crate::attrs::apply_heading_attributes;
use crate::fences::diagram_node;
use crate::fences::is_diagram;
use crate::fences::normalize_code_language;
use crate::plural::rewrite_plural_tokens;
use crate::tree::Document;
use crate::tree::Node;

/// Rewrite a document tree in place and return it for chaining.
///
/// Four independent passes, each one full traversal touching only the node
/// kinds it targets: heading attribute groups, inline Russian
/// pluralization, fence language normalization, and diagram extraction.
///
/// Ordering note: language normalization runs before diagram extraction.
/// The extractor matches only the canonical diagram marker, and the
/// normalizer's alias set does not include it, so the two passes target
/// disjoint languages and the order between them carries no hidden
/// dependency. The heading and text passes are disjoint from both by node
/// kind.
pub fn rewrite(document: &mut Document) -> &mut Document {
	heading_attributes_pass(&mut document.children);
	inline_plural_pass(&mut document.children);
	language_normalize_pass(&mut document.children);
	diagram_extract_pass(&mut document.children);

	document
}

fn heading_attributes_pass(children: &mut Vec<Node>) {
	for node in children.iter_mut() {
		if let Node::Heading(heading) = node {
			apply_heading_attributes(heading);

			if !heading.attributes.is_empty() {
				trace!(depth = heading.depth, "parsed heading attribute group");
			}
		}

		if let Some(grandchildren) = node.children_mut() {
			heading_attributes_pass(grandchildren);
		}
	}
}

fn inline_plural_pass(children: &mut Vec<Node>) {
	for index in 0..children.len() {
		// Split so the current node can be rewritten while the preceding
		// siblings stay readable for the `n` count search.
		let (preceding, rest) = children.split_at_mut(index);

		match &mut rest[0] {
			Node::Text(text) => {
				if let Some(rewritten) = rewrite_plural_tokens(&text.value, preceding) {
					text.value = rewritten;
				}
			}
			node => {
				if let Some(grandchildren) = node.children_mut() {
					inline_plural_pass(grandchildren);
				}
			}
		}
	}
}

fn language_normalize_pass(children: &mut Vec<Node>) {
	for node in children.iter_mut() {
		if let Node::Code(code) = node {
			normalize_code_language(code);
		} else if let Some(grandchildren) = node.children_mut() {
			language_normalize_pass(grandchildren);
		}
	}
}

fn diagram_extract_pass(children: &mut Vec<Node>) {
	for node in children.iter_mut() {
		if let Node::Code(code) = node {
			if is_diagram(code) {
				trace!("extracted diagram block");
				let replacement = diagram_node(code);
				// Substitute in place so the position among siblings is
				// preserved.
				*node = replacement;
			}
		} else if let Some(grandchildren) = node.children_mut() {
			diagram_extract_pass(grandchildren);
		}
	}
}
