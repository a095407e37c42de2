//! `zapiski_core` is the text-transformation and localization core of the
//! zapiski bilingual content site. It turns raw markdown documents and
//! translation dictionaries into normalized structures for rendering,
//! syndication, and search. Routing, HTTP responses, RSS/Atom
//! serialization, and content loading live in outer crates; this crate is
//! pure transforms over in-memory input.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown source
//!   -> Document tree (mdast bridge, closed node set)
//!   -> Rewriter (heading attributes, inline plurals, fence language
//!      normalization, diagram extraction)
//!   -> renderer (external)
//!
//! Markdown body -> plain text -> excerpt / search tokens
//! Translation key + params -> Translator -> localized string
//! Content records -> search / feed projections -> ranked output
//! ```
//!
//! ## Modules
//!
//! - [`tree`] - the document tree and the bridge from the external
//!   markdown parser.
//! - [`rewrite`] - the tree rewriter and its micro-syntax passes.
//! - [`text`] - plain-text extraction, excerpts, and search tokenization.
//! - [`i18n`] - typed locale dictionaries and the translation resolver.
//! - [`search`] - content records, search/feed projections, and ranking.
//!
//! ## Key Types
//!
//! - [`Document`] / [`Node`] - the parsed markdown forest the rewriter
//!   mutates in place.
//! - [`Translator`] - the resolver handle, built once at process start
//!   from per-locale [`Dictionary`] values and read-only afterwards.
//! - [`ContentRecord`] / [`SearchEntry`] / [`FeedEntry`] - one queryable
//!   unit of content and its derived projections.
//!
//! ## Quick Start
//!
//! ```rust
//! use zapiski_core::Dictionary;
//! use zapiski_core::Document;
//! use zapiski_core::Params;
//! use zapiski_core::Translator;
//! use zapiski_core::rewrite;
//!
//! # fn main() -> zapiski_core::ZapiskiResult<()> {
//! let mut document = Document::from_markdown("## Intro {#intro .lead}")?;
//! rewrite(&mut document);
//!
//! let translator = Translator::new("en")
//! 	.with_locale("en", Dictionary::from_yaml("greeting: \"Hello, {name}!\"")?);
//! let greeting = translator.resolve("en", "greeting", Some(&Params::new().with("name", "Ada")));
//! # Ok(())
//! # }
//! ```

pub use error::*;
pub use fences::CANONICAL_DSL;
pub use fences::DIAGRAM_LANGUAGE;
pub use i18n::*;
pub use plural::PluralForm;
pub use plural::russian_plural_form;
pub use rewrite::*;
pub use search::*;
pub use text::*;
pub use tree::*;

pub(crate) mod attrs;
mod error;
pub(crate) mod fences;
pub mod i18n;
pub(crate) mod plural;
mod rewrite;
pub mod search;
pub mod text;
pub mod tree;

#[cfg(test)]
mod __fixtures;
