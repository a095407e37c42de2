use std::cmp::Ordering;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::text::DEFAULT_EXCERPT_LIMIT;
use crate::text::TokenSource;
use crate::text::excerpt;
use crate::text::search_tokens;

/// Excerpt bound for jottings, which render in tighter listings than
/// notes.
pub const JOTTING_EXCERPT_LIMIT: usize = 120;

/// The two publishable content kinds.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
	Note,
	Jotting,
}

impl RecordKind {
	pub fn as_str(self) -> &'static str {
		match self {
			RecordKind::Note => "note",
			RecordKind::Jotting => "jotting",
		}
	}

	fn excerpt_limit(self) -> usize {
		match self {
			RecordKind::Note => DEFAULT_EXCERPT_LIMIT,
			RecordKind::Jotting => JOTTING_EXCERPT_LIMIT,
		}
	}
}

/// One queryable unit of content, produced by the content-loading
/// collaborator. Immutable input to the core; only read, never written
/// back.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ContentRecord {
	/// Locale-prefixed path, stable and unique (e.g. `ru/notes/rust`).
	pub id: String,
	pub locale: String,
	#[serde(rename = "type")]
	pub kind: RecordKind,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub series: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub groups: Vec<String>,
	#[serde(default)]
	pub sensitive: bool,
	/// Anchoring priority (`top` in frontmatter); higher sorts first.
	#[serde(default)]
	pub priority: u32,
	pub timestamp: DateTime<Utc>,
	#[serde(default)]
	pub last_updated: Option<DateTime<Utc>>,
	#[serde(default)]
	pub draft: bool,
	/// Excluded from search and auto-suggestions (`remove_from_search`).
	#[serde(default)]
	pub hidden: bool,
}

impl ContentRecord {
	/// The id with its locale prefix stripped.
	pub fn slug(&self) -> &str {
		self.id
			.split_once('/')
			.map_or(self.id.as_str(), |(_, rest)| rest)
	}
}

/// The per-record search projection, regenerated on every query.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchEntry {
	pub id: String,
	pub slug: String,
	pub locale: String,
	#[serde(rename = "type")]
	pub kind: RecordKind,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub series: Option<String>,
	pub tags: Vec<String>,
	pub sensitive: bool,
	pub timestamp: DateTime<Utc>,
	pub url: String,
	pub excerpt: String,
	#[serde(rename = "searchText")]
	pub search_text: String,
	pub priority: u32,
}

/// The per-record feed projection. Body rendering stays with the feed
/// serializer; sensitive entries are flagged so it can substitute a
/// localized notice.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedEntry {
	pub id: String,
	pub title: String,
	pub url: String,
	pub timestamp: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub sensitive: bool,
	pub priority: u32,
}

/// Whether a record belongs in the search index for `locale`. Drafts are
/// excluded unless previewing; hidden records are always excluded.
pub fn is_searchable(record: &ContentRecord, locale: &str, preview: bool) -> bool {
	let published = preview || !record.draft;

	published && !record.hidden && record.locale == locale
}

/// Project one record into its search entry. The body is the record's raw
/// markdown source; the url comes from the routing collaborator.
pub fn build_search_entry(record: &ContentRecord, body: &str, url: impl Into<String>) -> SearchEntry {
	let excerpt_text = record
		.description
		.clone()
		.unwrap_or_else(|| excerpt(body, record.kind.excerpt_limit()));

	let search_text = search_tokens(&TokenSource {
		title: Some(&record.title),
		description: record.description.as_deref(),
		body: Some(body),
		tags: &record.tags,
		..TokenSource::default()
	});

	SearchEntry {
		id: record.id.clone(),
		slug: record.slug().to_string(),
		locale: record.locale.clone(),
		kind: record.kind,
		title: record.title.clone(),
		description: record.description.clone(),
		series: record.series.clone(),
		tags: record.tags.clone(),
		sensitive: record.sensitive,
		timestamp: record.timestamp,
		url: url.into(),
		excerpt: excerpt_text,
		search_text,
		priority: record.priority,
	}
}

/// The search payload for one locale, items already ranked.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchIndex {
	pub locale: String,
	pub items: Vec<SearchEntry>,
}

impl SearchIndex {
	pub fn new(locale: impl Into<String>, mut items: Vec<SearchEntry>) -> Self {
		sort_by_importance(&mut items);
		let index = Self {
			locale: locale.into(),
			items,
		};
		debug!(locale = %index.locale, items = index.items.len(), "built search index");
		index
	}
}

/// Anything orderable by the shared priority-then-recency rule.
pub trait Ranked {
	fn priority(&self) -> u32;
	fn timestamp(&self) -> DateTime<Utc>;
}

impl Ranked for ContentRecord {
	fn priority(&self) -> u32 {
		self.priority
	}

	fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}
}

impl Ranked for SearchEntry {
	fn priority(&self) -> u32 {
		self.priority
	}

	fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}
}

impl Ranked for FeedEntry {
	fn priority(&self) -> u32 {
		self.priority
	}

	fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}
}

/// Total order shared by search indexing and feed assembly: priority
/// descending, then timestamp descending. Equal keys compare equal, so
/// a stable sort leaves their input order untouched.
pub fn compare<T: Ranked>(a: &T, b: &T) -> Ordering {
	b.priority()
		.cmp(&a.priority())
		.then_with(|| b.timestamp().cmp(&a.timestamp()))
}

/// Stable sort by [`compare`]; repeated runs on identical input produce
/// identical output order.
pub fn sort_by_importance<T: Ranked>(entries: &mut [T]) {
	entries.sort_by(|a, b| compare(a, b));
}

/// Feed selection criteria, mirroring the feed endpoint's query
/// parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedFilter {
	/// Section names to include; empty or `"*"` means every section.
	pub sections: Vec<String>,
	pub series: Option<String>,
	pub tag: Option<String>,
	pub preview: bool,
}

impl FeedFilter {
	/// Parse a comma-separated section parameter (`"note,jotting"`, `"*"`).
	pub fn with_sections(mut self, sections: &str) -> Self {
		self.sections = sections
			.split(',')
			.map(|section| section.trim().to_string())
			.filter(|section| !section.is_empty())
			.collect();
		self
	}

	fn section_matches(&self, record: &ContentRecord) -> bool {
		self.sections.is_empty()
			|| self
				.sections
				.iter()
				.any(|section| section == "*" || section == record.kind.as_str())
	}

	/// Whether a record passes this filter for the requested locale.
	pub fn matches(&self, record: &ContentRecord, locale: &str) -> bool {
		let published = self.preview || !record.draft;
		// Series filtering applies to notes; jottings never carry a
		// series and are not excluded by one.
		let series_ok = match record.kind {
			RecordKind::Note => {
				self.series.is_none() || record.series.as_deref() == self.series.as_deref()
			}
			RecordKind::Jotting => true,
		};
		let tag_ok = self
			.tag
			.as_ref()
			.is_none_or(|tag| record.tags.iter().any(|candidate| candidate == tag));

		published && record.locale == locale && self.section_matches(record) && series_ok && tag_ok
	}
}

/// Assemble the feed for one locale: filter, project, rank, and cap.
/// `url_for` supplies each record's absolute or relative url from the
/// routing collaborator.
pub fn build_feed(
	records: &[ContentRecord],
	locale: &str,
	filter: &FeedFilter,
	limit: Option<usize>,
	mut url_for: impl FnMut(&ContentRecord) -> String,
) -> Vec<FeedEntry> {
	let mut entries: Vec<FeedEntry> = records
		.iter()
		.filter(|record| filter.matches(record, locale))
		.map(|record| {
			FeedEntry {
				id: record.id.clone(),
				title: record.title.clone(),
				url: url_for(record),
				timestamp: record.timestamp,
				description: record.description.clone(),
				tags: record.tags.clone(),
				sensitive: record.sensitive,
				priority: record.priority,
			}
		})
		.collect();

	sort_by_importance(&mut entries);

	if let Some(limit) = limit {
		entries.truncate(limit);
	}

	debug!(locale, entries = entries.len(), "assembled feed");
	entries
}
