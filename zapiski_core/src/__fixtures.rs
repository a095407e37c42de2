use chrono::DateTime;
use chrono::Utc;

use crate::ContentRecord;
use crate::Dictionary;
use crate::RecordKind;
use crate::Translator;

pub const EN_DICTIONARY: &str = r#"
site:
  title: "Notes and jottings"
  sections:
    - "Notes"
    - "Jottings"
greeting: "Hello, {name}!"
sensitive:
  feed: "This entry is sensitive. Read it on the site: {link}"
notification:
  count:
    one: "{integer} entry"
    many: "{integer} entries"
likes:
  one: "{count} like"
  many: "{count} likes"
tags:
  applied:
    words:
      one: "tag {words} applied"
      many: "tags {words} applied"
empty: ""
"#;

pub const RU_DICTIONARY: &str = r#"
site:
  title: "Записки"
greeting: "Привет, {name}!"
notification:
  count:
    one: "{integer} запись"
    few: "{integer} записи"
    many: "{integer} записей"
days:
  one: "день"
  few: "дня"
  many: "дней"
"#;

pub fn translator() -> Translator {
	let en = Dictionary::from_yaml(EN_DICTIONARY).expect("en fixture dictionary parses");
	let ru = Dictionary::from_yaml(RU_DICTIONARY).expect("ru fixture dictionary parses");

	Translator::new("en").with_locale("en", en).with_locale("ru", ru)
}

pub fn timestamp(date: &str) -> DateTime<Utc> {
	format!("{date}T00:00:00Z")
		.parse()
		.expect("fixture timestamp parses")
}

pub fn note_record(id: &str, date: &str, priority: u32) -> ContentRecord {
	let locale = id.split('/').next().unwrap_or_default().to_string();

	ContentRecord {
		id: id.to_string(),
		locale,
		kind: RecordKind::Note,
		title: "Ownership in Rust".to_string(),
		description: None,
		series: None,
		tags: vec![],
		groups: vec![],
		sensitive: false,
		priority,
		timestamp: timestamp(date),
		last_updated: None,
		draft: false,
		hidden: false,
	}
}

pub fn jotting_record(id: &str, date: &str, priority: u32) -> ContentRecord {
	ContentRecord {
		kind: RecordKind::Jotting,
		..note_record(id, date, priority)
	}
}
