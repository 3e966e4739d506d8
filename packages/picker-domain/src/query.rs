//! Parser for the search box mini-language.
//!
//! ```text
//! dancing "slow motion" tag:celebration tag:"new year" -tag:sad
//! ```
//!
//! Clauses are stripped in a fixed order: negative quoted tags, negative bare tags, positive
//! quoted tags, positive bare tags, quoted phrases. Whatever is left becomes the loose text.

use std::sync::LazyLock;

use regex::Regex;

static NEGATIVE_QUOTED_TAG: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r#"-tag:"([^"]*)""#).ok());
static NEGATIVE_BARE_TAG: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"-tag:(\S+)").ok());
static QUOTED_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#"tag:"([^"]*)""#).ok());
static BARE_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"tag:(\S+)").ok());
static PHRASE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).ok());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
	/// The input exactly as typed.
	pub raw: String,
	pub phrases: Vec<String>,
	pub loose_text: String,
	/// Lower-cased, first occurrence order, no duplicates.
	pub tags: Vec<String>,
	/// Lower-cased, first occurrence order, no duplicates.
	pub negative_tags: Vec<String>,
}
impl ParsedQuery {
	/// True when the query carries nothing to search or filter by.
	pub fn is_browse(&self) -> bool {
		self.phrases.is_empty()
			&& self.tags.is_empty()
			&& self.negative_tags.is_empty()
			&& self.loose_text.is_empty()
	}
}

/// Total: every input parses, including empty input and unbalanced quotes.
pub fn parse(raw: &str) -> ParsedQuery {
	let mut negative_tags = Vec::new();
	let mut tags = Vec::new();
	let mut phrases = Vec::new();
	let mut working = raw.to_string();

	working = strip(&working, &NEGATIVE_QUOTED_TAG, |value| push_tag(&mut negative_tags, value));
	working = strip(&working, &NEGATIVE_BARE_TAG, |value| push_tag(&mut negative_tags, value));
	working = strip(&working, &QUOTED_TAG, |value| push_tag(&mut tags, value));
	working = strip(&working, &BARE_TAG, |value| push_tag(&mut tags, value));
	working = strip(&working, &PHRASE, |value| {
		let phrase = value.trim();

		if !phrase.is_empty() {
			phrases.push(phrase.to_string());
		}
	});

	let loose_text = working.split_whitespace().collect::<Vec<_>>().join(" ");

	ParsedQuery { raw: raw.to_string(), phrases, loose_text, tags, negative_tags }
}

// Each match is replaced by a space so that removing a clause never glues its neighbours into a
// new clause.
fn strip<F>(input: &str, pattern: &LazyLock<Option<Regex>>, mut on_capture: F) -> String
where
	F: FnMut(&str),
{
	let Some(re) = pattern.as_ref() else {
		return input.to_string();
	};
	let mut out = String::with_capacity(input.len());
	let mut last = 0;

	for caps in re.captures_iter(input) {
		let Some(whole) = caps.get(0) else {
			continue;
		};

		if let Some(value) = caps.get(1) {
			on_capture(value.as_str());
		}

		out.push_str(&input[last..whole.start()]);
		out.push(' ');

		last = whole.end();
	}

	out.push_str(&input[last..]);

	out
}

fn push_tag(out: &mut Vec<String>, value: &str) {
	let tag = value.trim().to_lowercase();

	if tag.is_empty() || out.contains(&tag) {
		return;
	}

	out.push(tag);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_mixed_query_into_clauses() {
		let parsed = parse(r#"cat tag:funny -tag:sad "exact phrase""#);

		assert_eq!(parsed.tags, vec!["funny".to_string()]);
		assert_eq!(parsed.negative_tags, vec!["sad".to_string()]);
		assert_eq!(parsed.phrases, vec!["exact phrase".to_string()]);
		assert_eq!(parsed.loose_text, "cat");
	}

	#[test]
	fn keeps_quoted_tag_whole() {
		let parsed = parse(r#"tag:"live leak" stuff"#);

		assert_eq!(parsed.tags, vec!["live leak".to_string()]);
		assert_eq!(parsed.loose_text, "stuff");
	}

	#[test]
	fn lower_cases_tag_values() {
		let parsed = parse(r#"tag:Funny -tag:"Very SAD""#);

		assert_eq!(parsed.tags, vec!["funny".to_string()]);
		assert_eq!(parsed.negative_tags, vec!["very sad".to_string()]);
		assert!(parsed.loose_text.is_empty());
	}

	#[test]
	fn negative_tags_are_not_read_as_positive() {
		let parsed = parse("-tag:sad dancing");

		assert!(parsed.tags.is_empty());
		assert_eq!(parsed.negative_tags, vec!["sad".to_string()]);
		assert_eq!(parsed.loose_text, "dancing");
	}

	#[test]
	fn unterminated_quote_stays_in_loose_text() {
		let parsed = parse(r#"happy "birthday"#);

		assert!(parsed.phrases.is_empty());
		assert_eq!(parsed.loose_text, r#"happy "birthday"#);
	}

	#[test]
	fn phrases_keep_encounter_order_and_are_trimmed() {
		let parsed = parse(r#""  second  " middle "first""#);

		assert_eq!(parsed.phrases, vec!["second".to_string(), "first".to_string()]);
		assert_eq!(parsed.loose_text, "middle");
	}

	#[test]
	fn duplicate_tags_collapse() {
		let parsed = parse("tag:cat tag:CAT tag:dog");

		assert_eq!(parsed.tags, vec!["cat".to_string(), "dog".to_string()]);
	}

	#[test]
	fn empty_input_is_browse() {
		assert!(parse("").is_browse());
		assert!(parse("   ").is_browse());
		assert!(!parse("tag:funny").is_browse());
	}

	#[test]
	fn reparsing_loose_text_is_stable() {
		for raw in [
			r#"cat tag:funny -tag:sad "exact phrase""#,
			r#""p"-tag:x trailing"#,
			r#"t"x"ag:y"#,
			r#"a "b" "c"#,
			"tag: spaced -tag:",
			r#"tag:"" """#,
		] {
			let first = parse(raw);
			let second = parse(&first.loose_text);

			assert_eq!(second.loose_text, first.loose_text, "input: {raw}");
			assert!(second.tags.is_empty(), "input: {raw}");
			assert!(second.negative_tags.is_empty(), "input: {raw}");
			assert!(second.phrases.is_empty(), "input: {raw}");
		}
	}
}
