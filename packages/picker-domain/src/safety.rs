use std::collections::HashSet;

use serde_json::{Map, Value};

use picker_config::Config;

const LITERAL_FIELD: &str = "literal";
const DESCRIPTION_FIELD: &str = "description";
const COMBINED_TEXT_FIELD: &str = "combined_text";
const TAG_FIELD: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
	RemovedContent,
	BlockedTag(String),
}

/// Drops documents whose source media is gone or whose tags are on the block list.
#[derive(Debug, Clone)]
pub struct ContentFilter {
	blocked_tags: HashSet<String>,
	removed_marker: String,
	text_fields: Vec<String>,
	tag_field: String,
}
impl ContentFilter {
	pub fn new<I, S>(blocked_tags: I, removed_marker: &str) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			blocked_tags: blocked_tags.into_iter().map(|tag| tag.as_ref().to_lowercase()).collect(),
			removed_marker: removed_marker.to_lowercase(),
			text_fields: vec![
				LITERAL_FIELD.to_string(),
				DESCRIPTION_FIELD.to_string(),
				COMBINED_TEXT_FIELD.to_string(),
			],
			tag_field: TAG_FIELD.to_string(),
		}
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self::new(&cfg.safety.blocked_tags, &cfg.safety.removed_content_marker)
			.with_fields(&cfg.search.combined_text_field, &cfg.search.tag_field)
	}

	/// Points the filter at a table whose combined text or tags live under other names.
	pub fn with_fields(mut self, combined_text_field: &str, tag_field: &str) -> Self {
		self.text_fields = vec![
			LITERAL_FIELD.to_string(),
			DESCRIPTION_FIELD.to_string(),
			combined_text_field.to_string(),
		];
		self.tag_field = tag_field.to_string();

		self
	}

	pub fn check(&self, source: &Map<String, Value>) -> Result<(), DropReason> {
		for field in &self.text_fields {
			if let Some(text) = source.get(field).and_then(Value::as_str)
				&& text.to_lowercase().contains(&self.removed_marker)
			{
				return Err(DropReason::RemovedContent);
			}
		}

		let tags: Vec<&str> = match source.get(&self.tag_field) {
			Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
			Some(Value::String(tag)) => vec![tag.as_str()],
			_ => Vec::new(),
		};

		for tag in tags {
			let tag = tag.trim().to_lowercase();

			if self.blocked_tags.contains(&tag) {
				return Err(DropReason::BlockedTag(tag));
			}
		}

		Ok(())
	}

	pub fn allows(&self, source: &Map<String, Value>) -> bool {
		self.check(source).is_ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn source(value: Value) -> Map<String, Value> {
		value.as_object().cloned().expect("source must be an object")
	}

	#[test]
	fn drops_removed_content_in_any_casing() {
		let filter = ContentFilter::new(["nsfw"], "content has been removed");

		for field in ["literal", "description", "combined_text"] {
			let doc = source(serde_json::json!({ field: "This Content Has Been REMOVED." }));

			assert_eq!(filter.check(&doc), Err(DropReason::RemovedContent), "field: {field}");
		}
	}

	#[test]
	fn drops_blocked_tags_case_insensitively() {
		let filter = ContentFilter::new(["nsfw"], "content has been removed");
		let doc = source(serde_json::json!({ "tags": ["funny", "NSFW"] }));

		assert_eq!(filter.check(&doc), Err(DropReason::BlockedTag("nsfw".to_string())));
	}

	#[test]
	fn follows_renamed_fields() {
		let filter = ContentFilter::new(["nsfw"], "content has been removed")
			.with_fields("blob", "labels");
		let removed = source(serde_json::json!({ "blob": "content has been removed" }));
		let blocked = source(serde_json::json!({ "labels": "nsfw", "tags": ["ok"] }));

		assert_eq!(filter.check(&removed), Err(DropReason::RemovedContent));
		assert_eq!(filter.check(&blocked), Err(DropReason::BlockedTag("nsfw".to_string())));
	}

	#[test]
	fn keeps_clean_documents() {
		let filter = ContentFilter::new(["nsfw"], "content has been removed");
		let doc = source(serde_json::json!({
			"literal": "A cat jumps off a table.",
			"tags": ["cat", "fail"],
		}));

		assert!(filter.allows(&doc));
		assert!(filter.allows(&Map::new()));
	}
}
