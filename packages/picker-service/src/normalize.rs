//! Turns raw store responses into ranked, de-duplicated result records.
//!
//! Two hit dialects reach this module: `id` / `score` / `source` and `_id` / `_score` /
//! `_source`. Both are resolved here, once, by ordered fallback.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};
use picker_domain::safety::ContentFilter;

const URL_FIELDS: [&str; 2] = ["url", "gif_url"];
// Typed record fields; a document field with one of these names would collide once flattened.
const RESERVED_FIELDS: [&str; 4] = ["id", "score", "rank", "description"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
	pub id: String,
	/// Retrieval confidence. Only comparable within one retrieval mode.
	pub score: f64,
	/// 1-based position, set only when a query was active.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rank: Option<u32>,
	/// Empty when the document has no URL.
	pub url: String,
	pub description: String,
	/// Every other field of the stored document, untouched.
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedResults {
	pub records: Vec<ResultRecord>,
	pub total: u64,
}

#[derive(Debug, Clone)]
pub struct ResultNormalizer {
	filter: ContentFilter,
	embedding_index: String,
	description_fields: [String; 3],
}
impl ResultNormalizer {
	/// `combined_text_field` is the last description candidate, after `description` and
	/// `original_description`.
	pub fn new(filter: ContentFilter, embedding_index: &str, combined_text_field: &str) -> Self {
		Self {
			filter,
			embedding_index: embedding_index.to_string(),
			description_fields: [
				"description".to_string(),
				"original_description".to_string(),
				combined_text_field.to_string(),
			],
		}
	}

	/// Fails only when the backend reports a query error. Responses missing the expected
	/// structure normalize to zero records.
	pub fn normalize(&self, raw: &Value, query_active: bool) -> Result<NormalizedResults> {
		let Some(response) = raw.get("responses").and_then(|v| v.get(0)) else {
			return Ok(NormalizedResults::default());
		};

		if let Some(error) = response.get("error").filter(|v| !v.is_null()) {
			let message = match error {
				Value::String(message) => message.clone(),
				other => other.to_string(),
			};

			return Err(Error::UpstreamQuery { message });
		}

		let hits = response
			.get("hits")
			.and_then(|v| v.get("hits"))
			.and_then(Value::as_array)
			.map(Vec::as_slice)
			.unwrap_or_default();
		let mut seen = HashSet::new();
		let mut records = Vec::with_capacity(hits.len());

		for hit in hits {
			let Some(record) = self.record(hit) else {
				continue;
			};

			if seen.insert(record.id.clone()) {
				records.push(record);
			}
		}

		let dropped = hits.len() - records.len();

		if dropped > 0 {
			tracing::debug!(dropped, kept = records.len(), "Dropped hits during normalization.");
		}

		if query_active {
			for (index, record) in records.iter_mut().enumerate() {
				record.rank = Some(index as u32 + 1);
			}
		}

		let total = response
			.get("hits")
			.and_then(|v| v.get("total"))
			.and_then(reported_total)
			.unwrap_or(records.len() as u64);

		Ok(NormalizedResults { records, total })
	}

	/// Builds an unranked record from one hit, or `None` when the hit has no id or fails the
	/// content filter.
	pub fn record(&self, hit: &Value) -> Option<ResultRecord> {
		let id = first_str(hit, &["id", "_id"]).unwrap_or_default();

		if id.is_empty() {
			return None;
		}

		let source = hit
			.get("source")
			.and_then(Value::as_object)
			.or_else(|| hit.get("_source").and_then(Value::as_object))
			.cloned()
			.unwrap_or_default();

		self.document(id, self.score(hit), source)
	}

	/// Builds an unranked record from a stored document fetched by key.
	pub fn document(
		&self,
		id: &str,
		score: f64,
		mut source: Map<String, Value>,
	) -> Option<ResultRecord> {
		if let Err(reason) = self.filter.check(&source) {
			tracing::debug!(id, ?reason, "Dropped unsafe document.");

			return None;
		}

		let description = self
			.description_fields
			.iter()
			.filter_map(|field| source.get(field).and_then(Value::as_str))
			.find(|text| !text.trim().is_empty())
			.unwrap_or_default()
			.to_string();
		let url = URL_FIELDS
			.iter()
			.filter_map(|field| source.get(*field).and_then(Value::as_str))
			.find(|url| !url.is_empty())
			.unwrap_or_default()
			.to_string();

		for field in URL_FIELDS.iter().chain(&RESERVED_FIELDS) {
			source.remove(*field);
		}

		Some(ResultRecord {
			id: id.to_string(),
			score,
			rank: None,
			url,
			description,
			attributes: source,
		})
	}

	fn score(&self, hit: &Value) -> f64 {
		for key in ["_index_scores", "index_scores"] {
			if let Some(score) =
				hit.get(key).and_then(|v| v.get(&self.embedding_index)).and_then(Value::as_f64)
			{
				return score;
			}
		}

		hit.get("_score")
			.and_then(Value::as_f64)
			.or_else(|| hit.get("score").and_then(Value::as_f64))
			.unwrap_or(0.0)
	}
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
	keys.iter().find_map(|key| value.get(*key).and_then(Value::as_str))
}

fn reported_total(total: &Value) -> Option<u64> {
	total.as_u64().or_else(|| total.get("value").and_then(Value::as_u64))
}
