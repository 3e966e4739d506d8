use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PickerService;
use picker_domain::request::ATTRIBUTION_AGGREGATION;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionBucket {
	pub key: String,
	pub count: u64,
}

impl PickerService {
	/// Corpus-wide attribution counts in backend order, largest first.
	///
	/// Any failure is logged and yields an empty list.
	pub async fn attributions(&self, limit: Option<u32>) -> Vec<AttributionBucket> {
		let size = limit
			.filter(|limit| *limit > 0)
			.unwrap_or(self.cfg.aggregation.attribution_bucket_limit);
		let raw = match self.run_query(&self.builder.attribution_buckets(size)).await {
			Ok(raw) => raw,
			Err(err) => {
				tracing::warn!(error = %err, "Attribution aggregation failed.");

				return Vec::new();
			},
		};

		match parse_buckets(&raw) {
			Some(buckets) => buckets,
			None => {
				tracing::warn!("Attribution aggregation returned no buckets.");

				Vec::new()
			},
		}
	}
}

fn parse_buckets(raw: &Value) -> Option<Vec<AttributionBucket>> {
	let response = raw.get("responses")?.get(0)?;

	if response.get("error").is_some_and(|err| !err.is_null()) {
		return None;
	}

	let buckets = response
		.get("aggregations")?
		.get(ATTRIBUTION_AGGREGATION)?
		.get("buckets")?
		.as_array()?;

	Some(
		buckets
			.iter()
			.filter_map(|bucket| {
				let key = match bucket.get("key")? {
					Value::String(key) => key.clone(),
					Value::Number(key) => key.to_string(),
					_ => return None,
				};
				let count = bucket.get("doc_count").or_else(|| bucket.get("count"))?.as_u64()?;

				Some(AttributionBucket { key, count })
			})
			.collect(),
	)
}
