use serde_json::Value;

use crate::{PickerService, ResultRecord};

impl PickerService {
	/// Fetches one document by id. Missing, unsafe, and unreachable documents all come back as
	/// `None`.
	pub async fn get(&self, id: &str) -> Option<ResultRecord> {
		let id = id.trim();

		if id.is_empty() {
			return None;
		}

		let document = match self.providers.store.lookup(&self.cfg.store, id).await {
			Ok(document) => document?,
			Err(err) => {
				tracing::warn!(id, error = %err, "Document lookup failed.");

				return None;
			},
		};
		let source = match document {
			Value::Object(mut map) => {
				// A document may be wrapped in an envelope, or carry its own scalar `source` field.
				let envelope = ["_source", "source"]
					.into_iter()
					.find(|key| map.get(*key).is_some_and(Value::is_object));

				match envelope.and_then(|key| map.remove(key)) {
					Some(Value::Object(source)) => source,
					_ => map,
				}
			},
			_ => return None,
		};

		self.normalizer.document(id, 0.0, source)
	}
}
