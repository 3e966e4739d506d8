use serde::{Deserialize, Serialize};

use crate::{PickerService, Result, ResultRecord};
use picker_domain::{RetrievalMode, query};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub query: String,
	/// Falls back to `search.mode`.
	#[serde(default)]
	pub mode: Option<RetrievalMode>,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub excluded_attributions: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
	pub items: Vec<ResultRecord>,
	/// Backend-reported match count before safety filtering, or the item count when the
	/// backend reports none.
	pub total: u64,
}

impl PickerService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let limit = self.resolve_limit(req.limit)?;
		let mode = req.mode.unwrap_or(self.cfg.search.mode);
		let parsed = query::parse(&req.query);
		let request =
			self.build_request(&parsed, mode, limit, &req.excluded_attributions).await?;

		tracing::debug!(
			?mode,
			limit,
			browse = request.is_browse(),
			tags = parsed.tags.len(),
			negative_tags = parsed.negative_tags.len(),
			"Running search."
		);

		let raw = self.run_query(&request).await?;
		let results = self.normalizer.normalize(&raw, !parsed.is_browse())?;

		Ok(SearchResponse { items: results.records, total: results.total })
	}
}
