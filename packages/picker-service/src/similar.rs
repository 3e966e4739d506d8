use serde::{Deserialize, Serialize};

use crate::{EmbeddingInput, Error, PickerService, Result, SearchResponse};
use picker_domain::query::ParsedQuery;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimilarRequest {
	pub image_url: String,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub excluded_attributions: Vec<String>,
}

impl PickerService {
	/// Nearest neighbours of an image, ranked by vector similarity.
	pub async fn similar(&self, req: SimilarRequest) -> Result<SearchResponse> {
		let image_url = req.image_url.trim();

		if image_url.is_empty() {
			return Err(Error::InvalidRequest { message: "image_url is required.".to_string() });
		}

		let limit = self.resolve_limit(req.limit)?;
		let vector = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[EmbeddingInput::image_url(image_url)])
			.await?;
		let request =
			self.builder.vector(&ParsedQuery::default(), vector, limit, &req.excluded_attributions);
		let raw = self.run_query(&request).await?;
		let results = self.normalizer.normalize(&raw, true)?;

		Ok(SearchResponse { items: results.records, total: results.total })
	}
}
