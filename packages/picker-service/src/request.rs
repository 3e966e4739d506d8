use crate::{EmbeddingInput, PickerService, Result};
use picker_domain::{
	RetrievalMode,
	query::ParsedQuery,
	request::{RequestBuilder, SearchRequest},
};

impl PickerService {
	/// Compiles `query` for `mode`, embedding the query text first in vector mode.
	///
	/// A browse query has nothing to embed, so it is compiled as a text-mode browse.
	pub async fn build_request(
		&self,
		query: &ParsedQuery,
		mode: RetrievalMode,
		limit: u32,
		excluded_attributions: &[String],
	) -> Result<SearchRequest> {
		if mode == RetrievalMode::Text || query.is_browse() {
			return Ok(self.builder.text(query, limit, excluded_attributions));
		}

		let text = RequestBuilder::vector_text(query);
		let vector = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &[EmbeddingInput::text(text)])
			.await?;

		Ok(self.builder.vector(query, vector, limit, excluded_attributions))
	}
}
