use serde::Serialize;

use crate::{Error, Result};
use picker_config::EmbeddingProviderConfig;

const HEADER_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
	pub url: String,
}

/// One typed item of the embedding request's `input` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbeddingInput {
	Text { text: String },
	ImageUrl { image_url: ImageUrl },
}
impl EmbeddingInput {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text { text: text.into() }
	}

	pub fn image_url(url: impl Into<String>) -> Self {
		Self::ImageUrl { image_url: ImageUrl { url: url.into() } }
	}
}

/// Embeds `inputs` and returns the first vector of the response.
pub async fn embed(cfg: &EmbeddingProviderConfig, inputs: &[EmbeddingInput]) -> Result<Vec<f32>> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": inputs,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let bytes = res.error_for_status()?.bytes().await?;
	let vector = decode_first_vector(&bytes)?;

	if cfg.dimensions != 0 && vector.len() != cfg.dimensions as usize {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vector.len()
			),
		});
	}

	tracing::debug!(model = %cfg.model, dimension = vector.len(), "Embedded query input.");

	Ok(vector)
}

/// Decodes `u64 count | u64 dimension | count × dimension × f32`, all little-endian, keeping only
/// the first vector.
pub fn decode_first_vector(data: &[u8]) -> Result<Vec<f32>> {
	let (count, rest) = read_u64(data)
		.ok_or_else(|| invalid("Embedding envelope is missing the vector count."))?;

	if count == 0 {
		return Err(invalid("Embedding envelope contains no vectors."));
	}

	let (dimension, rest) = read_u64(rest)
		.ok_or_else(|| invalid("Embedding envelope is missing the dimension."))?;
	let dimension = usize::try_from(dimension)
		.map_err(|_| invalid("Embedding dimension does not fit in memory."))?;
	let needed = dimension
		.checked_mul(4)
		.ok_or_else(|| invalid("Embedding dimension does not fit in memory."))?;
	let Some(payload) = rest.get(..needed) else {
		return Err(invalid(&format!(
			"Embedding envelope is truncated: need {} bytes, got {}.",
			HEADER_BYTES + needed,
			data.len()
		)));
	};

	Ok(payload
		.chunks_exact(4)
		.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect())
}

fn read_u64(data: &[u8]) -> Option<(u64, &[u8])> {
	let (head, rest) = data.split_first_chunk::<8>()?;

	Some((u64::from_le_bytes(*head), rest))
}

fn invalid(message: &str) -> Error {
	Error::InvalidResponse { message: message.to_string() }
}
