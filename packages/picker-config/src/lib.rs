mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Aggregation, Config, EmbeddingProviderConfig, ExclusionStyle, Providers, RetrievalMode,
	Safety, Sampler, Search, Store, default_blocked_tags, default_removed_content_marker,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("store.api_base", &cfg.store.api_base),
		("store.table", &cfg.store.table),
		("providers.embedding.api_base", &cfg.providers.embedding.api_base),
		("providers.embedding.model", &cfg.providers.embedding.model),
		("search.combined_text_field", &cfg.search.combined_text_field),
		("search.tag_field", &cfg.search.tag_field),
		("search.attribution_field", &cfg.search.attribution_field),
		("search.embedding_index", &cfg.search.embedding_index),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !cfg.providers.embedding.path.starts_with('/') {
		return Err(Error::Validation {
			message: "providers.embedding.path must start with '/'.".to_string(),
		});
	}
	if cfg.store.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "store.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be at least search.default_limit.".to_string(),
		});
	}
	if cfg.sampler.max_batches == 0 {
		return Err(Error::Validation {
			message: "sampler.max_batches must be greater than zero.".to_string(),
		});
	}
	if cfg.sampler.batch_multiplier == 0 {
		return Err(Error::Validation {
			message: "sampler.batch_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.safety.removed_content_marker.trim().is_empty() {
		return Err(Error::Validation {
			message: "safety.removed_content_marker must be non-empty.".to_string(),
		});
	}
	if cfg.aggregation.attribution_bucket_limit == 0 {
		return Err(Error::Validation {
			message: "aggregation.attribution_bucket_limit must be greater than zero.".to_string(),
		});
	}

	for headers in [&cfg.store.default_headers, &cfg.providers.embedding.default_headers] {
		if headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: "default_headers values must be strings.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.store.api_base = cfg.store.api_base.trim_end_matches('/').to_string();
	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim_end_matches('/').to_string();

	if cfg.store.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.store.api_key = None;
	}
	if cfg.providers.embedding.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.embedding.api_key = None;
	}

	let mut blocked: Vec<String> = cfg
		.safety
		.blocked_tags
		.iter()
		.map(|tag| tag.trim().to_lowercase())
		.filter(|tag| !tag.is_empty())
		.collect();

	blocked.sort();
	blocked.dedup();

	cfg.safety.blocked_tags = blocked;
	cfg.safety.removed_content_marker = cfg.safety.removed_content_marker.to_lowercase();
}
