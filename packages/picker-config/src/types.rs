use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub store: Store,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub sampler: Sampler,
	#[serde(default)]
	pub safety: Safety,
	#[serde(default)]
	pub aggregation: Aggregation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Store {
	pub api_base: String,
	pub table: String,
	/// Optional. Sent as a bearer token when present.
	#[serde(default)]
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub path: String,
	pub model: String,
	/// Expected vector length. Zero accepts whatever the service returns.
	#[serde(default)]
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
	#[default]
	Text,
	Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionStyle {
	#[default]
	Tree,
	QueryString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_combined_text_field")]
	pub combined_text_field: String,
	#[serde(default = "default_tag_field")]
	pub tag_field: String,
	#[serde(default = "default_attribution_field")]
	pub attribution_field: String,
	#[serde(default = "default_embedding_index")]
	pub embedding_index: String,
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
	#[serde(default)]
	pub mode: RetrievalMode,
	#[serde(default)]
	pub exclusion_style: ExclusionStyle,
	/// Carry tag filters and exclusions into vector-mode requests.
	#[serde(default)]
	pub vector_mode_filters: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			combined_text_field: default_combined_text_field(),
			tag_field: default_tag_field(),
			attribution_field: default_attribution_field(),
			embedding_index: default_embedding_index(),
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			mode: RetrievalMode::default(),
			exclusion_style: ExclusionStyle::default(),
			vector_mode_filters: false,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sampler {
	#[serde(default = "default_max_batches")]
	pub max_batches: u32,
	#[serde(default = "default_batch_multiplier")]
	pub batch_multiplier: u32,
}
impl Default for Sampler {
	fn default() -> Self {
		Self { max_batches: default_max_batches(), batch_multiplier: default_batch_multiplier() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Safety {
	#[serde(default = "default_blocked_tags")]
	pub blocked_tags: Vec<String>,
	#[serde(default = "default_removed_content_marker")]
	pub removed_content_marker: String,
}
impl Default for Safety {
	fn default() -> Self {
		Self {
			blocked_tags: default_blocked_tags(),
			removed_content_marker: default_removed_content_marker(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aggregation {
	#[serde(default = "default_attribution_bucket_limit")]
	pub attribution_bucket_limit: u32,
}
impl Default for Aggregation {
	fn default() -> Self {
		Self { attribution_bucket_limit: default_attribution_bucket_limit() }
	}
}

fn default_combined_text_field() -> String {
	"combined_text".to_string()
}

fn default_tag_field() -> String {
	"tags".to_string()
}

fn default_attribution_field() -> String {
	"attribution".to_string()
}

fn default_embedding_index() -> String {
	"embeddings".to_string()
}

fn default_limit() -> u32 {
	24
}

fn default_max_limit() -> u32 {
	200
}

fn default_max_batches() -> u32 {
	5
}

fn default_batch_multiplier() -> u32 {
	2
}

pub fn default_blocked_tags() -> Vec<String> {
	["gore", "nsfw", "nudity", "porn"].into_iter().map(str::to_string).collect()
}

pub fn default_removed_content_marker() -> String {
	"content has been removed".to_string()
}

fn default_attribution_bucket_limit() -> u32 {
	50
}
