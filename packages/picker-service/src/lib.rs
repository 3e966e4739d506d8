pub mod aggregate;
pub mod lookup;
pub mod normalize;
pub mod request;
pub mod sample;
pub mod search;
pub mod similar;

mod error;

pub use aggregate::AttributionBucket;
pub use error::{Error, Result};
pub use normalize::{NormalizedResults, ResultNormalizer, ResultRecord};
pub use sample::SampleRequest;
pub use search::{SearchRequest, SearchResponse};
pub use similar::SimilarRequest;

pub use picker_providers::embedding::EmbeddingInput;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use picker_config::{Config, EmbeddingProviderConfig, Store};
use picker_domain::{request::RequestBuilder, safety::ContentFilter};
use picker_providers::{embedding, store};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait StoreProvider
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		cfg: &'a Store,
		request: &'a picker_domain::request::SearchRequest,
	) -> BoxFuture<'a, Result<Value>>;

	fn lookup<'a>(&'a self, cfg: &'a Store, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		inputs: &'a [EmbeddingInput],
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub store: Arc<dyn StoreProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(store: Arc<dyn StoreProvider>, embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { store, embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { store: provider.clone(), embedding: provider }
	}
}

pub struct PickerService {
	pub cfg: Config,
	pub providers: Providers,
	pub(crate) builder: RequestBuilder,
	pub(crate) normalizer: ResultNormalizer,
}
impl PickerService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let builder = RequestBuilder::new(&cfg.search);
		let normalizer = ResultNormalizer::new(
			ContentFilter::from_config(&cfg),
			&cfg.search.embedding_index,
			&cfg.search.combined_text_field,
		);

		Self { cfg, providers, builder, normalizer }
	}

	/// Falls back to `search.default_limit`, clamps to `search.max_limit`, rejects zero.
	pub(crate) fn resolve_limit(&self, requested: Option<u32>) -> Result<u32> {
		match requested {
			Some(0) => Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			}),
			Some(limit) => Ok(limit.min(self.cfg.search.max_limit)),
			None => Ok(self.cfg.search.default_limit),
		}
	}

	pub(crate) async fn run_query(
		&self,
		request: &picker_domain::request::SearchRequest,
	) -> Result<Value> {
		self.providers.store.query(&self.cfg.store, request).await
	}
}

struct DefaultProviders;
impl StoreProvider for DefaultProviders {
	fn query<'a>(
		&'a self,
		cfg: &'a Store,
		request: &'a picker_domain::request::SearchRequest,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(store::query(cfg, request).await?) })
	}

	fn lookup<'a>(&'a self, cfg: &'a Store, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move { Ok(store::lookup(cfg, key).await?) })
	}
}
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		inputs: &'a [EmbeddingInput],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, inputs).await?) })
	}
}
