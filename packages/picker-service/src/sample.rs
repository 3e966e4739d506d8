//! Random sampling over a store that only browses in insertion order.
//!
//! The filtered corpus is counted, a handful of random windows are fetched concurrently, and
//! the merged documents are shuffled. Sampling is best-effort: backend failures shrink the
//! sample instead of failing it.

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{PickerService, Result, SearchResponse};
use picker_domain::sample;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SampleRequest {
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub excluded_attributions: Vec<String>,
}

impl PickerService {
	pub async fn sample(&self, req: SampleRequest) -> Result<SearchResponse> {
		let mut rng = StdRng::from_entropy();

		self.sample_with_rng(req, &mut rng).await
	}

	/// Same as [`PickerService::sample`] with caller-supplied randomness.
	pub async fn sample_with_rng<R>(
		&self,
		req: SampleRequest,
		rng: &mut R,
	) -> Result<SearchResponse>
	where
		R: Rng + ?Sized,
	{
		let limit = self.resolve_limit(req.limit)?;
		let excluded = req.excluded_attributions.as_slice();
		let total = match self.run_query(&self.builder.count(excluded)).await {
			Ok(raw) => match self.normalizer.normalize(&raw, false) {
				Ok(counted) => counted.total,
				Err(err) => {
					tracing::warn!(error = %err, "Sample count was rejected by the backend.");

					return Ok(SearchResponse::default());
				},
			},
			Err(err) => {
				tracing::warn!(error = %err, "Sample count request failed.");

				return Ok(SearchResponse::default());
			},
		};
		let Some(plan) = sample::plan(
			limit,
			total,
			self.cfg.sampler.batch_multiplier,
			self.cfg.sampler.max_batches,
			rng,
		) else {
			return Ok(SearchResponse { items: Vec::new(), total });
		};

		tracing::debug!(
			total,
			batch_size = plan.batch_size,
			batches = plan.offsets.len(),
			"Fetching sample batches."
		);

		let requests: Vec<_> = plan
			.offsets
			.iter()
			.map(|offset| self.builder.batch(excluded, plan.batch_size, *offset))
			.collect();
		let replies =
			futures::future::join_all(requests.iter().map(|request| self.run_query(request))).await;
		let mut seen = HashSet::new();
		let mut pool = Vec::new();

		for (batch, reply) in replies.into_iter().enumerate() {
			let normalized = match reply {
				Ok(raw) => self.normalizer.normalize(&raw, false),
				Err(err) => Err(err),
			};

			match normalized {
				Ok(results) =>
					for record in results.records {
						if seen.insert(record.id.clone()) {
							pool.push(record);
						}
					},
				Err(err) => {
					tracing::warn!(batch, error = %err, "Dropped failed sample batch.");
				},
			}
		}

		sample::shuffle(&mut pool, rng);
		pool.truncate(limit as usize);

		Ok(SearchResponse { items: pool, total })
	}
}
