//! Window planning and shuffling for random sampling of an insertion-ordered corpus.

use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePlan {
	pub batch_size: u32,
	/// One random start offset per batch, in batch order.
	pub offsets: Vec<u32>,
}

/// Plans up to `max_batches` windows of `min(limit * multiplier, total)` documents each.
///
/// Offsets are drawn uniformly from `[0, max(1, total - batch_size))`. Returns `None` for an
/// empty corpus or a zero limit.
pub fn plan<R>(
	limit: u32,
	total: u64,
	multiplier: u32,
	max_batches: u32,
	rng: &mut R,
) -> Option<SamplePlan>
where
	R: Rng + ?Sized,
{
	if total == 0 || limit == 0 {
		return None;
	}

	let wanted = u64::from(limit).saturating_mul(u64::from(multiplier.max(1)));
	let batch_size = wanted.min(total);
	let batches = total.div_ceil(batch_size).min(u64::from(max_batches.max(1)));
	let upper = total.saturating_sub(batch_size).max(1);
	let offsets = (0..batches)
		.map(|_| u32::try_from(rng.gen_range(0..upper)).unwrap_or(u32::MAX))
		.collect();

	Some(SamplePlan { batch_size: u32::try_from(batch_size).unwrap_or(u32::MAX), offsets })
}

/// Uniform in-place shuffle: backward Fisher–Yates.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
	R: Rng + ?Sized,
{
	for i in (1..items.len()).rev() {
		let j = rng.gen_range(0..=i);

		items.swap(i, j);
	}
}

#[cfg(test)]
mod tests {
	use rand::{SeedableRng, rngs::StdRng};

	use super::*;

	#[test]
	fn empty_corpus_has_no_plan() {
		let mut rng = StdRng::seed_from_u64(7);

		assert_eq!(plan(24, 0, 2, 5, &mut rng), None);
	}

	#[test]
	fn small_corpus_is_one_full_window() {
		let mut rng = StdRng::seed_from_u64(7);
		let plan = plan(24, 10, 2, 5, &mut rng).expect("plan");

		assert_eq!(plan.batch_size, 10);
		assert_eq!(plan.offsets, vec![0]);
	}

	#[test]
	fn large_corpus_caps_batches_and_bounds_offsets() {
		let mut rng = StdRng::seed_from_u64(42);
		let plan = plan(24, 100_000, 2, 5, &mut rng).expect("plan");

		assert_eq!(plan.batch_size, 48);
		assert_eq!(plan.offsets.len(), 5);
		assert!(plan.offsets.iter().all(|offset| u64::from(*offset) < 100_000 - 48));
	}

	#[test]
	fn batch_count_follows_corpus_size() {
		let mut rng = StdRng::seed_from_u64(1);
		let plan = plan(10, 50, 2, 5, &mut rng).expect("plan");

		assert_eq!(plan.batch_size, 20);
		assert_eq!(plan.offsets.len(), 3);
		assert!(plan.offsets.iter().all(|offset| *offset < 30));
	}

	#[test]
	fn shuffle_is_a_permutation() {
		let mut rng = StdRng::seed_from_u64(99);
		let mut items: Vec<u32> = (0..64).collect();

		shuffle(&mut items, &mut rng);

		let mut sorted = items.clone();

		sorted.sort_unstable();

		assert_eq!(sorted, (0..64).collect::<Vec<_>>());
		assert_ne!(items, (0..64).collect::<Vec<_>>());
	}

	#[test]
	fn shuffle_is_reproducible_under_a_seed() {
		let mut first: Vec<u32> = (0..16).collect();
		let mut second = first.clone();

		shuffle(&mut first, &mut StdRng::seed_from_u64(5));
		shuffle(&mut second, &mut StdRng::seed_from_u64(5));

		assert_eq!(first, second);
	}

	#[test]
	fn shuffle_handles_short_slices() {
		let mut rng = StdRng::seed_from_u64(3);
		let mut empty: Vec<u8> = Vec::new();
		let mut single = vec![1];

		shuffle(&mut empty, &mut rng);
		shuffle(&mut single, &mut rng);

		assert!(empty.is_empty());
		assert_eq!(single, vec![1]);
	}
}
