/// Number of consecutive successors examined by a single draw.
///
/// Sampling cost is bounded by this constant rather than by the number of
/// distinct successors of a context.
pub const NUM_SAMPLES: usize = 3;

/// Computes the cumulative-sum / total-sum ratio after each weight.
///
/// The last boundary is `1.0` up to floating rounding. A zero total yields
/// `NaN` boundaries; callers must supply at least one positive weight.
pub fn boundaries<const K: usize>(weights: &[f64; K]) -> [f64; K] {
	let total: f64 = weights.iter().sum();

	let mut out = [0.0; K];
	let mut running_total = 0.0;
	for (boundary, weight) in out.iter_mut().zip(weights) {
		running_total += weight;
		*boundary = running_total / total;
	}
	out
}

/// Selects an index weighted by `weights`, driven by `r` in `[0.0, 1.0)`.
///
/// Returns the first index whose boundary is strictly greater than `r`.
/// Falls back to the last index when rounding leaves every boundary at or
/// below `r`.
pub fn weighted_index<const K: usize>(weights: &[f64; K], r: f64) -> usize {
	const { assert!(K > 0, "weighted choice needs at least one item") };

	boundaries(weights)
		.iter()
		.position(|boundary| *boundary > r)
		.unwrap_or(K - 1)
}

/// Returns one of `items`, chosen proportionally to `weights` by `r`.
pub fn weighted_choice<'a, T, const K: usize>(items: &'a [T; K], weights: &[f64; K], r: f64) -> &'a T {
	&items[weighted_index(weights, r)]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn choice_follows_boundaries() {
		let items = ["a", "b", "c"];
		let weights = [2.0, 5.0, 1.0];

		assert_eq!(*weighted_choice(&items, &weights, 0.0), "a");
		assert_eq!(*weighted_choice(&items, &weights, 0.25), "b");
		assert_eq!(*weighted_choice(&items, &weights, 0.99), "c");
	}

	#[test]
	fn boundaries_are_cumulative_ratios() {
		let b = boundaries(&[2.0, 5.0, 1.0]);
		assert_eq!(b, [2.0 / 8.0, 7.0 / 8.0, 8.0 / 8.0]);
	}

	#[test]
	fn exact_boundary_moves_to_next_item() {
		// r == 0.25 is not strictly below the first boundary
		assert_eq!(weighted_index(&[1.0, 3.0], 0.25), 1);
		assert_eq!(weighted_index(&[1.0, 3.0], 0.2499), 0);
	}

	#[test]
	fn index_is_monotonic_in_r() {
		let weights = [3.0, 0.0, 1.0, 4.0];
		let mut previous = 0;
		for step in 0..1000 {
			let r = step as f64 / 1000.0;
			let index = weighted_index(&weights, r);
			assert!(index >= previous);
			previous = index;
		}
		assert_eq!(previous, 3);
	}

	#[test]
	fn zero_weight_is_skipped() {
		let weights = [1.0, 0.0, 1.0];
		for step in 0..100 {
			let r = step as f64 / 100.0;
			assert_ne!(weighted_index(&weights, r), 1);
		}
	}

	#[test]
	fn rounding_overflow_clamps_to_last() {
		assert_eq!(weighted_index(&[1.0, 1.0, 1.0], 1.0), 2);
		assert_eq!(weighted_index(&[0.0, 0.0], 0.5), 1);
	}
}
