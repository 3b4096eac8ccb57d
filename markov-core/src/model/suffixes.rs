use std::collections::HashMap;

use rand::Rng;

use super::sampling::{weighted_choice, NUM_SAMPLES};
use super::token::Token;

/// Successors observed after a single context.
///
/// Conceptually, this is the set of outgoing edges of one node in the Markov
/// chain, each weighted by how many times it was observed during training.
///
/// Counts are kept twice: in a map for O(1) lookup, and as a first-seen
/// ordered list so that a draw can pick a random position in O(1).
///
/// ## Invariants
/// - The keys of `occurrences` are exactly the elements of `order`
/// - `order` holds no duplicates
/// - Every count is strictly positive and never decreases
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Suffixes {
	/// Successor -> number of observations.
	occurrences: HashMap<Token, u32>,
	/// Distinct successors in first-seen order.
	order: Vec<Token>,
}

impl Suffixes {
	/// Creates an empty successor table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `suffix`.
	///
	/// - An unseen suffix is appended to the ordered list with a count of 1.
	/// - A known suffix only has its count incremented.
	pub fn add(&mut self, suffix: Token) {
		self.add_many(suffix, 1);
	}

	/// Adds `count` observations of `suffix`, saturating at `u32::MAX`.
	/// A zero count is ignored so that no successor is stored without
	/// observations.
	fn add_many(&mut self, suffix: Token, count: u32) {
		if count == 0 {
			return;
		}
		match self.occurrences.get_mut(&suffix) {
			Some(occurrence) => *occurrence = occurrence.saturating_add(count),
			None => {
				self.order.push(suffix.clone());
				self.occurrences.insert(suffix, count);
			}
		}
	}

	/// Adds `count` observations of `suffix`, returning the new count.
	///
	/// Returns `None`, leaving the table untouched, if `count` is zero or the
	/// total would overflow.
	pub(crate) fn checked_add(&mut self, suffix: Token, count: u32) -> Option<u32> {
		if count == 0 {
			return None;
		}
		let total = self.count(&suffix).checked_add(count)?;
		self.add_many(suffix, count);
		Some(total)
	}

	/// Number of times `suffix` was observed (0 if never).
	pub fn count(&self, suffix: &Token) -> u32 {
		self.occurrences.get(suffix).copied().unwrap_or(0)
	}

	/// Number of distinct successors.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Iterates `(successor, count)` pairs in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&Token, u32)> {
		self.order.iter().map(|suffix| (suffix, self.count(suffix)))
	}

	/// Draws a successor roughly proportionally to its occurrence count.
	///
	/// Picks a uniformly random start position, takes `NUM_SAMPLES`
	/// consecutive successors from there (wrapping around), and makes a
	/// weighted choice among those only. The cost is O(1) whatever the number
	/// of successors.
	///
	/// # Notes
	/// - When there are fewer successors than `NUM_SAMPLES`, the window
	///   revisits entries, which skews the draw toward them.
	/// - When there are many more successors than `NUM_SAMPLES`, the draw
	///   is only proportional within the window.
	///
	/// Returns `None` if no successor was ever recorded.
	pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&Token> {
		let len = self.order.len();
		if len == 0 {
			return None;
		}

		let start = rng.random_range(0..len);
		let window: [&Token; NUM_SAMPLES] = std::array::from_fn(|i| &self.order[(start + i) % len]);
		let weights: [f64; NUM_SAMPLES] = std::array::from_fn(|i| f64::from(self.count(window[i])));

		Some(*weighted_choice(&window, &weights, rng.random::<f64>()))
	}

	/// Merges another successor table into this one.
	///
	/// Counts are summed (saturating); successors unknown to `self` are
	/// appended in the order `other` first saw them.
	pub fn merge(&mut self, other: &Self) {
		for (suffix, count) in other.iter() {
			self.add_many(suffix.clone(), count);
		}
	}
}

impl FromIterator<(Token, u32)> for Suffixes {
	fn from_iter<I: IntoIterator<Item = (Token, u32)>>(iter: I) -> Self {
		let mut suffixes = Suffixes::new();
		for (suffix, count) in iter {
			suffixes.add_many(suffix, count);
		}
		suffixes
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	#[test]
	fn add_appends_once_and_counts() {
		let foo = Token::literal("foo");
		let mut s = Suffixes::new();

		s.add(foo.clone());
		assert_eq!(s.len(), 1);
		assert_eq!(s.iter().next(), Some((&foo, 1)));

		s.add(foo.clone());
		assert_eq!(s.len(), 1);
		assert_eq!(s.count(&foo), 2);
	}

	#[test]
	fn order_is_first_seen() {
		let mut s = Suffixes::new();
		for word in ["b", "a", "b", "c", "a"] {
			s.add(Token::literal(word));
		}
		s.add(Token::End);

		let order: Vec<_> = s.iter().map(|(t, c)| (t.clone(), c)).collect();
		assert_eq!(
			order,
			vec![
				(Token::literal("b"), 2),
				(Token::literal("a"), 2),
				(Token::literal("c"), 1),
				(Token::End, 1),
			]
		);
	}

	#[test]
	fn sample_empty_is_none() {
		let mut rng = StdRng::seed_from_u64(0);
		assert!(Suffixes::new().sample(&mut rng).is_none());
	}

	#[test]
	fn sample_single_successor_is_deterministic() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut s = Suffixes::new();
		s.add(Token::literal("only"));
		for _ in 0..50 {
			assert_eq!(s.sample(&mut rng), Some(&Token::literal("only")));
		}
	}

	#[test]
	fn sample_stays_inside_table() {
		let mut rng = StdRng::seed_from_u64(42);
		let mut s = Suffixes::new();
		for i in 0..10 {
			for _ in 0..=i {
				s.add(Token::literal(i.to_string()));
			}
		}
		for _ in 0..500 {
			let drawn = s.sample(&mut rng).cloned();
			assert!(drawn.is_some_and(|t| s.count(&t) > 0));
		}
	}

	#[test]
	fn sample_favours_heavier_successor() {
		let mut rng = StdRng::seed_from_u64(3);
		let heavy = Token::literal("heavy");
		let light = Token::literal("light");
		let mut s = Suffixes::new();
		for _ in 0..9 {
			s.add(heavy.clone());
		}
		s.add(light.clone());

		let heavy_draws = (0..2000).filter(|_| s.sample(&mut rng) == Some(&heavy)).count();
		// Both successors always fall in the window, so the heavy one dominates
		assert!(heavy_draws > 1500, "heavy drawn {} times", heavy_draws);
	}

	#[test]
	fn sample_draws_from_window_only() {
		let mut rng = StdRng::seed_from_u64(17);
		// "0" holds 991 of 1000 observations, but sits in the window only
		// when the start lands on one of 3 positions out of 10
		let mut s: Suffixes = [(Token::literal("0"), 991)].into_iter().collect();
		for i in 1..10 {
			s.add(Token::literal(i.to_string()));
		}

		let dominant = Token::literal("0");
		let draws = 10_000;
		let hits = (0..draws).filter(|_| s.sample(&mut rng) == Some(&dominant)).count();
		assert!((2500..3500).contains(&hits), "dominant drawn {} times out of {}", hits, draws);
	}

	#[test]
	fn zero_counts_are_not_stored() {
		let mut s: Suffixes = [(Token::literal("a"), 0)].into_iter().collect();
		assert!(s.is_empty());
		assert_eq!(s.checked_add(Token::literal("a"), 0), None);
		assert!(s.is_empty());
	}

	#[test]
	fn counts_never_overflow() {
		let big = Token::literal("big");
		let mut s: Suffixes = [(big.clone(), u32::MAX - 1)].into_iter().collect();

		assert_eq!(s.checked_add(big.clone(), 2), None);
		assert_eq!(s.count(&big), u32::MAX - 1);
		assert_eq!(s.checked_add(big.clone(), 1), Some(u32::MAX));

		let other: Suffixes = [(big.clone(), 5)].into_iter().collect();
		s.merge(&other);
		assert_eq!(s.count(&big), u32::MAX);
		assert_eq!(s.len(), 1);
	}

	#[test]
	fn merge_sums_and_appends() {
		let mut left: Suffixes = [(Token::literal("a"), 2), (Token::End, 1)].into_iter().collect();
		let right: Suffixes = [(Token::literal("b"), 1), (Token::literal("a"), 3)].into_iter().collect();

		left.merge(&right);

		let merged: Vec<_> = left.iter().map(|(t, c)| (t.clone(), c)).collect();
		assert_eq!(
			merged,
			vec![(Token::literal("a"), 5), (Token::End, 1), (Token::literal("b"), 1)]
		);
	}
}
