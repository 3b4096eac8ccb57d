use std::collections::HashMap;

use super::suffixes::Suffixes;
use super::token::Token;

/// A fixed-length window of tokens, used as the lookup key of the chain.
pub type Context<const N: usize> = [Token; N];

/// Transition table of an order-`N` chain: context -> observed successors.
///
/// Besides the map, the table remembers the order in which contexts were
/// first seen. This gives a stable iteration order (fallback seeding,
/// snapshots) independent of the hasher.
///
/// # Invariants
/// - Every context in `contexts` is a key of `states`, and vice versa
/// - Every stored `Suffixes` holds at least one successor
/// - Contexts and successors are never removed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionTable<const N: usize> {
	states: HashMap<Context<N>, Suffixes>,
	contexts: Vec<Context<N>>,
}

impl<const N: usize> TransitionTable<N> {
	pub fn new() -> Self {
		Self { states: HashMap::new(), contexts: Vec::new() }
	}

	/// Records that `suffix` followed `context` once.
	pub fn observe(&mut self, context: &Context<N>, suffix: Token) {
		self.entry(context).add(suffix);
	}

	/// Returns the successors of `context`, creating an empty entry if needed.
	fn entry(&mut self, context: &Context<N>) -> &mut Suffixes {
		if !self.states.contains_key(context) {
			self.contexts.push(context.clone());
		}
		self.states.entry(context.clone()).or_default()
	}

	/// Successors recorded for `context`, if any.
	pub fn get(&self, context: &Context<N>) -> Option<&Suffixes> {
		self.states.get(context)
	}

	pub fn contains(&self, context: &Context<N>) -> bool {
		self.states.contains_key(context)
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Contexts in first-seen order.
	pub fn contexts(&self) -> &[Context<N>] {
		&self.contexts
	}

	/// Iterates `(context, successors)` in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&Context<N>, &Suffixes)> {
		self.contexts
			.iter()
			.filter_map(|context| self.states.get(context).map(|suffixes| (context, suffixes)))
	}

	/// Merges another table of the same order into this one.
	///
	/// Known contexts have their successors merged; unknown contexts are
	/// appended in the order `other` first saw them.
	pub fn merge(&mut self, other: &Self) {
		for (context, suffixes) in other.iter() {
			self.entry(context).merge(suffixes);
		}
	}

	/// Inserts a whole successor table, merging with any existing entry.
	/// Empty tables are ignored.
	pub(crate) fn insert(&mut self, context: Context<N>, suffixes: Suffixes) {
		if suffixes.is_empty() {
			return;
		}
		self.entry(&context).merge(&suffixes);
	}
}
