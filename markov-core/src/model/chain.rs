use std::fmt;
use std::sync::mpsc;
use std::thread;

use log::{debug, trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use super::table::{Context, TransitionTable};
use super::token::Token;
use super::tokenize::whitespace_tokenize;
use crate::error::ChainError;

/// Turns a (normalized) line into tokens.
///
/// Must return at least a leading `Token::Start` and a trailing `Token::End`.
pub type Tokenizer = dyn Fn(&str) -> Vec<Token> + Send + Sync;

/// Rewrites a line before tokenization (case folding, cleanup, ...).
pub type Normalizer = dyn Fn(&str) -> String + Send + Sync;

/// Number of training chunks per CPU in `train_parallel`.
const CHUNK_FACTOR: usize = 8;

/// Word-level Markov chain of order `N`.
///
/// The chain maps every window of `N` consecutive tokens seen during
/// training to the tokens that followed it, and generates text by walking
/// these transitions.
///
/// # Responsibilities
/// - Learn transitions from lines of text (`update`, `train_parallel`)
/// - Generate text seeded from an input or from the learned table (`respond`)
///
/// # Notes
/// - The chain grows monotonically; nothing is ever forgotten.
/// - No internal synchronization: callers serialize `update` and `respond`.
pub struct Chain<const N: usize = 2> {
	table: TransitionTable<N>,
	tokenize: Box<Tokenizer>,
	normalize: Option<Box<Normalizer>>,
}

impl<const N: usize> Chain<N> {
	/// Creates an empty chain using `whitespace_tokenize` and no normalizer.
	pub fn new() -> Self {
		Self::with_tokenizer(whitespace_tokenize)
	}

	/// Creates an empty chain with a custom tokenizer and no normalizer.
	pub fn with_tokenizer<T>(tokenize: T) -> Self
	where
		T: Fn(&str) -> Vec<Token> + Send + Sync + 'static,
	{
		Self::with_hooks(tokenize, None::<fn(&str) -> String>)
	}

	/// Creates an empty chain with a custom tokenizer and optional normalizer.
	///
	/// The normalizer, when given, runs before the tokenizer both when
	/// training and when reading a `respond` input.
	pub fn with_hooks<T, F>(tokenize: T, normalize: Option<F>) -> Self
	where
		T: Fn(&str) -> Vec<Token> + Send + Sync + 'static,
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		const { assert!(N > 0, "context length must be at least 1") };

		Self {
			table: TransitionTable::new(),
			tokenize: Box::new(tokenize),
			normalize: normalize.map(|f| Box::new(f) as Box<Normalizer>),
		}
	}

	/// Read-only access to the learned transitions.
	pub fn table(&self) -> &TransitionTable<N> {
		&self.table
	}

	/// Replaces the learned transitions, keeping the hooks.
	pub fn set_table(&mut self, table: TransitionTable<N>) {
		self.table = table;
	}

	/// Runs the normalize -> tokenize pipeline on `line`.
	pub fn tokenize_line(&self, line: &str) -> Vec<Token> {
		match &self.normalize {
			Some(normalize) => (self.tokenize)(&normalize(line)),
			None => (self.tokenize)(line),
		}
	}

	/// Learns every transition of `line`.
	///
	/// Lines yielding `N` tokens or fewer cannot form a single transition
	/// and are ignored.
	pub fn update(&mut self, line: &str) {
		let tokens = self.tokenize_line(line);
		Self::learn(&mut self.table, &tokens);
	}

	/// Learns every line of `lines`, in order.
	pub fn update_all<I, S>(&mut self, lines: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for line in lines {
			self.update(line.as_ref());
		}
	}

	/// Merges an externally built table (e.g. a snapshot) into this chain.
	pub fn merge_table(&mut self, table: &TransitionTable<N>) {
		self.table.merge(table);
	}

	/// Learns `lines` on several threads.
	///
	/// The resulting table is the same as with `update_all`.
	pub fn train_parallel<S: AsRef<str> + Sync>(&mut self, lines: &[S]) {
		let learned = self.learn_parallel(lines);
		self.table.merge(&learned);
	}

	/// Learns `lines` into a fresh table, on several threads, without
	/// touching the chain.
	///
	/// Lines are split into chunks, each chunk is learned into a partial
	/// table on its own thread, and partial tables are merged back in chunk
	/// order.
	pub fn learn_parallel<S: AsRef<str> + Sync>(&self, lines: &[S]) -> TransitionTable<N> {
		let mut learned = TransitionTable::new();
		if lines.is_empty() {
			return learned;
		}

		let chunks = num_cpus::get() * CHUNK_FACTOR;
		let chunk_size = lines.len().div_ceil(chunks);
		debug!("training on {} lines in chunks of {}", lines.len(), chunk_size);

		let (tx, rx) = mpsc::channel();
		let mut partials: Vec<(usize, TransitionTable<N>)> = thread::scope(|scope| {
			for (index, chunk) in lines.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					let mut partial = TransitionTable::new();
					for line in chunk {
						Self::learn(&mut partial, &self.tokenize_line(line.as_ref()));
					}
					if tx.send((index, partial)).is_err() {
						warn!("dropped partial table for chunk {}", index);
					}
				});
			}
			drop(tx);
			rx.iter().collect()
		});

		partials.sort_by_key(|(index, _)| *index);
		for (_, partial) in &partials {
			learned.merge(partial);
		}
		learned
	}

	/// Slides a window of `N` tokens over `tokens`, recording each following token.
	fn learn(table: &mut TransitionTable<N>, tokens: &[Token]) {
		if tokens.len() <= N {
			debug!("ignoring line of {} tokens", tokens.len());
			return;
		}

		let mut context: Context<N> = std::array::from_fn(|i| tokens[i].clone());
		for suffix in &tokens[N..] {
			table.observe(&context, suffix.clone());
			shift(&mut context, suffix.clone());
		}
	}

	/// Generates a response of more than `min_len` and at most `max_len` words.
	///
	/// Uses the thread-local random generator. See `respond_with`.
	pub fn respond(&self, input: &str, min_len: usize, max_len: usize) -> Result<String, ChainError> {
		self.respond_with(&mut rand::rng(), input, min_len, max_len)
	}

	/// Generates a response drawing randomness from `rng`.
	///
	/// The walk is first seeded from the windows of `input`, tried in a
	/// random order. If none of them leads to a long enough response, every
	/// learned context is tried in table order from a random offset.
	/// Pass `""` to skip input seeding.
	///
	/// # Errors
	/// - `ChainError::EmptyModel` if nothing was learned yet
	/// - `ChainError::ConstraintUnsatisfiable` if no walk produced more than
	///   `min_len` words (always the case when `min_len >= max_len`)
	pub fn respond_with<R: Rng>(
		&self,
		rng: &mut R,
		input: &str,
		min_len: usize,
		max_len: usize,
	) -> Result<String, ChainError> {
		let words = self.respond_tokens_with(rng, input, min_len, max_len)?;
		Ok(join_words(&words))
	}

	/// Same as `respond_with`, returning the generated literal tokens.
	pub fn respond_tokens_with<R: Rng>(
		&self,
		rng: &mut R,
		input: &str,
		min_len: usize,
		max_len: usize,
	) -> Result<Vec<Token>, ChainError> {
		if self.table.is_empty() {
			return Err(ChainError::EmptyModel);
		}
		if min_len >= max_len {
			debug!("no response can be longer than {} and at most {} words", min_len, max_len);
			return Err(ChainError::ConstraintUnsatisfiable { min_len, max_len });
		}

		let tokens = self.tokenize_line(input);
		if let Some(words) = self.seed_from_input(rng, &tokens, min_len, max_len) {
			return Ok(words);
		}
		if let Some(words) = self.seed_from_table(rng, min_len, max_len) {
			return Ok(words);
		}

		Err(ChainError::ConstraintUnsatisfiable { min_len, max_len })
	}

	/// Tries every known window of the input, in random order.
	fn seed_from_input<R: Rng>(
		&self,
		rng: &mut R,
		tokens: &[Token],
		min_len: usize,
		max_len: usize,
	) -> Option<Vec<Token>> {
		if tokens.len() <= N {
			return None;
		}

		let mut starts: Vec<usize> = (0..=tokens.len() - N).collect();
		starts.shuffle(rng);

		for start in starts {
			let context: Context<N> = std::array::from_fn(|i| tokens[start + i].clone());
			if !self.table.contains(&context) {
				continue;
			}
			let words = self.walk(rng, context, max_len);
			trace!("input window {} produced {} words", start, words.len());
			if words.len() > min_len {
				debug!("seeded from input window {}", start);
				return Some(words);
			}
		}
		None
	}

	/// Tries every learned context, in table order from a random offset.
	fn seed_from_table<R: Rng>(&self, rng: &mut R, min_len: usize, max_len: usize) -> Option<Vec<Token>> {
		let contexts = self.table.contexts();
		if contexts.is_empty() {
			return None;
		}

		let offset = rng.random_range(0..contexts.len());
		for i in 0..contexts.len() {
			let index = (offset + i) % contexts.len();
			let words = self.walk(rng, contexts[index].clone(), max_len);
			trace!("context {} produced {} words", index, words.len());
			if words.len() > min_len {
				debug!("seeded from context {}", index);
				return Some(words);
			}
		}
		None
	}

	/// Walks the chain from `seed`, returning at most `max_len` literal tokens.
	///
	/// At each step the first token of the context is emitted, then a
	/// successor is drawn and the context shifted. The walk stops once
	/// `max_len` literals were emitted, at a context without successors, or
	/// after more than `N` boundary tokens in a row. Boundary tokens are not
	/// counted and not returned.
	pub fn walk<R: Rng>(&self, rng: &mut R, seed: Context<N>, max_len: usize) -> Vec<Token> {
		let mut words = Vec::new();
		let mut context = seed;
		let mut special_run = 0;

		while words.len() < max_len {
			if context[0].is_special() {
				special_run += 1;
				if special_run > N {
					break;
				}
			} else {
				special_run = 0;
				words.push(context[0].clone());
			}

			let Some(next) = self.table.get(&context).and_then(|suffixes| suffixes.sample(rng)) else {
				break;
			};
			shift(&mut context, next.clone());
		}

		words
	}
}

impl<const N: usize> Default for Chain<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<const N: usize> fmt::Debug for Chain<N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Chain")
			.field("table", &self.table)
			.field("normalize", &self.normalize.is_some())
			.finish_non_exhaustive()
	}
}

/// Shifts `context` left by one and appends `next`.
fn shift<const N: usize>(context: &mut Context<N>, next: Token) {
	context.rotate_left(1);
	context[N - 1] = next;
}

/// Joins the literal tokens of `tokens` with single spaces.
pub fn join_words(tokens: &[Token]) -> String {
	tokens.iter().filter_map(Token::as_literal).collect::<Vec<_>>().join(" ")
}
