//! Word-level Markov chain.
//!
//! - Tokens and the default whitespace tokenizer (`Token`, `tokenize`)
//! - Per-context successor counts with O(1) windowed sampling (`Suffixes`)
//! - The transition table keyed by fixed-length contexts (`TransitionTable`)
//! - Training and generation (`Chain`)

/// Training and generation over a transition table.
pub mod chain;

/// Weighted choice shared by every random draw.
pub mod sampling;

/// Successor counts of a single context.
pub mod suffixes;

/// Context -> successors mapping, in first-seen order.
pub mod table;

/// Start / end markers and literal words.
pub mod token;

/// Default tokenizer and normalizer hooks.
pub mod tokenize;
