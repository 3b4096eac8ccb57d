//! N-gram Markov text generation library.
//!
//! This crate provides a word-level Markov chain including:
//! - Incremental training on lines of text
//! - Response generation seeded from an input, with length constraints
//! - Approximate O(1) weighted sampling of successors
//! - Binary snapshots of the learned transitions
//!
//! The most common entry points are re-exported at the crate root.

/// Core chain, tokens and sampling.
pub mod model;

/// Errors returned by generation and snapshots.
pub mod error;

/// Corpus reading and path helpers.
pub mod io;

/// Binary persistence of transition tables.
pub mod snapshot;

pub use error::{ChainError, SnapshotError};
pub use model::chain::Chain;
pub use model::token::Token;
pub use model::tokenize::whitespace_tokenize;
