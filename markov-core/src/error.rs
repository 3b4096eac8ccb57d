use thiserror::Error;

/// Failure of a single `respond` call.
///
/// Neither variant affects the chain itself: training can continue and a
/// later call may succeed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
	/// The chain has not learned any transition yet.
	#[error("cannot respond with no chains built")]
	EmptyModel,

	/// No walk produced more than `min_len` words within `max_len`.
	#[error("could not generate a response longer than {min_len} words within {max_len} words")]
	ConstraintUnsatisfiable { min_len: usize, max_len: usize },
}

/// Failure while saving or loading a transition table snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
	#[error("snapshot I/O failed: {0}")]
	Io(#[from] std::io::Error),

	#[error("snapshot encoding failed: {0}")]
	Codec(#[from] postcard::Error),

	/// A successor count is zero, or the counts of a repeated successor
	/// add up past `u32::MAX`.
	#[error("snapshot holds an invalid count {count} for successor {suffix}")]
	InvalidCount { suffix: String, count: u32 },

	/// The snapshot was written by a chain of a different order.
	#[error("snapshot has context length {found}, expected {expected}")]
	OrderMismatch { expected: usize, found: usize },
}
