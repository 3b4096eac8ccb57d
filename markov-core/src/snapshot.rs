use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::io::{build_output_path, read_lines};
use crate::model::chain::Chain;
use crate::model::suffixes::Suffixes;
use crate::model::table::TransitionTable;
use crate::model::token::Token;

/// On-disk form of a transition table.
///
/// Contexts and successors are stored in first-seen order so that a loaded
/// table iterates exactly like the one that was saved.
#[derive(Serialize, Deserialize)]
struct TableSnapshot {
	/// Context length of the chain that produced the snapshot.
	order: usize,
	entries: Vec<(Vec<Token>, Vec<(Token, u32)>)>,
}

/// Encodes a table with `postcard`.
pub fn encode_table<const N: usize>(table: &TransitionTable<N>) -> Result<Vec<u8>, SnapshotError> {
	let snapshot = TableSnapshot {
		order: N,
		entries: table
			.iter()
			.map(|(context, suffixes)| {
				let successors = suffixes.iter().map(|(suffix, count)| (suffix.clone(), count)).collect();
				(context.to_vec(), successors)
			})
			.collect(),
	};
	Ok(postcard::to_stdvec(&snapshot)?)
}

/// Decodes a table written by `encode_table`.
///
/// # Errors
/// - `SnapshotError::OrderMismatch` if the snapshot was produced by a chain
///   whose context length is not `N`
/// - `SnapshotError::InvalidCount` on a zero count, or on a repeated
///   successor whose counts overflow
pub fn decode_table<const N: usize>(bytes: &[u8]) -> Result<TransitionTable<N>, SnapshotError> {
	let snapshot: TableSnapshot = postcard::from_bytes(bytes)?;
	if snapshot.order != N {
		return Err(SnapshotError::OrderMismatch { expected: N, found: snapshot.order });
	}

	let mut table = TransitionTable::new();
	for (context, successors) in snapshot.entries {
		let context: [Token; N] = context
			.try_into()
			.map_err(|context: Vec<Token>| SnapshotError::OrderMismatch { expected: N, found: context.len() })?;
		let mut suffixes = Suffixes::new();
		for (suffix, count) in successors {
			if suffixes.checked_add(suffix.clone(), count).is_none() {
				return Err(SnapshotError::InvalidCount { suffix: format!("{:?}", suffix), count });
			}
		}
		table.insert(context, suffixes);
	}
	Ok(table)
}

/// Writes a table snapshot to `path`.
pub fn save_table<const N: usize, P: AsRef<Path>>(table: &TransitionTable<N>, path: P) -> Result<(), SnapshotError> {
	fs::write(&path, encode_table(table)?)?;
	info!("saved {} contexts to {}", table.len(), path.as_ref().display());
	Ok(())
}

/// Reads a table snapshot from `path`.
pub fn load_table<const N: usize, P: AsRef<Path>>(path: P) -> Result<TransitionTable<N>, SnapshotError> {
	let table = decode_table(&fs::read(&path)?)?;
	info!("loaded {} contexts from {}", table.len(), path.as_ref().display());
	Ok(table)
}

/// Teaches a text corpus to `chain`, using a binary snapshot when available.
///
/// - `corpus` is a text file, one training line per line.
/// - If a sibling `.bin` snapshot exists, it is loaded instead of the text.
/// - Otherwise every line is learned in parallel and the snapshot is written
///   for the next load.
///
/// # Notes
/// A snapshot stores tokens, not text: it reflects the hooks of the chain
/// that wrote it, not those of `chain`.
pub fn load_corpus<const N: usize, P: AsRef<Path>>(chain: &mut Chain<N>, corpus: P) -> Result<(), SnapshotError> {
	let binary_path = build_output_path(&corpus, "bin")?;

	let table = if binary_path.exists() {
		load_table(&binary_path)?
	} else {
		let lines = read_lines(&corpus)?;
		let table = chain.learn_parallel(lines.as_slice());
		save_table(&table, &binary_path)?;
		table
	};

	chain.merge_table(&table);
	Ok(())
}
