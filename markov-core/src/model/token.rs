use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of a tokenized line.
///
/// A token is either a sequence boundary (`Start` / `End`) or a literal word.
/// Equality and hashing are structural: two literals are equal when their
/// text is byte-for-byte identical, and boundaries carry no payload.
///
/// ## Invariants
/// - The default tokenizer never produces an empty `Literal`; custom
///   tokenizers are free to.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub enum Token {
	/// Marks the beginning of a line.
	Start,
	/// Marks the end of a line.
	End,
	/// A literal word.
	Literal(String),
}

impl Token {
	/// Creates a literal token from arbitrary text.
	pub fn literal(text: impl Into<String>) -> Self {
		Token::Literal(text.into())
	}

	/// Returns `true` for `Start` and `End`.
	pub fn is_special(&self) -> bool {
		matches!(self, Token::Start | Token::End)
	}

	/// Returns the text of a literal token, `None` for boundaries.
	pub fn as_literal(&self) -> Option<&str> {
		match self {
			Token::Literal(text) => Some(text),
			_ => None,
		}
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::Start => f.write_str("<start>"),
			Token::End => f.write_str("<end>"),
			Token::Literal(text) => write!(f, "{:?}", text),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn debug_rendering() {
		assert_eq!(format!("{:?}", Token::Start), "<start>");
		assert_eq!(format!("{:?}", Token::End), "<end>");
		assert_eq!(format!("{:?}", Token::literal("foo")), "\"foo\"");
	}

	#[test]
	fn equality_is_structural() {
		assert_eq!(Token::literal("a"), Token::literal(String::from("a")));
		assert_ne!(Token::literal("a"), Token::literal("A"));
		assert_ne!(Token::Start, Token::End);

		// A literal spelled like the debug rendering of a boundary is still a literal
		assert_ne!(Token::literal("<start>"), Token::Start);

		let set: HashSet<Token> = [Token::Start, Token::literal("a"), Token::literal("a"), Token::End]
			.into_iter()
			.collect();
		assert_eq!(set.len(), 3);
	}

	#[test]
	fn helpers() {
		assert!(Token::Start.is_special());
		assert!(Token::End.is_special());
		assert!(!Token::literal("x").is_special());
		assert_eq!(Token::literal("x").as_literal(), Some("x"));
		assert_eq!(Token::End.as_literal(), None);
	}
}
