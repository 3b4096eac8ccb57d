use super::token::Token;

/// Splits `line` on runs of whitespace, keeping every other character.
///
/// The result always starts with `Token::Start` and ends with `Token::End`;
/// a blank line yields just these two tokens.
///
/// Example: `"a! b/c D."` -> `[<start>, "a!", "b/c", "D.", <end>]`
pub fn whitespace_tokenize(line: &str) -> Vec<Token> {
	let mut tokens = Vec::with_capacity(30);
	tokens.push(Token::Start);
	tokens.extend(line.split_whitespace().map(Token::literal));
	tokens.push(Token::End);
	tokens
}

/// Lowercases the whole line. Suitable as a chain normalizer.
pub fn lowercase(line: &str) -> String {
	line.to_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_punctuation_and_case() {
		let tokens = whitespace_tokenize("a! b/c D.");
		assert_eq!(
			tokens,
			vec![
				Token::Start,
				Token::literal("a!"),
				Token::literal("b/c"),
				Token::literal("D."),
				Token::End,
			]
		);
	}

	#[test]
	fn collapses_whitespace_runs() {
		let tokens = whitespace_tokenize("  one \t two\n\nthree  ");
		assert_eq!(tokens.len(), 5);
		assert!(tokens.iter().filter_map(Token::as_literal).all(|w| !w.is_empty()));
	}

	#[test]
	fn blank_line_is_only_boundaries() {
		assert_eq!(whitespace_tokenize(""), vec![Token::Start, Token::End]);
		assert_eq!(whitespace_tokenize(" \t "), vec![Token::Start, Token::End]);
	}

	#[test]
	fn lowercase_normalizer() {
		assert_eq!(lowercase("Hello ÉCOLE"), "hello école");
	}
}
