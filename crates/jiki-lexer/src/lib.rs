//! Jiki scanner: converts source text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind, KEYWORDS, UNIMPLEMENTED_KEYWORDS};

use jiki_types::SyntaxError;

/// Scan `source` into tokens, stopping at the first error.
pub fn scan_tokens(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).lex()
}
