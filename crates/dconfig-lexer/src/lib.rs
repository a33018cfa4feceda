//! dconfig Lexer
//!
//! Tokenizes dconfig source text into a stream of classified tokens.
//! Handles identifiers, integer and float literals (with `strtoll`-style
//! base inference), quoted strings with escapes, and the single-character
//! operators `= [ ] { } ,`.
//!
//! # Example
//!
//! ```
//! use dconfig_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("port = 8080").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Name("port".into()));
//! assert_eq!(tokens[2].kind, TokenKind::Int(8080));
//! assert_eq!(tokens.len(), 4); // name, `=`, int, EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenClass, TokenKind};

/// What went wrong while scanning a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A quoted string ran to the end of input without its closing quote.
    UnterminatedString,
    /// A numeric literal could not be represented (overflow, hex float).
    InvalidNumber,
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}
