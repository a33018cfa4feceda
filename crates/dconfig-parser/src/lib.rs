//! dconfig Parser
//!
//! Parses dconfig source into a [`ConfigValue`] tree and resolves paths
//! into it.
//!
//! ```
//! use dconfig_parser::{resolve, resolve_array, ConfigValue, Parser};
//!
//! let root = Parser::parse("server = { port = 8080 hosts = ['a' 'b'] }").unwrap();
//! assert_eq!(resolve(&root, &["server", "port"]), Some(&ConfigValue::Int(8080)));
//! assert_eq!(
//!     resolve_array(&root, 1, &["server", "hosts"]).and_then(ConfigValue::as_str),
//!     Some("b")
//! );
//! ```
//!
//! Grammar:
//!
//! ```text
//! document  := statement*
//! statement := NAME '=' value
//! value     := INT | FLOAT | STRING | array | object
//! array     := '[' value* ']'
//! object    := '{' statement* '}'
//! ```

pub mod parser;
pub mod path;
pub mod value;

pub use parser::Parser;
pub use path::{Path, PathError, PathSegment};
pub use value::{resolve, resolve_array, ConfigValue};

use dconfig_lexer::{LexErrorKind, LexerError};

/// What kind of grammar violation a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A statement did not start with a name.
    ExpectedName,
    /// A statement name was not followed by `=`.
    ExpectedEquals,
    /// `=` was not followed by a scalar, `[` or `{`.
    ExpectedValue,
    /// The lexer hit a character it does not recognize.
    UnknownToken,
    UnterminatedString,
    InvalidNumber,
    /// Objects and arrays nested deeper than [`parser::MAX_DEPTH`].
    NestingTooDeep,
}

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        let kind = match e.kind {
            LexErrorKind::UnterminatedString => ParseErrorKind::UnterminatedString,
            LexErrorKind::InvalidNumber => ParseErrorKind::InvalidNumber,
        };
        ParseError {
            kind,
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}
