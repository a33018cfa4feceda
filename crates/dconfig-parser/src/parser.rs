//! Document parser for dconfig.
//!
//! Parses the token stream from `dconfig-lexer` into a [`ConfigValue`] tree
//! by recursive descent: `parse_statement` and `parse_value` call each other,
//! and every step returns the subtree it built by value.
//!
//! Two ways to stop early:
//! - a grammar violation is fatal and surfaces as a [`ParseError`];
//! - running out of input inside an open `{`/`[` or right after a statement
//!   name is not an error. [`Parser::parse`] then returns [`ConfigValue::None`].

use std::collections::HashMap;
use std::sync::LazyLock;

use dconfig_lexer::{LexerError, Scanner, Span, Token, TokenClass, TokenKind};

use crate::value::ConfigValue;
use crate::{ParseError, ParseErrorKind};

/// How many objects and arrays may be open at once.
pub const MAX_DEPTH: usize = 128;

/// Why parsing stopped before the document was complete.
enum Halt {
    /// Input ended mid-statement.
    Truncated,
    Fatal(ParseError),
}

impl From<ParseError> for Halt {
    fn from(e: ParseError) -> Self {
        Halt::Fatal(e)
    }
}

/// dconfig document parser.
///
/// Walks a token vector (as produced by [`Scanner::tokenize`]) and builds the
/// root object. Running off the end of the vector reads as end of input, so a
/// missing stop token is treated like one.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    /// Lexer failure just past the last token, raised once the parser reaches it.
    lex_error: Option<LexerError>,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            lex_error: None,
        }
    }

    /// Parse source text into its root object.
    ///
    /// Returns `Ok(ConfigValue::None)` when the input ends before the statement
    /// in progress is complete; check for it before treating the result as an
    /// object.
    ///
    /// Errors are reported in input order: a malformed literal only fails the
    /// parse when the statements before it are well formed.
    pub fn parse(source: &str) -> Result<ConfigValue, ParseError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        let mut lex_error = None;

        loop {
            match scanner.next_token() {
                Ok(token) => {
                    let stop = token.is_stop();
                    tokens.push(token);
                    if stop {
                        break;
                    }
                }
                Err(e) => {
                    lex_error = Some(e);
                    break;
                }
            }
        }

        let mut parser = Parser::new(tokens);
        parser.lex_error = lex_error;
        parser.parse_document()
    }

    /// Parse the whole token stream as the statements of an implicit root object.
    pub fn parse_document(&mut self) -> Result<ConfigValue, ParseError> {
        self.check_lexed()?;
        let mut members = HashMap::new();

        match self.parse_root(&mut members) {
            Ok(()) => {
                tracing::debug!(members = members.len(), "parsed document");
                Ok(ConfigValue::Object(members))
            }
            Err(Halt::Truncated) => {
                let span = self.peek().span;
                tracing::debug!(
                    line = span.line,
                    column = span.column,
                    "input ended mid-statement"
                );
                Ok(ConfigValue::None)
            }
            Err(Halt::Fatal(e)) => Err(e),
        }
    }

    fn parse_root(&mut self, members: &mut HashMap<String, ConfigValue>) -> Result<(), Halt> {
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Unknown(_) => return Err(self.unknown_token().into()),
                _ => self.parse_statement(members)?,
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse `NAME '=' value` and store it in `members`, replacing any earlier
    /// member with the same name.
    fn parse_statement(&mut self, members: &mut HashMap<String, ConfigValue>) -> Result<(), Halt> {
        let name = match &self.peek().kind {
            TokenKind::Name(name) => name.clone(),
            TokenKind::Unknown(_) => return Err(self.unknown_token().into()),
            _ => return Err(self.expected(ParseErrorKind::ExpectedName, "name").into()),
        };
        self.advance()?;

        match &self.peek().kind {
            TokenKind::Equals => self.advance()?,
            TokenKind::Eof => return Err(Halt::Truncated),
            TokenKind::Unknown(_) => return Err(self.unknown_token().into()),
            _ => return Err(self.expected(ParseErrorKind::ExpectedEquals, "equals").into()),
        }

        let token = self.peek();
        let starts_value = token.class() == TokenClass::Value
            || matches!(token.kind, TokenKind::LBracket | TokenKind::LBrace);
        if !starts_value {
            return Err(match token.kind {
                TokenKind::Unknown(_) => self.unknown_token(),
                _ => self.expected(ParseErrorKind::ExpectedValue, "value"),
            }
            .into());
        }

        let value = self.parse_value()?;
        if let Some(previous) = members.insert(name, value) {
            tracing::trace!(replaced = previous.type_name(), "member overwritten by a later statement");
        }

        Ok(())
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Parse the value starting at the current token.
    ///
    /// Scalars and `[` are recognized; every other token is taken as the
    /// opener of an object, so stray punctuation inside an array turns into
    /// object syntax rather than an array error.
    fn parse_value(&mut self) -> Result<ConfigValue, Halt> {
        let scalar = match &self.peek().kind {
            TokenKind::Int(n) => Some(ConfigValue::Int(*n)),
            TokenKind::Float(n) => Some(ConfigValue::Float(*n)),
            TokenKind::String(s) => Some(ConfigValue::String(s.clone())),
            _ => None,
        };
        if let Some(scalar) = scalar {
            self.advance()?;
            return Ok(scalar);
        }

        self.enter()?;
        let value = if self.peek().kind == TokenKind::LBracket {
            self.parse_array()?
        } else {
            self.parse_object()?
        };
        self.depth -= 1;

        Ok(value)
    }

    /// Parse `'[' value* ']'`. Elements are separated by whitespace only.
    fn parse_array(&mut self) -> Result<ConfigValue, Halt> {
        self.advance()?; // consume `[`

        let mut items = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::RBracket => break,
                TokenKind::Eof => return Err(Halt::Truncated),
                TokenKind::Unknown(_) => return Err(self.unknown_token().into()),
                _ => items.push(self.parse_value()?),
            }
        }
        self.advance()?; // consume `]`

        Ok(ConfigValue::Array(items))
    }

    /// Parse `'{' statement* '}'`.
    fn parse_object(&mut self) -> Result<ConfigValue, Halt> {
        self.advance()?; // consume the opener

        let mut members = HashMap::new();
        loop {
            match &self.peek().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(Halt::Truncated),
                TokenKind::Unknown(_) => return Err(self.unknown_token().into()),
                _ => self.parse_statement(&mut members)?,
            }
        }
        self.advance()?; // consume `}`

        Ok(ConfigValue::Object(members))
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(
                ParseErrorKind::NestingTooDeep,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        static EOF: LazyLock<Token> =
            LazyLock::new(|| Token::new(TokenKind::Eof, Span::new(0, 0, 1, 1)));
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    /// Move to the next token, failing if it is where the lexer gave up.
    fn advance(&mut self) -> Result<(), ParseError> {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.check_lexed()
    }

    fn check_lexed(&self) -> Result<(), ParseError> {
        match &self.lex_error {
            Some(e) if self.pos >= self.tokens.len() => Err(e.clone().into()),
            _ => Ok(()),
        }
    }

    fn expected(&self, kind: ParseErrorKind, what: &str) -> ParseError {
        let found = self.peek().kind.describe();
        self.error(kind, format!("expected {what}, got {found}"))
    }

    fn unknown_token(&self) -> ParseError {
        let message = match self.peek().kind {
            TokenKind::Unknown(c) => format!("unknown token '{}'", c.escape_default()),
            _ => "unknown token".to_string(),
        };
        self.error(ParseErrorKind::UnknownToken, message)
    }

    fn error(&self, kind: ParseErrorKind, message: String) -> ParseError {
        let token = self.peek();
        ParseError {
            kind,
            message,
            line: token.span.line,
            column: token.span.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{resolve, resolve_array};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ConfigValue {
        Parser::parse(source).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::parse(source).unwrap_err()
    }

    fn object(members: Vec<(&str, ConfigValue)>) -> ConfigValue {
        ConfigValue::Object(
            members
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    // =========================================================================
    // Documents
    // =========================================================================

    #[test]
    fn test_empty_document() {
        assert_eq!(parse(""), object(vec![]));
    }

    #[test]
    fn test_whitespace_document() {
        assert_eq!(parse("  \n\t\n"), object(vec![]));
    }

    #[test]
    fn test_multiple_statements() {
        let root = parse("a = 1\nb = 2.5\nc = 'three'");
        assert_eq!(
            root,
            object(vec![
                ("a", ConfigValue::Int(1)),
                ("b", ConfigValue::Float(2.5)),
                ("c", ConfigValue::String("three".into())),
            ])
        );
    }

    #[test]
    fn test_statements_on_one_line() {
        let root = parse("a=1 b=2");
        assert_eq!(resolve(&root, &["b"]), Some(&ConfigValue::Int(2)));
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    #[test]
    fn test_int() {
        assert_eq!(resolve(&parse("name = 42"), &["name"]), Some(&ConfigValue::Int(42)));
    }

    #[test]
    fn test_hex_and_octal() {
        let root = parse("mask = 0xff mode = 0755");
        assert_eq!(resolve(&root, &["mask"]), Some(&ConfigValue::Int(255)));
        assert_eq!(resolve(&root, &["mode"]), Some(&ConfigValue::Int(493)));
    }

    #[test]
    fn test_float() {
        assert_eq!(
            resolve(&parse("name = 3.5"), &["name"]),
            Some(&ConfigValue::Float(3.5))
        );
    }

    #[test]
    fn test_string_escape_decoded() {
        assert_eq!(
            resolve(&parse(r#"name = "a\nb""#), &["name"]),
            Some(&ConfigValue::String("a\nb".into()))
        );
    }

    // =========================================================================
    // Objects
    // =========================================================================

    #[test]
    fn test_nested_object() {
        let root = parse("a = { b = 1 }");
        assert_eq!(resolve(&root, &["a", "b"]), Some(&ConfigValue::Int(1)));
        assert_eq!(resolve(&root, &["a", "c"]), None);
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(parse("a = {}"), object(vec![("a", object(vec![]))]));
    }

    #[test]
    fn test_deeply_nested_objects() {
        let root = parse("a = { b = { c = { d = 'deep' } } }");
        assert_eq!(
            resolve(&root, &["a", "b", "c", "d"]).and_then(ConfigValue::as_str),
            Some("deep")
        );
    }

    #[test]
    fn test_last_write_wins() {
        let root = parse("a = 1\na = 2");
        assert_eq!(resolve(&root, &["a"]), Some(&ConfigValue::Int(2)));
        assert_eq!(root.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_last_write_wins_across_types() {
        let root = parse("a = { x = 1 } a = [1]");
        assert_eq!(resolve(&root, &["a"]), Some(&ConfigValue::Array(vec![ConfigValue::Int(1)])));
    }

    #[test]
    fn test_duplicate_in_nested_object() {
        let root = parse("o = { k = 'first' k = 'second' }");
        assert_eq!(
            resolve(&root, &["o", "k"]).and_then(ConfigValue::as_str),
            Some("second")
        );
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    #[test]
    fn test_array_indexing() {
        let root = parse("a = [1 2 3]");
        assert_eq!(resolve_array(&root, 1, &["a"]), Some(&ConfigValue::Int(2)));
        assert_eq!(resolve_array(&root, 5, &["a"]), None);
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(parse("a = []"), object(vec![("a", ConfigValue::Array(vec![]))]));
    }

    #[test]
    fn test_mixed_array() {
        let root = parse("a = [1 2.5 'x' [3] { k = 4 }]");
        assert_eq!(
            resolve(&root, &["a"]),
            Some(&ConfigValue::Array(vec![
                ConfigValue::Int(1),
                ConfigValue::Float(2.5),
                ConfigValue::String("x".into()),
                ConfigValue::Array(vec![ConfigValue::Int(3)]),
                object(vec![("k", ConfigValue::Int(4))]),
            ]))
        );
    }

    #[test]
    fn test_nested_arrays() {
        let root = parse("m = [[1 2] [3 4]]");
        let row = resolve_array(&root, 1, &["m"]).unwrap();
        assert_eq!(row.index(0), Some(&ConfigValue::Int(3)));
    }

    #[test]
    fn test_comma_in_array_is_not_a_separator() {
        // `,` takes the object branch: it is consumed as an opener and `2`
        // is then read where a statement name belongs.
        let err = parse_err("a = [1, 2]");
        assert_eq!(err.kind, ParseErrorKind::ExpectedName);
        assert_eq!((err.line, err.column), (1, 9));
        assert_eq!(err.message, "expected name, got int");
    }

    #[test]
    fn test_stray_token_in_array_opens_object() {
        let root = parse("a = [1 , k = 2 } 3]");
        assert_eq!(
            resolve(&root, &["a"]),
            Some(&ConfigValue::Array(vec![
                ConfigValue::Int(1),
                object(vec![("k", ConfigValue::Int(2))]),
                ConfigValue::Int(3),
            ]))
        );
    }

    // =========================================================================
    // Fatal errors
    // =========================================================================

    #[test]
    fn test_missing_equals() {
        let err = parse_err("a 1");
        assert_eq!(err.kind, ParseErrorKind::ExpectedEquals);
        assert_eq!((err.line, err.column), (1, 3));
        assert_eq!(err.message, "expected equals, got int");
    }

    #[test]
    fn test_missing_value_at_eof() {
        let err = parse_err("a =");
        assert_eq!(err.kind, ParseErrorKind::ExpectedValue);
        assert_eq!((err.line, err.column), (1, 4));
        assert_eq!(err.message, "expected value, got file end");
    }

    #[test]
    fn test_missing_value_before_next_statement() {
        let err = parse_err("a = \nb = 1");
        assert_eq!(err.kind, ParseErrorKind::ExpectedValue);
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_value_cannot_be_closing_bracket() {
        let err = parse_err("a = ]");
        assert_eq!(err.kind, ParseErrorKind::ExpectedValue);
        assert!(err.message.ends_with("close square bracket"));
    }

    #[test]
    fn test_statement_must_start_with_name() {
        let err = parse_err("1 = 2");
        assert_eq!(err.kind, ParseErrorKind::ExpectedName);
        assert_eq!(err.message, "expected name, got int");
    }

    #[test]
    fn test_stray_closing_brace_at_top_level() {
        let err = parse_err("a = 1 }");
        assert_eq!(err.kind, ParseErrorKind::ExpectedName);
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn test_unknown_character() {
        let err = parse_err("a = 1\nb = @");
        assert_eq!(err.kind, ParseErrorKind::UnknownToken);
        assert_eq!((err.line, err.column), (2, 5));
        assert_eq!(err.message, "unknown token '@'");
    }

    #[test]
    fn test_unknown_character_in_each_position() {
        for source in ["~", "a ~", "a = ~", "a = [~]", "a = { ~ }", "a = { b ~ }"] {
            assert_eq!(parse_err(source).kind, ParseErrorKind::UnknownToken, "{source}");
        }
    }

    #[test]
    fn test_lexer_errors_are_lifted() {
        let err = parse_err("a = 'open");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (1, 5));

        let err = parse_err("a = 99999999999999999999");
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber);
    }

    #[test]
    fn test_lexer_error_at_document_start() {
        let err = parse_err("'open");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_earlier_grammar_error_wins_over_later_lexer_error() {
        let err = parse_err("a 1 'x");
        assert_eq!(err.kind, ParseErrorKind::ExpectedEquals);
        assert_eq!((err.line, err.column), (1, 3));

        let err = parse_err("1 = 'oops");
        assert_eq!(err.kind, ParseErrorKind::ExpectedName);
        assert_eq!((err.line, err.column), (1, 1));

        let err = parse_err("a 1 b = 99999999999999999999");
        assert_eq!(err.kind, ParseErrorKind::ExpectedEquals);
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_statements_before_lexer_error_are_checked() {
        let err = parse_err("a = 1\nb = { c = 2 }\nd = 'open");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (3, 5));
    }

    #[test]
    fn test_error_display() {
        let err = parse_err("a 1");
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, column 3: expected equals, got int"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("a = {}1{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(Parser::parse(&ok).is_ok());

        let too_deep = format!("a = {}1{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(
            Parser::parse(&too_deep).unwrap_err().kind,
            ParseErrorKind::NestingTooDeep
        );
    }

    // =========================================================================
    // Truncated input
    // =========================================================================

    #[test]
    fn test_unclosed_object_is_truncated() {
        assert_eq!(parse("a = { b = 1"), ConfigValue::None);
    }

    #[test]
    fn test_unclosed_array_is_truncated() {
        assert_eq!(parse("a = [1 2"), ConfigValue::None);
    }

    #[test]
    fn test_trailing_name_is_truncated() {
        assert_eq!(parse("a = 1 b"), ConfigValue::None);
    }

    #[test]
    fn test_truncated_inside_nested_array() {
        assert_eq!(parse("a = { b = [1 { c = 2"), ConfigValue::None);
    }

    #[test]
    fn test_truncation_is_not_an_error() {
        assert!(Parser::parse("a = {").unwrap().is_none());
        assert!(Parser::parse("a =").is_err());
    }

    // =========================================================================
    // Parser::new on raw tokens
    // =========================================================================

    #[test]
    fn test_parse_document_from_tokens() {
        let tokens = Scanner::tokenize("x = 1").unwrap();
        let root = Parser::new(tokens).parse_document().unwrap();
        assert_eq!(resolve(&root, &["x"]), Some(&ConfigValue::Int(1)));
    }

    #[test]
    fn test_parse_document_without_tokens() {
        let root = Parser::new(Vec::new()).parse_document().unwrap();
        assert_eq!(root, object(vec![]));
    }

    fn token(kind: TokenKind, column: usize) -> Token {
        Token::new(kind, Span::new(column - 1, column, 1, column))
    }

    #[test]
    fn test_tokens_without_stop_token_end_the_input() {
        let tokens = vec![
            token(TokenKind::Name("a".into()), 1),
            token(TokenKind::Equals, 3),
            token(TokenKind::LBracket, 5),
            token(TokenKind::Int(1), 6),
        ];
        assert_eq!(Parser::new(tokens).parse_document().unwrap(), ConfigValue::None);

        let tokens = vec![
            token(TokenKind::Name("a".into()), 1),
            token(TokenKind::Equals, 3),
            token(TokenKind::Int(1), 5),
        ];
        let root = Parser::new(tokens).parse_document().unwrap();
        assert_eq!(root, object(vec![("a", ConfigValue::Int(1))]));

        let tokens = vec![token(TokenKind::Name("a".into()), 1), token(TokenKind::Equals, 3)];
        let err = Parser::new(tokens).parse_document().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedValue);
    }

    // =========================================================================
    // Full configuration
    // =========================================================================

    #[test]
    fn test_full_config() {
        let source = r#"
program = {
    name = "dconfig demo"
    londre = ["first" 'second' "third\tcol"]
    workers = 4
    ratio = 0.25
}
limits = { max-conn = 0x100 timeout = 1.5e1 }
"#;
        let root = parse(source);
        assert_eq!(
            resolve_array(&root, 2, &["program", "londre"]).and_then(ConfigValue::as_str),
            Some("third\tcol")
        );
        assert_eq!(resolve(&root, &["program", "workers"]).and_then(ConfigValue::as_int), Some(4));
        assert_eq!(resolve(&root, &["limits", "max-conn"]).and_then(ConfigValue::as_int), Some(256));
        assert_eq!(resolve(&root, &["limits", "timeout"]).and_then(ConfigValue::as_float), Some(15.0));
        assert_eq!(resolve(&root, &["program", "missing"]), None);
    }
}
