/// A position in source text, tracking line and column for error reporting.
///
/// `start..end` is the half-open range of character offsets the token covers.
/// `line` and `column` are 1-based and locate the token's first character
/// (`start`), never the position after it. Every error position reported by
/// the lexer and the parser uses this convention. A zero-width token
/// (end of input, unknown character) sits where scanning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Coarse token category. The parser dispatches on this before looking at
/// the exact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// End of input or a character the lexer does not recognize.
    Stop,
    Ident,
    Op,
    /// Scalar literals: int, float, string.
    Value,
}

/// Token classification for dconfig source.
///
/// Data-carrying variants embed their payload directly.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Stop
    Eof,
    /// A character no token starts with.
    Unknown(char),

    // Ident
    Name(String),

    // Value
    Int(i64),
    String(String),
    Float(f64),

    // Op
    Equals,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Eof | TokenKind::Unknown(_) => TokenClass::Stop,
            TokenKind::Name(_) => TokenClass::Ident,
            TokenKind::Int(_) | TokenKind::String(_) | TokenKind::Float(_) => TokenClass::Value,
            TokenKind::Equals
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Comma => TokenClass::Op,
        }
    }

    /// Human-readable name used in diagnostics ("expected name, got int").
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "file end",
            TokenKind::Unknown(_) => "unknown token",
            TokenKind::Name(_) => "name",
            TokenKind::Int(_) => "int",
            TokenKind::String(_) => "string",
            TokenKind::Float(_) => "float",
            TokenKind::Equals => "equals",
            TokenKind::LBracket => "open square bracket",
            TokenKind::RBracket => "close square bracket",
            TokenKind::LBrace => "open curly bracket",
            TokenKind::RBrace => "close curly bracket",
            TokenKind::Comma => "comma separator",
        }
    }
}

/// A token produced by the dconfig lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }

    pub fn is_stop(&self) -> bool {
        self.class() == TokenClass::Stop
    }
}
