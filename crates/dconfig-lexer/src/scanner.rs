use crate::token::{Span, Token, TokenKind};
use crate::{LexErrorKind, LexerError};

/// dconfig source scanner.
///
/// Pull-based: each call to [`Scanner::next_token`] skips whitespace, consumes
/// exactly one token and leaves the cursor at the start of whatever follows.
/// Line and column are tracked incrementally as characters are consumed.
///
/// Dispatch is on the first character:
/// - letter, `_` or `-` starts a name
/// - a digit starts a numeric literal
/// - `"` or `'` starts a quoted string
/// - `= [ ] { } ,` are single-character operators
///
/// Anything else yields [`TokenKind::Unknown`] without advancing.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    ///
    /// The vector always ends with a stop token: [`TokenKind::Eof`], or
    /// [`TokenKind::Unknown`] if an unrecognized character cut the scan short.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token()?;
            let stop = token.is_stop();
            tokens.push(token);
            if stop {
                return Ok(tokens);
            }
        }
    }

    /// Character offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(self.point(TokenKind::Eof));
        }

        match self.peek() {
            c if c.is_ascii_alphabetic() || c == '_' || c == '-' => Ok(self.scan_name()),
            c if c.is_ascii_digit() => self.scan_number(),
            '"' | '\'' => self.scan_string(),
            '=' => Ok(self.operator(TokenKind::Equals)),
            '[' => Ok(self.operator(TokenKind::LBracket)),
            ']' => Ok(self.operator(TokenKind::RBracket)),
            '{' => Ok(self.operator(TokenKind::LBrace)),
            '}' => Ok(self.operator(TokenKind::RBrace)),
            ',' => Ok(self.operator(TokenKind::Comma)),
            // Left in place: the parser turns this into a hard failure.
            c => Ok(self.point(TokenKind::Unknown(c))),
        }
    }

    // --- Scanners ---

    /// Scan a name: a maximal run of ASCII letters, digits, `_` and `-`.
    fn scan_name(&mut self) -> Token {
        let (start, line, column) = self.mark();

        let mut name = String::new();
        while !self.is_at_end() && is_name_char(self.peek()) {
            name.push(self.peek());
            self.advance();
        }

        self.finish(TokenKind::Name(name), start, line, column)
    }

    /// Scan a numeric literal.
    ///
    /// The integer part infers its base the way `strtoll(s, _, 0)` does:
    /// `0x` + hex digit is hexadecimal, a leading `0` is octal, anything else
    /// decimal. Only when the integer is immediately followed by `.` is the
    /// literal read again from its first digit as a decimal float.
    fn scan_number(&mut self) -> Result<Token, LexerError> {
        let (start, line, column) = self.mark();

        let radix = if self.peek() == '0'
            && matches!(self.peek_next(), 'x' | 'X')
            && self.peek_at(2).is_ascii_hexdigit()
        {
            self.advance();
            self.advance();
            16
        } else if self.peek() == '0' {
            8
        } else {
            10
        };
        let digits_start = self.pos;

        while !self.is_at_end() && self.peek().is_digit(radix) {
            self.advance();
        }

        if self.peek() == '.' {
            if radix == 16 {
                return Err(self.error_at(
                    LexErrorKind::InvalidNumber,
                    "Invalid number: hexadecimal floats are not supported".into(),
                    line,
                    column,
                ));
            }
            return self.scan_float(start, line, column);
        }

        let digits: String = self.chars[digits_start..self.pos].iter().collect();
        let value = i64::from_str_radix(&digits, radix).map_err(|_| {
            let text: String = self.chars[start..self.pos].iter().collect();
            self.error_at(
                LexErrorKind::InvalidNumber,
                format!("Invalid number: '{text}' does not fit in 64 bits"),
                line,
                column,
            )
        })?;

        Ok(self.finish(TokenKind::Int(value), start, line, column))
    }

    /// Continue a literal whose integer part stopped at `.`:
    /// `digits '.' digits* ([eE][+-]?digits)?`.
    fn scan_float(&mut self, start: usize, line: usize, column: usize) -> Result<Token, LexerError> {
        self.advance(); // consume `.`
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }

        // An exponent only counts when at least one digit follows it.
        if matches!(self.peek(), 'e' | 'E') {
            let sign = usize::from(matches!(self.peek_next(), '+' | '-'));
            if self.peek_at(1 + sign).is_ascii_digit() {
                for _ in 0..=sign {
                    self.advance();
                }
                while !self.is_at_end() && self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let value: f64 = text.parse().map_err(|_| {
            self.error_at(
                LexErrorKind::InvalidNumber,
                format!("Invalid number: '{text}'"),
                line,
                column,
            )
        })?;

        Ok(self.finish(TokenKind::Float(value), start, line, column))
    }

    /// Scan a string literal delimited by `"` or `'`.
    ///
    /// `\n`, `\t` and `\r` are decoded; any other escaped character is kept
    /// as-is with the backslash dropped.
    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let quote = self.peek();
        let (start, line, column) = self.mark();
        self.advance(); // consume opening quote

        let mut value = String::new();

        loop {
            if self.is_at_end() {
                return Err(self.error_at(
                    LexErrorKind::UnterminatedString,
                    "Unterminated string".into(),
                    line,
                    column,
                ));
            }

            match self.peek() {
                c if c == quote => break,
                '\\' => {
                    self.advance(); // consume backslash
                    if self.is_at_end() {
                        continue;
                    }
                    match self.peek() {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        c => value.push(c),
                    }
                    self.advance();
                }
                c => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        self.advance(); // consume closing quote

        Ok(self.finish(TokenKind::String(value), start, line, column))
    }

    fn operator(&mut self, kind: TokenKind) -> Token {
        let (start, line, column) = self.mark();
        self.advance();
        self.finish(kind, start, line, column)
    }

    // --- Helpers ---

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && is_space(self.peek()) {
            self.advance();
        }
    }

    /// Zero-width token at the cursor.
    fn point(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.pos, self.pos, self.line, self.column))
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.column)
    }

    fn finish(&self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos, line, column))
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error_at(&self, kind: LexErrorKind, message: String, line: usize, column: usize) -> LexerError {
        LexerError {
            kind,
            message,
            line,
            column,
        }
    }
}

/// The C `isspace` set.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
