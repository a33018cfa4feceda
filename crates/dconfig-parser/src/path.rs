//! Textual paths into a value tree: `program.londre[0]`.
//!
//! A path is a dot-separated list of member names, each optionally followed
//! by one or more `[N]` array indices. Names use the same character set as
//! dconfig statement names.

use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// An ordered list of keys and indices, resolved with
/// [`ConfigValue::lookup`](crate::ConfigValue::lookup).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Path(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Error from parsing a [`Path`], with the character offset where it was detected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid path at offset {offset}: {message}")]
pub struct PathError {
    pub message: String,
    pub offset: usize,
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0;

        if chars.is_empty() {
            return Ok(Path::default());
        }

        loop {
            let start = pos;
            while pos < chars.len() && is_key_char(chars[pos]) {
                pos += 1;
            }
            if pos == start {
                return Err(error("expected a member name", pos));
            }
            segments.push(PathSegment::Key(chars[start..pos].iter().collect()));

            while pos < chars.len() && chars[pos] == '[' {
                pos += 1;
                let digits_start = pos;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == digits_start {
                    return Err(error("expected an array index", pos));
                }
                if pos >= chars.len() || chars[pos] != ']' {
                    return Err(error("expected ']'", pos));
                }
                let digits: String = chars[digits_start..pos].iter().collect();
                let index = digits
                    .parse()
                    .map_err(|_| error("array index out of range", digits_start))?;
                segments.push(PathSegment::Index(index));
                pos += 1; // consume `]`
            }

            match chars.get(pos) {
                None => break,
                Some('.') => pos += 1,
                Some(c) => return Err(error(&format!("unexpected character '{c}'"), pos)),
            }
        }

        Ok(Path(segments))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn error(message: &str, offset: usize) -> PathError {
    PathError {
        message: message.to_string(),
        offset,
    }
}
