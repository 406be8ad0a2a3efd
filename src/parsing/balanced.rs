//! Balanced delimiter scanning
//!
//! Finds the extent of a delimited span such as `(a (b) c)` or `\{ x \{ y \} \}` with a single
//! forward pass that counts nesting depth token by token. The span must start with the opening
//! token; it ends at the closing token that brings the depth back to zero. Running out of
//! input first means some opener (the outer one or a dangling inner one) was never closed,
//! which is reported as [`BalanceError::Unclosed`].
//!
//! Double-quoted strings can be treated as opaque, so `("a)")` is one span. Inside a string a
//! backslash escapes the following character.

use super::pattern::{Captures, Matcher};
use std::fmt;
use std::ops::Range;

/// An opening and closing token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
}

pub const PARENS: Delimiters = Delimiters {
    open: "(",
    close: ")",
};

pub const BRACES: Delimiters = Delimiters {
    open: "{",
    close: "}",
};

/// Braces as written inside RTF, where a bare brace is document structure.
pub const ESCAPED_BRACES: Delimiters = Delimiters {
    open: "\\{",
    close: "\\}",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// The input does not start with the opening token.
    MissingOpen { open: &'static str },
    /// Input ended with `depth` openers still unmatched.
    Unclosed {
        open: &'static str,
        close: &'static str,
        depth: usize,
    },
    /// A string starting at `offset` has no closing quote.
    UnterminatedString { offset: usize },
}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceError::MissingOpen { open } => write!(f, "'{}'", open),
            BalanceError::Unclosed { open, close, depth } => write!(
                f,
                "'{}' to close '{}' ({} left open)",
                close, open, depth
            ),
            BalanceError::UnterminatedString { offset } => {
                write!(f, "'\"' to end the string opened at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for BalanceError {}

/// Extent of a balanced span found at the start of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedSpan {
    /// Text between the outer delimiters.
    pub inner: Range<usize>,
    /// Offset just past the outer closing token.
    pub end: usize,
}

/// Scan the balanced span at the start of `input`.
pub fn scan(
    input: &str,
    delimiters: Delimiters,
    opaque_strings: bool,
) -> Result<BalancedSpan, BalanceError> {
    let Delimiters { open, close } = delimiters;
    if !input.starts_with(open) {
        return Err(BalanceError::MissingOpen { open });
    }

    let mut depth = 1usize;
    let mut pos = open.len();
    while pos < input.len() {
        let rest = &input[pos..];
        if opaque_strings && rest.starts_with('"') {
            pos = string_end(input, pos)?;
        } else if rest.starts_with(close) {
            depth -= 1;
            if depth == 0 {
                return Ok(BalancedSpan {
                    inner: open.len()..pos,
                    end: pos + close.len(),
                });
            }
            pos += close.len();
        } else if rest.starts_with(open) {
            depth += 1;
            pos += open.len();
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    Err(BalanceError::Unclosed { open, close, depth })
}

/// Returns the offset just past the string literal whose opening quote is at `start`.
pub fn string_end(input: &str, start: usize) -> Result<usize, BalanceError> {
    let mut chars = input[start + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => return Ok(start + 1 + i + 1),
            _ => {}
        }
    }
    Err(BalanceError::UnterminatedString { offset: start })
}

/// Skip `\s* <token> \s*` at `pos`, if present. Returns the new position.
///
/// The token must not run into a following ASCII letter, so `\par` does not match the start
/// of `\pard`.
pub fn skip_separator(input: &str, pos: usize, token: &str) -> usize {
    let after_ws = skip_whitespace(input, pos);
    match input[after_ws..].strip_prefix(token) {
        Some(rest) if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) => {
            skip_whitespace(input, after_ws + token.len())
        }
        _ => pos,
    }
}

pub fn skip_whitespace(input: &str, pos: usize) -> usize {
    let rest = &input[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Matches a balanced span and captures its inner text as group 1.
///
/// With a `separator` (the RTF paragraph break), one optional separator directly after the
/// opener and one directly after the closer are absorbed into the match but kept out of the
/// captured text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedMatcher {
    pub delimiters: Delimiters,
    pub opaque_strings: bool,
    pub separator: Option<&'static str>,
}

impl BalancedMatcher {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            opaque_strings: false,
            separator: None,
        }
    }

    /// Treat double-quoted strings as opaque.
    pub fn with_opaque_strings(mut self) -> Self {
        self.opaque_strings = true;
        self
    }

    pub fn with_separator(mut self, separator: Option<&'static str>) -> Self {
        self.separator = separator;
        self
    }

    /// Match at `start` within `input`, returning the inner range and the end of the match.
    pub fn find_at(&self, input: &str, start: usize) -> Result<BalancedSpan, BalanceError> {
        let span = scan(&input[start..], self.delimiters, self.opaque_strings)?;
        let mut inner = start + span.inner.start..start + span.inner.end;
        let mut end = start + span.end;
        if let Some(separator) = self.separator {
            inner.start = skip_separator(input, inner.start, separator).min(inner.end);
            end = skip_separator(input, end, separator);
        }
        Ok(BalancedSpan { inner, end })
    }
}

impl Matcher for BalancedMatcher {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        let span = self.find_at(input, 0).map_err(|e| e.to_string())?;
        Ok(Captures::new(input, span.end).with_group(Some(span.inner)))
    }
}
