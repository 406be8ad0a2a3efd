//! Parsing module for templates
//!
//! Turns template text into a [`Node`] tree in one pass over the input:
//! 1. **Dialect selection**: a leading `{\rtf` marker selects the rich (RTF) dialect
//! 2. **Matching**: the grammar's combinators consume the input left to right
//! 3. **Validation**: the whole input must be consumed, otherwise the parse fails
//!
//! ## Layers
//!
//! - [`pattern`]: leading-span matchers (literal, anchored regex)
//! - [`balanced`]: nesting-aware delimiter scanning
//! - [`combinators`]: the parser combinator engine
//! - [`grammar`]: the template grammar built from the pieces above
//!
//! Parsing is pure: the same text always yields the same tree or the same error, and a
//! grammar can be shared between threads.

pub mod balanced;
pub mod combinators;
pub mod grammar;
pub mod pattern;
pub mod result;

pub use combinators::Parser;
pub use grammar::{Dialect, Grammar, RTF_MARKER, SIGIL};
pub use pattern::PatternError;
pub use result::ParseResult;

use crate::ast::Node;
use std::fmt;

const PREVIEW_CHARS: usize = 40;

/// Error returned when a template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input does not match the grammar.
    Syntax {
        /// Byte offset of the unconsumed input.
        offset: usize,
        /// The unconsumed input.
        remainder: String,
        /// What the grammar expected at `offset`.
        expected: String,
    },
    /// The grammar itself could not be built.
    InvalidGrammar(PatternError),
}

impl ParseError {
    /// 1-based line and column of a syntax error within `source`.
    pub fn location(&self, source: &str) -> Option<(usize, usize)> {
        match self {
            ParseError::Syntax { offset, .. } => {
                let before = source.get(..*offset)?;
                let line = before.matches('\n').count() + 1;
                let column = before
                    .rfind('\n')
                    .map_or(before, |nl| &before[nl + 1..])
                    .chars()
                    .count()
                    + 1;
                Some((line, column))
            }
            ParseError::InvalidGrammar(_) => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax {
                offset,
                remainder,
                expected,
            } => {
                let preview: String = remainder.chars().take(PREVIEW_CHARS).collect();
                let ellipsis = if remainder.chars().count() > PREVIEW_CHARS {
                    "..."
                } else {
                    ""
                };
                write!(
                    f,
                    "Parse error at offset {}: expected {}, found {:?}{}",
                    offset, expected, preview, ellipsis
                )
            }
            ParseError::InvalidGrammar(e) => write!(f, "Invalid grammar: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidGrammar(e) => Some(e),
            ParseError::Syntax { .. } => None,
        }
    }
}

impl From<PatternError> for ParseError {
    fn from(err: PatternError) -> Self {
        ParseError::InvalidGrammar(err)
    }
}

/// Parse a complete template with the shared grammar.
///
/// An empty template parses to [`Node::Empty`].
pub fn parse(text: &str) -> Result<Node, ParseError> {
    parse_with(Grammar::shared()?, text)
}

/// Parse a complete template with the given grammar.
pub fn parse_with(grammar: &Grammar, text: &str) -> Result<Node, ParseError> {
    crate::trace!(len = text.len(), "parsing template");
    match grammar.parse(text) {
        ParseResult::Success { tree, remainder } if remainder.is_empty() => Ok(tree),
        ParseResult::Success { remainder, .. } => Err(syntax_error(text, remainder, "end of input")),
        ParseResult::Failure {
            remainder,
            expected,
            ..
        } => Err(syntax_error(text, remainder, &expected)),
    }
}

fn syntax_error(text: &str, remainder: &str, expected: &str) -> ParseError {
    let offset = text.len() - remainder.len();
    crate::debug!(offset, expected, "template failed to parse");
    ParseError::Syntax {
        offset,
        remainder: remainder.to_string(),
        expected: expected.to_string(),
    }
}
