//! Leading-span matchers
//!
//! A [`Matcher`] looks at the start of the unconsumed input and either reports how much of
//! it matches, together with the byte ranges of any capture groups, or describes what it
//! expected to find. Matchers never look past the span they claim and hold no state, so one
//! instance can serve any number of concurrent parses.
//!
//! Two general-purpose matchers live here:
//!
//! - [`Literal`]: a fixed string
//! - [`RegexPattern`]: a regular expression anchored at the start of the input
//!
//! Structural matchers that need nesting-depth tracking (balanced parentheses and braces)
//! are built on the same trait in the `balanced` and `grammar` modules.

use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Capture groups of a successful match, as byte ranges into the matched input.
///
/// Group 0 is always the whole match and starts at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'a> {
    input: &'a str,
    groups: Vec<Option<Range<usize>>>,
}

impl<'a> Captures<'a> {
    /// A match covering `input[..end]`, with no capture groups yet.
    pub fn new(input: &'a str, end: usize) -> Self {
        Self {
            input,
            groups: vec![Some(0..end)],
        }
    }

    /// Append the next capture group. `None` records a group that did not participate.
    pub fn with_group(mut self, range: Option<Range<usize>>) -> Self {
        self.groups.push(range);
        self
    }

    /// The input the match was taken from (matched span plus remainder).
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The whole matched span.
    pub fn as_str(&self) -> &'a str {
        &self.input[..self.len()]
    }

    /// Number of bytes consumed by the match.
    pub fn len(&self) -> usize {
        self.groups[0].as_ref().map_or(0, |r| r.end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Input following the matched span.
    pub fn remainder(&self) -> &'a str {
        &self.input[self.len()..]
    }

    /// Byte range of a capture group, if it participated in the match.
    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(index).cloned().flatten()
    }

    /// Text of a capture group, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.range(index).map(|r| &self.input[r])
    }

    /// Text of a capture group, or the empty string when it did not participate.
    pub fn text(&self, index: usize) -> &'a str {
        self.get(index).unwrap_or("")
    }

    /// Number of groups, including group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Matches a leading span of the input.
pub trait Matcher: Send + Sync {
    /// Match at the start of `input`, or describe what was expected there.
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String>;
}

/// Error type for pattern construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Invalid regex pattern
    InvalidPattern(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidPattern(msg) => write!(f, "Invalid regex pattern: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {}

/// Matches a fixed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(pub String);

impl Literal {
    pub fn new(text: &str) -> Self {
        Literal(text.to_string())
    }
}

impl Matcher for Literal {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        if input.starts_with(self.0.as_str()) {
            Ok(Captures::new(input, self.0.len()))
        } else {
            Err(format!("'{}'", self.0))
        }
    }
}

/// A regular expression that only matches at the start of the input.
///
/// Capture groups of the expression are reported in order after group 0.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    label: String,
    pattern: String,
    regex: Regex,
}

impl RegexPattern {
    /// Compile `pattern`, anchored at the start of the input.
    ///
    /// `label` is what failures report as expected.
    pub fn new(label: &str, pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&format!(r"\A(?:{})", pattern))
            .map_err(|e| PatternError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            label: label.to_string(),
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Get the pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Matcher for RegexPattern {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        match self.regex.captures(input) {
            Some(caps) => {
                let end = caps.get(0).map_or(0, |m| m.end());
                // Group 0 is the whole match and already recorded by `new`
                let captures = (1..caps.len()).fold(Captures::new(input, end), |acc, i| {
                    acc.with_group(caps.get(i).map(|m| m.range()))
                });
                Ok(captures)
            }
            None => Err(self.label.clone()),
        }
    }
}
