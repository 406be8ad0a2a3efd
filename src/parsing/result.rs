//! Outcome of running a parser against a cursor

use crate::ast::Node;

/// Result of applying a parser to the unconsumed suffix of the input.
///
/// `remainder` is always a suffix of the text handed to the parser that produced the result.
/// A failure never reports more input consumed than the parser that failed actually matched.
///
/// A `committed` failure was raised after the input was already recognized as one particular
/// construct. Choices, repetitions and optionals pass it on instead of trying alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<'a> {
    Success {
        tree: Node,
        remainder: &'a str,
    },
    Failure {
        remainder: &'a str,
        expected: String,
        committed: bool,
    },
}

impl<'a> ParseResult<'a> {
    pub fn success(tree: Node, remainder: &'a str) -> Self {
        ParseResult::Success { tree, remainder }
    }

    pub fn failure(remainder: &'a str, expected: impl Into<String>) -> Self {
        ParseResult::Failure {
            remainder,
            expected: expected.into(),
            committed: false,
        }
    }

    /// Mark a failure as committed. Successes are returned unchanged.
    pub fn commit(self) -> Self {
        match self {
            ParseResult::Failure {
                remainder,
                expected,
                ..
            } => ParseResult::Failure {
                remainder,
                expected,
                committed: true,
            },
            success => success,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, ParseResult::Failure { committed: true, .. })
    }

    /// A success that consumed nothing and produced no tree.
    pub fn empty(remainder: &'a str) -> Self {
        ParseResult::Success {
            tree: Node::Empty,
            remainder,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn remainder(&self) -> &'a str {
        match self {
            ParseResult::Success { remainder, .. } | ParseResult::Failure { remainder, .. } => {
                remainder
            }
        }
    }

    /// What the parser expected, for failures.
    pub fn expected(&self) -> Option<&str> {
        match self {
            ParseResult::Failure { expected, .. } => Some(expected),
            ParseResult::Success { .. } => None,
        }
    }

    pub fn tree(&self) -> Option<&Node> {
        match self {
            ParseResult::Success { tree, .. } => Some(tree),
            ParseResult::Failure { .. } => None,
        }
    }

    pub fn into_tree(self) -> Option<Node> {
        match self {
            ParseResult::Success { tree, .. } => Some(tree),
            ParseResult::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_success_without_consuming() {
        let result = ParseResult::empty("rest");
        assert!(result.is_success());
        assert_eq!(result.remainder(), "rest");
        assert_eq!(result.tree(), Some(&Node::Empty));
    }

    #[test]
    fn test_failure_accessors() {
        let result = ParseResult::failure("@{", "'}'");
        assert!(!result.is_success());
        assert_eq!(result.expected(), Some("'}'"));
        assert_eq!(result.remainder(), "@{");
        assert!(!result.is_committed());
        assert!(result.into_tree().is_none());
    }

    #[test]
    fn test_commit_keeps_position() {
        let result = ParseResult::failure("(y}", "')'").commit();
        assert!(result.is_committed());
        assert_eq!(result.remainder(), "(y}");
        assert!(!ParseResult::empty("").commit().is_committed());
    }
}
