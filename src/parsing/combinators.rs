//! Parser combinators
//!
//! A [`Parser`] is a shareable function from the unconsumed input to a [`ParseResult`].
//! Parsers close over no mutable state: a grammar assembled from them is a fixed graph of
//! functions that any number of threads can run at once.
//!
//! The engine is PEG-style. [`any`] commits to the first branch that succeeds, and
//! [`sequence`] never retries an earlier item when a later one fails. Failures describe what
//! was expected; [`any`] aggregates the descriptions of every branch it tried. A committed
//! failure (see [`try_custom`]) cuts through choices and repetitions unchanged.
//!
//! Primitives:
//!
//! - [`term`]: match a leading pattern, yield it as a `Literal`
//! - [`custom`] / [`try_custom`]: match a leading pattern, build a node from the captures
//!
//! Compounds:
//!
//! - [`sequence`] / [`sequence_with`]: all parsers in order, reduce the children
//! - [`set`]: one or more repetitions
//! - [`set_to_end`]: repetitions that must exhaust the input
//! - [`any`]: ordered choice
//! - [`optional`]: zero or one
//! - [`end_of_input`]: require the input to be exhausted
//! - [`branch`]: commit to one of two parsers depending on a leading guard
//!
//! Recursive rules are tied together with [`Forward`].

use super::pattern::{Captures, Matcher};
use super::result::ParseResult;
use crate::ast::Node;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Weak};

type ParseFn = dyn for<'a> Fn(&'a str) -> ParseResult<'a> + Send + Sync;

/// A parser: a function from input text to a [`ParseResult`].
#[derive(Clone)]
pub struct Parser(Arc<ParseFn>);

impl Parser {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a str) -> ParseResult<'a> + Send + Sync + 'static,
    {
        Parser(Arc::new(f))
    }

    pub fn parse<'a>(&self, input: &'a str) -> ParseResult<'a> {
        (self.0)(input)
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Parser")
    }
}

/// Failure raised by a [`try_custom`] builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError {
    /// Byte offset into the matched input where the failure occurred.
    pub offset: usize,
    pub expected: String,
}

/// Match `matcher` and yield the matched span as `Literal(name, span)`.
pub fn term(name: &str, matcher: impl Matcher + 'static) -> Parser {
    let name = name.to_string();
    Parser::new(move |input| match matcher.find(input) {
        Ok(caps) => ParseResult::success(Node::literal(&name, caps.as_str()), caps.remainder()),
        Err(expected) => ParseResult::failure(input, expected),
    })
}

/// Match `matcher` and build the node from its captures.
pub fn custom<M, F>(matcher: M, map: F) -> Parser
where
    M: Matcher + 'static,
    F: for<'a> Fn(&Captures<'a>) -> Node + Send + Sync + 'static,
{
    Parser::new(move |input| match matcher.find(input) {
        Ok(caps) => ParseResult::success(map(&caps), caps.remainder()),
        Err(expected) => ParseResult::failure(input, expected),
    })
}

/// Like [`custom`], but the builder may itself fail, e.g. when it parses a captured span.
///
/// The failure is reported at `offset` within the input the matcher saw. It is committed:
/// the matcher already claimed the span, so no other reading of it is attempted.
pub fn try_custom<M, F>(matcher: M, map: F) -> Parser
where
    M: Matcher + 'static,
    F: for<'a> Fn(&Captures<'a>) -> Result<Node, MapError> + Send + Sync + 'static,
{
    Parser::new(move |input| match matcher.find(input) {
        Ok(caps) => match map(&caps) {
            Ok(node) => ParseResult::success(node, caps.remainder()),
            Err(e) => {
                let offset = e.offset.min(input.len());
                let remainder = input.get(offset..).unwrap_or(input);
                ParseResult::failure(remainder, e.expected).commit()
            }
        },
        Err(expected) => ParseResult::failure(input, expected),
    })
}

/// Run `parsers` in order; on success reduce the children with `reduce`.
///
/// The first failure is returned as is.
pub fn sequence_with<R>(reduce: R, parsers: Vec<Parser>) -> Parser
where
    R: Fn(Vec<Node>) -> Node + Send + Sync + 'static,
{
    Parser::new(move |input| {
        let mut nodes = Vec::with_capacity(parsers.len());
        let mut text = input;
        for parser in &parsers {
            match parser.parse(text) {
                ParseResult::Success { tree, remainder } => {
                    nodes.push(tree);
                    text = remainder;
                }
                failure => return failure,
            }
        }
        ParseResult::success(reduce(nodes), text)
    })
}

/// Run `parsers` in order and wrap the children in `Sequence(name, ..)`.
pub fn sequence(name: &str, parsers: Vec<Parser>) -> Parser {
    let name = name.to_string();
    sequence_with(move |nodes| Node::sequence(&name, nodes), parsers)
}

/// Reducer keeping the first child.
pub fn first(nodes: Vec<Node>) -> Node {
    nodes.into_iter().next().unwrap_or(Node::Empty)
}

/// Reducer keeping the last child.
pub fn last(nodes: Vec<Node>) -> Node {
    nodes.into_iter().last().unwrap_or(Node::Empty)
}

/// Apply `parser` until it fails.
///
/// Fails when there is not even one match. A single match is returned unwrapped; more are
/// wrapped in `Sequence(name, ..)`. A success that consumes nothing ends the repetition and
/// is discarded, so the loop always makes progress. A committed failure ends it too and is
/// returned as is.
pub fn set(name: &str, parser: Parser) -> Parser {
    let name = name.to_string();
    Parser::new(move |input| {
        let (nodes, text, stop) = repeat(&parser, input);
        if stop.is_committed() {
            return stop;
        }
        match nodes.len() {
            0 => match stop {
                ParseResult::Failure { expected, .. } => ParseResult::failure(input, expected),
                ParseResult::Success { .. } => ParseResult::failure(input, name.clone()),
            },
            _ => ParseResult::success(reduce_set(&name, nodes), text),
        }
    })
}

/// Like [`set`], but the repetition must consume all of the input.
///
/// Empty input yields `Empty`. When the repetition stops early, the failure that stopped it
/// is reported where it occurred, so the reason the rest was not consumed is never
/// recomputed.
pub fn set_to_end(name: &str, parser: Parser) -> Parser {
    let name = name.to_string();
    let end = end_of_input();
    Parser::new(move |input| {
        let (nodes, text, stop) = repeat(&parser, input);
        match stop {
            failure @ ParseResult::Failure { .. } if !text.is_empty() || failure.is_committed() => {
                failure
            }
            _ => match end.parse(text) {
                ParseResult::Success { .. } => ParseResult::success(reduce_set(&name, nodes), text),
                failure => failure,
            },
        }
    })
}

/// Apply `parser` while it makes progress. Returns the matches, the rest of the input and
/// the result that ended the loop.
fn repeat<'a>(parser: &Parser, input: &'a str) -> (Vec<Node>, &'a str, ParseResult<'a>) {
    let mut nodes = Vec::new();
    let mut text = input;
    loop {
        match parser.parse(text) {
            ParseResult::Success { tree, remainder } if remainder.len() < text.len() => {
                nodes.push(tree);
                text = remainder;
            }
            stop => return (nodes, text, stop),
        }
    }
}

fn reduce_set(name: &str, nodes: Vec<Node>) -> Node {
    match nodes.len() {
        0 => Node::Empty,
        1 => first(nodes),
        _ => Node::sequence(name, nodes),
    }
}

/// Ordered choice: the first success wins.
///
/// When every branch fails, the failure is reported at the original input with the
/// expectations of all branches.
pub fn any(parsers: Vec<Parser>) -> Parser {
    Parser::new(move |input| {
        let mut failures = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            match parser.parse(input) {
                success @ ParseResult::Success { .. } => return success,
                cut @ ParseResult::Failure {
                    committed: true, ..
                } => return cut,
                ParseResult::Failure { expected, .. } => failures.push(expected),
            }
        }
        ParseResult::failure(input, format!("one of [{}]", failures.join(", ")))
    })
}

/// Zero or one: a failure becomes `Empty` without consuming input, unless it is committed.
pub fn optional(parser: Parser) -> Parser {
    Parser::new(move |input| match parser.parse(input) {
        cut @ ParseResult::Failure {
            committed: true, ..
        } => cut,
        ParseResult::Failure { .. } => ParseResult::empty(input),
        success => success,
    })
}

/// Succeed with `Empty` on exhausted input.
pub fn end_of_input() -> Parser {
    Parser::new(|input| {
        if input.is_empty() {
            ParseResult::empty(input)
        } else {
            ParseResult::failure(input, "end of input")
        }
    })
}

/// Commit to `then` when `guard` matches, otherwise run `otherwise` on the same input.
///
/// Unlike [`any`], a failure of the chosen parser is reported as is. On success the guard's
/// node and the result of `then` are wrapped in `Sequence(name, ..)`.
pub fn branch(name: &str, guard: Parser, then: Parser, otherwise: Parser) -> Parser {
    let name = name.to_string();
    Parser::new(move |input| match guard.parse(input) {
        ParseResult::Success { tree, remainder } => match then.parse(remainder) {
            ParseResult::Success {
                tree: body,
                remainder,
            } => ParseResult::success(Node::sequence(&name, vec![tree, body]), remainder),
            failure => failure,
        },
        ParseResult::Failure { .. } => otherwise.parse(input),
    })
}

/// A parser that can be referenced before it is defined.
///
/// Holds only a weak reference to its target, so recursive grammars do not form reference
/// cycles. The owner of the grammar must keep the target parser alive.
#[derive(Clone, Default)]
pub struct Forward {
    slot: Arc<OnceCell<Weak<ParseFn>>>,
}

impl Forward {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser delegating to whatever [`Forward::define`] binds.
    pub fn parser(&self) -> Parser {
        let slot = Arc::clone(&self.slot);
        Parser::new(move |input| match slot.get().and_then(Weak::upgrade) {
            Some(target) => target(input),
            None => ParseResult::failure(input, "a defined grammar rule"),
        })
    }

    /// Bind the target. Later calls are ignored.
    pub fn define(&self, target: &Parser) {
        let _ = self.slot.set(Arc::downgrade(&target.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::pattern::{Literal, RegexPattern};

    fn word() -> Parser {
        term("word", RegexPattern::new("word", r"[a-z]+").unwrap())
    }

    fn lit(text: &str) -> Parser {
        term(text, Literal::new(text))
    }

    #[test]
    fn test_term_consumes_match() {
        let result = word().parse("abc def");
        assert_eq!(result.tree(), Some(&Node::literal("word", "abc")));
        assert_eq!(result.remainder(), " def");
    }

    #[test]
    fn test_term_failure_does_not_consume() {
        let result = word().parse("123");
        assert_eq!(result.remainder(), "123");
        assert_eq!(result.expected(), Some("word"));
    }

    #[test]
    fn test_custom_maps_captures() {
        let parser = custom(Literal::new("@@"), |_| Node::literal("escape", "@"));
        let result = parser.parse("@@x");
        assert_eq!(result.tree(), Some(&Node::literal("escape", "@")));
        assert_eq!(result.remainder(), "x");
    }

    #[test]
    fn test_try_custom_reports_failure_offset() {
        let parser = try_custom(Literal::new("abc"), |_| {
            Err(MapError {
                offset: 1,
                expected: "something".to_string(),
            })
        });
        let result = parser.parse("abcdef");
        assert_eq!(result.remainder(), "bcdef");
        assert_eq!(result.expected(), Some("something"));
        assert!(result.is_committed());
    }

    fn rejecting(text: &'static str) -> Parser {
        try_custom(Literal::new(text), |caps| {
            Err(MapError {
                offset: caps.len(),
                expected: "valid contents".to_string(),
            })
        })
    }

    #[test]
    fn test_committed_failure_cuts_through_any() {
        let parser = any(vec![rejecting("ab"), lit("a")]);
        let result = parser.parse("abc");
        assert_eq!(result.remainder(), "c");
        assert_eq!(result.expected(), Some("valid contents"));
    }

    #[test]
    fn test_committed_failure_cuts_through_set_and_optional() {
        let parser = optional(set("many", any(vec![lit("x"), rejecting("ab")])));
        let result = parser.parse("xxabc");
        assert!(result.is_committed());
        assert_eq!(result.remainder(), "c");
    }

    #[test]
    fn test_sequence_wraps_children() {
        let parser = sequence("pair", vec![lit("a"), lit("b")]);
        let result = parser.parse("abc");
        assert_eq!(
            result.tree(),
            Some(&Node::sequence(
                "pair",
                vec![Node::literal("a", "a"), Node::literal("b", "b")]
            ))
        );
        assert_eq!(result.remainder(), "c");
    }

    #[test]
    fn test_sequence_with_reducer() {
        let parser = sequence_with(last, vec![lit("a"), lit("b")]);
        assert_eq!(parser.parse("ab").tree(), Some(&Node::literal("b", "b")));
    }

    #[test]
    fn test_sequence_returns_inner_failure() {
        let parser = sequence("pair", vec![lit("a"), lit("b")]);
        let result = parser.parse("ax");
        assert_eq!(result.remainder(), "x");
        assert_eq!(result.expected(), Some("'b'"));
    }

    #[test]
    fn test_set_single_match_is_unwrapped() {
        let result = set("many", lit("a")).parse("ab");
        assert_eq!(result.tree(), Some(&Node::literal("a", "a")));
        assert_eq!(result.remainder(), "b");
    }

    #[test]
    fn test_set_multiple_matches_are_wrapped() {
        let result = set("many", lit("a")).parse("aaab");
        match result.tree() {
            Some(Node::Sequence { name, children }) => {
                assert_eq!(name, "many");
                assert_eq!(children.len(), 3);
            }
            other => panic!("Expected Sequence, found {:?}", other),
        }
        assert_eq!(result.remainder(), "b");
    }

    #[test]
    fn test_set_zero_matches_fails() {
        let result = set("many", lit("a")).parse("b");
        assert!(!result.is_success());
        assert_eq!(result.remainder(), "b");
    }

    #[test]
    fn test_set_stops_on_empty_success() {
        let result = set("many", optional(lit("a"))).parse("aab");
        assert!(result.is_success());
        assert_eq!(result.remainder(), "b");
    }

    #[test]
    fn test_any_first_success_wins() {
        let parser = any(vec![lit("ab"), lit("a")]);
        assert_eq!(parser.parse("abc").remainder(), "c");
        assert_eq!(parser.parse("ac").remainder(), "c");
    }

    #[test]
    fn test_any_aggregates_failures() {
        let parser = any(vec![lit("a"), lit("b")]);
        let result = parser.parse("c");
        assert_eq!(result.expected(), Some("one of ['a', 'b']"));
        assert_eq!(result.remainder(), "c");
    }

    #[test]
    fn test_any_reports_original_remainder() {
        let parser = any(vec![sequence("ab", vec![lit("a"), lit("b")])]);
        assert_eq!(parser.parse("ax").remainder(), "ax");
    }

    #[test]
    fn test_optional_never_fails() {
        let result = optional(lit("a")).parse("b");
        assert_eq!(result.tree(), Some(&Node::Empty));
        assert_eq!(result.remainder(), "b");
    }

    #[test]
    fn test_end_of_input() {
        let parser = end_of_input();
        assert_eq!(parser.parse("").tree(), Some(&Node::Empty));
        assert_eq!(parser.parse("a").expected(), Some("end of input"));
    }

    #[test]
    fn test_set_to_end_accepts_empty_input() {
        assert_eq!(set_to_end("many", lit("a")).parse("").tree(), Some(&Node::Empty));
    }

    #[test]
    fn test_set_to_end_consumes_everything() {
        let result = set_to_end("many", any(vec![lit("a"), lit("b")])).parse("ab");
        assert_eq!(result.remainder(), "");
        assert_eq!(result.tree().map(Node::children).map(<[Node]>::len), Some(2));
    }

    #[test]
    fn test_set_to_end_reports_stopping_failure() {
        let parser = set_to_end("many", sequence_with(last, vec![lit("a"), lit("b")]));
        let result = parser.parse("abac");
        assert_eq!(result.remainder(), "c");
        assert_eq!(result.expected(), Some("'b'"));
    }

    #[test]
    fn test_set_to_end_stopped_by_empty_success() {
        let result = set_to_end("many", optional(lit("a"))).parse("ab");
        assert_eq!(result.remainder(), "b");
        assert_eq!(result.expected(), Some("end of input"));
    }

    #[test]
    fn test_branch_commits_after_guard() {
        let parser = branch("root", lit("#"), lit("x"), lit("y"));
        assert!(parser.parse("#x").is_success());
        assert!(parser.parse("y").is_success());

        // After the guard matched, `otherwise` is not consulted
        let result = parser.parse("#y");
        assert_eq!(result.expected(), Some("'x'"));
        assert_eq!(result.remainder(), "y");
    }

    #[test]
    fn test_forward_allows_recursion() {
        // nested = "(" nested? ")"
        let forward = Forward::new();
        let nested = sequence(
            "nested",
            vec![lit("("), optional(forward.parser()), lit(")")],
        );
        forward.define(&nested);

        let result = nested.parse("(())rest");
        assert!(result.is_success());
        assert_eq!(result.remainder(), "rest");
    }

    #[test]
    fn test_forward_undefined_fails() {
        let forward = Forward::new();
        assert!(!forward.parser().parse("x").is_success());
    }

    #[test]
    fn test_parsers_are_shareable_across_threads() {
        let parser = set("many", lit("a"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let parser = parser.clone();
                std::thread::spawn(move || parser.parse("aaa").remainder().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 0);
        }
    }
}
