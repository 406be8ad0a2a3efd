//! Template grammar
//!
//! Two structurally identical grammars, one per [`Dialect`], assembled from the combinators:
//!
//! ```text
//! template         = { section }, end of input
//! section          = content | code section
//! content          = { any character - "@" }+
//! code section     = { "@@" | "@", code | bare sigil }+
//! code             = block chain | statement block | unambiguous expr | auto-closed expr
//! block chain      = named block, { whitespace, named block }
//! named block      = word [" " word], [ws], ["(" balanced ")"], [ws], open, template, close
//! statement block  = open, balanced statements, close
//! unambiguous expr = "(", balanced expression, ")"
//! auto-closed expr = { character - "@" - "\" - "{" - "}" - ")" - ws
//!                    | ", " ws* | quoted string | "(" balanced ")" }+
//! bare sigil       = "@" not followed by "(", open or a malformed expression
//! ```
//!
//! Once a named block's keyword, header and balanced body have matched, a failure inside the
//! body is final: the input is not re-read as an expression followed by text.
//!
//! `open`/`close` are `{`/`}` in the plain dialect and `\{`/`\}` in the rich (RTF) dialect.
//! In the rich dialect, whitespace also absorbs `\par` paragraph breaks, and one `\par`
//! directly inside or after a block delimiter is dropped.
//!
//! Input starting with the RTF marker `{\rtf` is parsed entirely in the rich dialect;
//! anything else in the plain dialect. Any identifier is accepted as a block keyword:
//! whether `foreach` or `else if` make sense is up to whatever executes the result.

use super::balanced::{
    self, skip_whitespace, BalancedMatcher, Delimiters, BRACES, ESCAPED_BRACES, PARENS,
};
use super::combinators::{
    any, branch, custom, last, optional, sequence_with, set, set_to_end, term, try_custom,
    Forward, MapError, Parser,
};
use super::pattern::{Captures, Literal, Matcher, PatternError, RegexPattern};
use super::result::ParseResult;
use crate::ast::Node;
use once_cell::sync::Lazy;

/// Marks the start of a code section.
pub const SIGIL: char = '@';

/// Leading marker selecting the rich dialect.
pub const RTF_MARKER: &str = "{\\rtf";

const PARAGRAPH_BREAK: &str = "\\par";

/// Characters an auto-closed expression gives back when they end the run.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Delimiter flavour of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain text with `{`/`}` blocks.
    Plain,
    /// RTF with `\{`/`\}` blocks and `\par` as a soft line break.
    Rich,
}

impl Dialect {
    /// The dialect a template is parsed in.
    pub fn detect(text: &str) -> Self {
        if text.starts_with(RTF_MARKER) {
            Dialect::Rich
        } else {
            Dialect::Plain
        }
    }

    pub fn block_delimiters(self) -> Delimiters {
        match self {
            Dialect::Plain => BRACES,
            Dialect::Rich => ESCAPED_BRACES,
        }
    }

    pub fn paragraph_break(self) -> Option<&'static str> {
        match self {
            Dialect::Plain => None,
            Dialect::Rich => Some(PARAGRAPH_BREAK),
        }
    }

    fn whitespace_pattern(self) -> &'static str {
        match self {
            Dialect::Plain => r"\s*",
            Dialect::Rich => r"(?:\s|\\par\b)*",
        }
    }

    /// Remove paragraph breaks from statement text.
    fn strip_breaks(self, text: &str) -> String {
        let Some(brk) = self.paragraph_break() else {
            return text.to_string();
        };
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(i) = rest.find(brk) {
            let after = &rest[i + brk.len()..];
            out.push_str(&rest[..i]);
            if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                // a longer control word such as \pard
                out.push_str(brk);
            }
            rest = after;
        }
        out.push_str(rest);
        out
    }
}

/// A sigil that does not start any code form.
///
/// Refuses when an opening delimiter or a malformed expression such as `foo(` follows, so that
/// unbalanced code is reported instead of being passed through as text.
struct BareSigil {
    openers: [&'static str; 2],
}

impl BareSigil {
    fn new(dialect: Dialect) -> Self {
        Self {
            openers: [PARENS.open, dialect.block_delimiters().open],
        }
    }
}

impl Matcher for BareSigil {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        let Some(rest) = input.strip_prefix(SIGIL) else {
            return Err(format!("'{}'", SIGIL));
        };
        if self.openers.iter().any(|open| rest.starts_with(open)) {
            return Err(format!(
                "'{}' not followed by '{}' or '{}'",
                SIGIL, self.openers[0], self.openers[1]
            ));
        }
        autoclosed_end(rest).map_err(|e| e.to_string())?;
        Ok(Captures::new(input, SIGIL.len_utf8()))
    }
}

/// Length of the auto-closed expression at the start of `input`, possibly zero.
///
/// Argument lists are scanned as balanced spans, so an opening parenthesis without its closer
/// is an error. An unmatched `)` ends the expression.
fn autoclosed_end(input: &str) -> Result<usize, balanced::BalanceError> {
    let mut pos = 0;
    // end of the last quoted string or argument list; trimming never reaches into it
    let mut protected = 0;
    while let Some(c) = input[pos..].chars().next() {
        match c {
            ',' => pos = skip_whitespace(input, pos + 1),
            '"' => match balanced::string_end(input, pos) {
                Ok(end) => {
                    pos = end;
                    protected = end;
                }
                Err(_) => pos += 1,
            },
            '(' => {
                pos += balanced::scan(&input[pos..], PARENS, true)?.end;
                protected = pos;
            }
            ')' | '\\' | '{' | '}' => break,
            c if c == SIGIL || c.is_whitespace() => break,
            c => pos += c.len_utf8(),
        }
    }

    let kept = input[protected..pos]
        .trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
        .len();
    Ok(protected + kept)
}

/// An expression that ends where the code stops looking like code.
struct AutoClosedExpression;

impl Matcher for AutoClosedExpression {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        match autoclosed_end(input).map_err(|e| e.to_string())? {
            0 => Err("expression".to_string()),
            end => Ok(Captures::new(input, end)),
        }
    }
}

/// `keyword [header] { body }`, capturing keyword, header and body as groups 1 to 3.
struct NamedBlockMatcher {
    keyword: RegexPattern,
    body: BalancedMatcher,
}

impl NamedBlockMatcher {
    fn new(dialect: Dialect) -> Result<Self, PatternError> {
        Ok(Self {
            keyword: RegexPattern::new("named block keyword", r"\w+")?,
            body: BalancedMatcher::new(dialect.block_delimiters())
                .with_separator(dialect.paragraph_break()),
        })
    }

    fn find_after_keyword<'a>(
        &self,
        input: &'a str,
        keyword_end: usize,
    ) -> Result<Captures<'a>, String> {
        let mut pos = skip_whitespace(input, keyword_end);
        let condition = if input[pos..].starts_with(PARENS.open) {
            let span = balanced::scan(&input[pos..], PARENS, true).map_err(|e| e.to_string())?;
            let range = pos..pos + span.end;
            pos = skip_whitespace(input, range.end);
            range
        } else {
            pos..pos
        };
        let body = self.body.find_at(input, pos).map_err(|e| e.to_string())?;

        Ok(Captures::new(input, body.end)
            .with_group(Some(0..keyword_end))
            .with_group(Some(condition))
            .with_group(Some(body.inner)))
    }
}

impl Matcher for NamedBlockMatcher {
    fn find<'a>(&self, input: &'a str) -> Result<Captures<'a>, String> {
        let first_word = self.keyword.find(input)?.len();

        // "else if": two words separated by exactly one space
        let mut keyword_ends = vec![first_word];
        if let Some(rest) = input[first_word..].strip_prefix(' ') {
            if let Ok(second) = self.keyword.find(rest) {
                keyword_ends.push(first_word + 1 + second.len());
            }
        }

        let mut error = String::new();
        for keyword_end in keyword_ends {
            match self.find_after_keyword(input, keyword_end) {
                Ok(captures) => return Ok(captures),
                Err(e) => error = e,
            }
        }
        Err(error)
    }
}

/// Build the template parser of one dialect.
///
/// The result parses a complete template: it fails unless all of its input is consumed.
/// Named block bodies recurse into the same parser.
fn template(dialect: Dialect) -> Result<Parser, PatternError> {
    let recursive = Forward::new();

    let content = term("content", RegexPattern::new("content", "[^@]+")?);
    let escape = custom(Literal::new("@@"), |_| Node::literal("escaped-sigil", "@"));
    let sigil = term("sigil", Literal::new("@"));
    let bare_sigil = term("bare-sigil", BareSigil::new(dialect));

    let unambiguous_expression = custom(
        BalancedMatcher::new(PARENS).with_opaque_strings(),
        |caps| Node::value("expression", caps.text(1)),
    );
    let autoclosed_expression = custom(AutoClosedExpression, |caps| {
        Node::value("expression", caps.as_str())
    });
    let statement_block = custom(
        BalancedMatcher::new(dialect.block_delimiters())
            .with_opaque_strings()
            .with_separator(dialect.paragraph_break()),
        move |caps| Node::block("statements", &dialect.strip_breaks(caps.text(1))),
    );

    let body = recursive.parser();
    let named_block = try_custom(NamedBlockMatcher::new(dialect)?, move |caps| {
        let range = caps.range(3).unwrap_or(0..0);
        match body.parse(&caps.input()[range.clone()]) {
            ParseResult::Success { tree, .. } => {
                Ok(Node::named_block(caps.text(1), caps.text(2), tree))
            }
            ParseResult::Failure {
                remainder,
                expected,
                ..
            } => Err(MapError {
                offset: range.end - remainder.len(),
                expected,
            }),
        }
    });
    let whitespace = term(
        "whitespace",
        RegexPattern::new("whitespace", dialect.whitespace_pattern())?,
    );
    let block_chain = sequence_with(
        chain_siblings,
        vec![
            named_block.clone(),
            optional(set(
                "block-chain",
                sequence_with(last, vec![whitespace, named_block]),
            )),
        ],
    );

    let code = any(vec![
        block_chain,
        statement_block,
        unambiguous_expression,
        autoclosed_expression,
    ]);
    let code_section = set(
        "code",
        any(vec![escape, sequence_with(last, vec![sigil, code]), bare_sigil]),
    );
    let section = any(vec![content, code_section]);

    let parser = set_to_end("template", section);
    recursive.define(&parser);
    Ok(parser)
}

/// Join the first block of a chain with the ones that follow it.
fn chain_siblings(nodes: Vec<Node>) -> Node {
    let mut blocks = Vec::new();
    for node in nodes {
        match node {
            Node::Empty => {}
            Node::Sequence { children, .. } => blocks.extend(children),
            block => blocks.push(block),
        }
    }
    match blocks.len() {
        1 => blocks.remove(0),
        _ => Node::sequence("block-chain", blocks),
    }
}

/// The assembled two-dialect grammar.
///
/// Building is comparatively expensive; use [`Grammar::shared`] unless a private instance is
/// needed. A grammar is immutable and can be used from several threads at once.
pub struct Grammar {
    root: Parser,
    plain: Parser,
    rich: Parser,
}

static SHARED: Lazy<Result<Grammar, PatternError>> = Lazy::new(Grammar::new);

impl Grammar {
    pub fn new() -> Result<Self, PatternError> {
        let plain = template(Dialect::Plain)?;
        let rich = template(Dialect::Rich)?;
        let marker = term("rtf-marker", Literal::new(RTF_MARKER));
        let root = branch("root", marker, rich.clone(), plain.clone());

        Ok(Self { root, plain, rich })
    }

    /// The process-wide grammar, built on first use.
    pub fn shared() -> Result<&'static Grammar, PatternError> {
        match &*SHARED {
            Ok(grammar) => Ok(grammar),
            Err(e) => Err(e.clone()),
        }
    }

    /// Parse a template, selecting the dialect from its first characters.
    pub fn parse<'a>(&self, text: &'a str) -> ParseResult<'a> {
        self.root.parse(text)
    }

    /// Parse `text` as a template body of the given dialect, without dialect detection.
    pub fn parse_dialect<'a>(&self, dialect: Dialect, text: &'a str) -> ParseResult<'a> {
        match dialect {
            Dialect::Plain => self.plain.parse(text),
            Dialect::Rich => self.rich.parse(text),
        }
    }
}
