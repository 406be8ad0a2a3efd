//! Template syntax tree
//!
//! Parsing produces a tree of [`Node`] values. Nodes are created only while parsing and are
//! never mutated afterwards. Text payloads are copied out of the source, so a tree outlives
//! the template text it came from.
//!
//! Node kinds:
//!
//! - `Sequence`: a syntactic grouping with no text of its own
//! - `Literal`: output text, appended verbatim
//! - `Value`: an opaque expression fragment, appended as a computed value
//! - `Block`: an opaque statement fragment
//! - `NamedBlock`: a keyword-headed control construct with one nested body
//! - `Empty`: what an optional construct produces when it matches nothing
//!
//! Walking the leaves of a tree in order reproduces the spans of the input they were parsed
//! from; delimiters, sigils and separating whitespace are the only text not carried by a leaf.

use serde::Serialize;
use std::fmt;
use std::slice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Sequence {
        name: String,
        children: Vec<Node>,
    },
    Literal {
        name: String,
        text: String,
    },
    Value {
        name: String,
        text: String,
    },
    Block {
        name: String,
        text: String,
    },
    NamedBlock {
        /// One or two identifier tokens, e.g. `if` or `else if`.
        keyword: String,
        /// Header text including its parentheses, or empty.
        condition: String,
        body: Box<Node>,
    },
    Empty,
}

impl Node {
    pub fn sequence(name: &str, children: Vec<Node>) -> Self {
        Node::Sequence {
            name: name.to_string(),
            children,
        }
    }

    pub fn literal(name: &str, text: &str) -> Self {
        Node::Literal {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    pub fn value(name: &str, text: &str) -> Self {
        Node::Value {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    pub fn block(name: &str, text: &str) -> Self {
        Node::Block {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    pub fn named_block(keyword: &str, condition: &str, body: Node) -> Self {
        Node::NamedBlock {
            keyword: keyword.to_string(),
            condition: condition.to_string(),
            body: Box::new(body),
        }
    }

    /// The variant name, used by the tree formats and assertion messages.
    pub fn node_type(&self) -> &'static str {
        match self {
            Node::Sequence { .. } => "Sequence",
            Node::Literal { .. } => "Literal",
            Node::Value { .. } => "Value",
            Node::Block { .. } => "Block",
            Node::NamedBlock { .. } => "NamedBlock",
            Node::Empty => "Empty",
        }
    }

    /// The grammar rule name that produced this node. Named blocks report their keyword.
    pub fn name(&self) -> &str {
        match self {
            Node::Sequence { name, .. }
            | Node::Literal { name, .. }
            | Node::Value { name, .. }
            | Node::Block { name, .. } => name,
            Node::NamedBlock { keyword, .. } => keyword,
            Node::Empty => "",
        }
    }

    /// Text payload of a leaf, or the header of a named block.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Literal { text, .. } | Node::Value { text, .. } | Node::Block { text, .. } => {
                Some(text)
            }
            Node::NamedBlock { condition, .. } => Some(condition),
            Node::Sequence { .. } | Node::Empty => None,
        }
    }

    /// Direct children in document order. A named block has exactly one: its body.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Sequence { children, .. } => children,
            Node::NamedBlock { body, .. } => slice::from_ref(body.as_ref()),
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// One-line label for tree views.
    pub fn display_label(&self) -> String {
        match self {
            Node::Sequence { name, children } => format!("{} ({} items)", name, children.len()),
            Node::Literal { text, .. } | Node::Value { text, .. } | Node::Block { text, .. } => {
                text.escape_debug().to_string()
            }
            Node::NamedBlock {
                keyword, condition, ..
            } => {
                if condition.trim().is_empty() {
                    keyword.clone()
                } else {
                    format!("{} {}", keyword, condition)
                }
            }
            Node::Empty => String::new(),
        }
    }
}

/// Compact single-line form: `name: 'text' {child, child}`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "empty");
        }
        write!(f, "{}:", self.name())?;
        if let Some(text) = self.text().filter(|t| !t.trim().is_empty()) {
            write!(f, " '{}'", text)?;
        }
        let children = self.children();
        if !children.is_empty() {
            write!(f, " {{")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}
