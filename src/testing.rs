//! Fluent assertion API for template trees
//!
//! ```rust,ignore
//! use gillette::testing::assert_tree;
//!
//! let tree = gillette::parse("@if (X) {A} else {B}")?;
//! assert_tree(&tree)
//!     .is_sequence("block-chain")
//!     .child_count(2)
//!     .child(0, |block| {
//!         block.is_named_block("if", "(X)").body(|body| {
//!             body.is_literal("A");
//!         });
//!     });
//! ```
//!
//! Failures name the path of the node that failed, e.g. `root[0].body[2]`.

use crate::ast::Node;

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a tree
pub fn assert_tree(node: &Node) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        context: "root".to_string(),
    }
}

fn summarize_children(children: &[Node]) -> String {
    children
        .iter()
        .map(|child| format!("{}({})", child.node_type(), child.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.node.node_type(),
            expected,
            "{}: Expected {}, found {}",
            self.context,
            expected,
            self.node
        );
        self
    }

    /// Assert the grammar rule name (the keyword, for named blocks)
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.node.name(),
            expected,
            "{}: Expected name '{}', found '{}'",
            self.context,
            expected,
            self.node.name()
        );
        self
    }

    /// Assert the text payload (the header, for named blocks)
    pub fn text(self, expected: &str) -> Self {
        let actual = self.node.text();
        assert_eq!(
            actual,
            Some(expected),
            "{}: Expected text '{}', found {:?}",
            self.context,
            expected,
            actual
        );
        self
    }

    pub fn text_contains(self, substring: &str) -> Self {
        let actual = self.node.text().unwrap_or_default();
        assert!(
            actual.contains(substring),
            "{}: Expected text to contain '{}', found '{}'",
            self.context,
            substring,
            actual
        );
        self
    }

    pub fn is_sequence(self, name: &str) -> Self {
        self.kind("Sequence").name(name)
    }

    pub fn is_literal(self, text: &str) -> Self {
        self.kind("Literal").text(text)
    }

    pub fn is_value(self, text: &str) -> Self {
        self.kind("Value").text(text)
    }

    pub fn is_block(self, text: &str) -> Self {
        self.kind("Block").text(text)
    }

    pub fn is_named_block(self, keyword: &str, condition: &str) -> Self {
        self.kind("NamedBlock").name(keyword).text(condition)
    }

    pub fn is_empty(self) -> Self {
        self.kind("Empty")
    }

    pub fn child_count(self, expected: usize) -> Self {
        let children = self.node.children();
        assert_eq!(
            children.len(),
            expected,
            "{}: Expected {} children, found {} children: [{}]",
            self.context,
            expected,
            children.len(),
            summarize_children(children)
        );
        self
    }

    /// Assert on a specific child by index
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.node.children();
        assert!(
            index < children.len(),
            "{}: Child index {} out of bounds (node has {} children)",
            self.context,
            index,
            children.len()
        );
        assertion(NodeAssertion {
            node: &children[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert on the body of a named block
    pub fn body<F>(self, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        match self.node {
            Node::NamedBlock { body, .. } => assertion(NodeAssertion {
                node: body,
                context: format!("{}.body", self.context),
            }),
            other => panic!(
                "{}: Expected NamedBlock, found {}",
                self.context,
                other.node_type()
            ),
        }
        self
    }
}
