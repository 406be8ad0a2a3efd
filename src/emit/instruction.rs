//! Flattening of a template tree into render instructions
//!
//! A depth-first walk over the [`Node`] tree. Leaves become one instruction each, named blocks
//! become a `BlockOpen`, the instructions of their body and a `BlockClose`. The nesting of
//! block instructions mirrors the nesting of named blocks exactly.

use crate::ast::Node;
use serde::Serialize;
use std::fmt;

/// One step of a render routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "text", rename_all = "snake_case")]
pub enum Instruction {
    /// Append text verbatim. Targets escape it for their literal syntax.
    AppendLiteral(String),
    /// Append the value of an expression.
    AppendExpression(String),
    /// Run statements.
    RawStatement(String),
    /// Open a control block; the text is the block header, e.g. `if (x)` or `else`.
    BlockOpen(String),
    BlockClose,
}

impl Instruction {
    /// Change in block depth caused by this instruction.
    pub fn depth_delta(&self) -> isize {
        match self {
            Instruction::BlockOpen(_) => 1,
            Instruction::BlockClose => -1,
            _ => 0,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AppendLiteral(text) => write!(f, "append_literal {:?}", text),
            Instruction::AppendExpression(text) => write!(f, "append_expression {}", text),
            Instruction::RawStatement(text) => write!(f, "raw_statement {}", text.trim()),
            Instruction::BlockOpen(header) => write!(f, "block_open {}", header),
            Instruction::BlockClose => write!(f, "block_close"),
        }
    }
}

/// Header of a block: the keyword alone when the condition is blank.
pub fn block_header(keyword: &str, condition: &str) -> String {
    if condition.trim().is_empty() {
        keyword.to_string()
    } else {
        format!("{} {}", keyword, condition)
    }
}

/// Flatten a tree into the ordered instructions of its render routine.
pub fn flatten(node: &Node) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    flatten_into(node, &mut instructions);
    instructions
}

fn flatten_into(node: &Node, out: &mut Vec<Instruction>) {
    match node {
        Node::Sequence { children, .. } => {
            for child in children {
                flatten_into(child, out);
            }
        }
        Node::Literal { text, .. } => out.push(Instruction::AppendLiteral(text.clone())),
        Node::Value { text, .. } => out.push(Instruction::AppendExpression(text.clone())),
        Node::Block { text, .. } => out.push(Instruction::RawStatement(text.clone())),
        Node::NamedBlock {
            keyword,
            condition,
            body,
        } => {
            out.push(Instruction::BlockOpen(block_header(keyword, condition)));
            flatten_into(body, out);
            out.push(Instruction::BlockClose);
        }
        Node::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_concatenated_in_order() {
        let tree = Node::sequence(
            "template",
            vec![
                Node::literal("content", "Hello "),
                Node::value("expression", "Name"),
                Node::literal("content", "!"),
            ],
        );
        assert_eq!(
            flatten(&tree),
            vec![
                Instruction::AppendLiteral("Hello ".to_string()),
                Instruction::AppendExpression("Name".to_string()),
                Instruction::AppendLiteral("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_named_block_is_bracketed() {
        let tree = Node::named_block("if", "(X)", Node::literal("content", "A"));
        assert_eq!(
            flatten(&tree),
            vec![
                Instruction::BlockOpen("if (X)".to_string()),
                Instruction::AppendLiteral("A".to_string()),
                Instruction::BlockClose,
            ]
        );
    }

    #[test]
    fn test_blank_condition_yields_keyword_only() {
        assert_eq!(block_header("else", ""), "else");
        assert_eq!(block_header("else", "  "), "else");
        assert_eq!(block_header("else if", "(y)"), "else if (y)");
    }

    #[test]
    fn test_empty_yields_nothing() {
        assert!(flatten(&Node::Empty).is_empty());
        let tree = Node::named_block("if", "(x)", Node::Empty);
        assert_eq!(flatten(&tree).len(), 2);
    }

    #[test]
    fn test_statement_text_is_passed_through() {
        let tree = Node::block("statements", " var x = \"@\"; ");
        assert_eq!(
            flatten(&tree),
            vec![Instruction::RawStatement(" var x = \"@\"; ".to_string())]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Instruction::AppendLiteral("a\"b\n".to_string()).to_string(),
            "append_literal \"a\\\"b\\n\""
        );
        assert_eq!(Instruction::BlockClose.to_string(), "block_close");
    }

    #[test]
    fn test_serializes_with_op_tag() {
        let json = serde_json::to_string(&vec![
            Instruction::BlockOpen("else".to_string()),
            Instruction::BlockClose,
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"[{"op":"block_open","text":"else"},{"op":"block_close"}]"#
        );
    }
}
