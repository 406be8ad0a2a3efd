//! Treeviz formatter for template trees
//!
//! One line per node, nesting drawn with box connectors:
//!
//! ```text
//! ☰ template (3 items)
//! ├─ ◦ Hello
//! ├─ ƒ Name
//! └─ ◦ !
//! ```
//!
//! Icons
//!     Sequence: ☰
//!     Literal: ◦
//!     Value: ƒ
//!     Block: ¶
//!     NamedBlock: §
//!     Empty: ∅
//!
//! Labels are truncated to 30 characters.

use super::registry::{FormatError, Formatter};
use crate::ast::Node;
use crate::pipeline::CompiledTemplate;

const MAX_LABEL: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

/// Get the icon for a node type
fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Sequence" => "☰",
        "Literal" => "◦",
        "Value" => "ƒ",
        "Block" => "¶",
        "NamedBlock" => "§",
        "Empty" => "∅",
        _ => "○",
    }
}

fn line(node: &Node) -> String {
    let label = match node {
        Node::Literal { .. } | Node::Value { .. } | Node::Block { .. } => {
            format!("{} {}", node.name(), truncate(&node.display_label(), MAX_LABEL))
        }
        _ => truncate(&node.display_label(), MAX_LABEL),
    };
    let icon = get_icon(node.node_type());
    if label.is_empty() {
        icon.to_string()
    } else {
        format!("{} {}", icon, label)
    }
}

fn format_node(node: &Node, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!("{}{} {}\n", prefix, connector, line(node)));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    format_children(node, &child_prefix, output);
}

fn format_children(node: &Node, prefix: &str, output: &mut String) {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        format_node(child, prefix, i == children.len() - 1, output);
    }
}

pub fn to_treeviz_str(node: &Node) -> String {
    let mut output = format!("{}\n", line(node));
    format_children(node, "", &mut output);
    output
}

/// Formatter implementation for treeviz format
pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        Ok(to_treeviz_str(&template.ast))
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treeviz_chain() {
        let tree = Node::sequence(
            "block-chain",
            vec![
                Node::named_block("if", "(X)", Node::literal("content", "A")),
                Node::named_block("else", "", Node::Empty),
            ],
        );
        insta::assert_snapshot!(to_treeviz_str(&tree), @r"
        ☰ block-chain (2 items)
        ├─ § if (X)
        │ └─ ◦ content A
        └─ § else
          └─ ∅
        ");
    }

    #[test]
    fn test_treeviz_escapes_and_truncates() {
        let text = format!("line\n{}", "x".repeat(40));
        let output = to_treeviz_str(&Node::literal("content", &text));
        assert_eq!(
            output,
            format!("◦ content line\\n{}...\n", "x".repeat(24))
        );
    }
}
