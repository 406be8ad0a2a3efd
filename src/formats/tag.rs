//! XML-like tree serialization
//!
//! Serializes a template tree to an XML-like format that directly reflects its structure.
//!
//! ## Format
//!
//! - Rule name → tag name (`content`, `expression`, `statements`, `template`, ...)
//! - Leaf text → text content
//! - Named block → `named-block` tag, header as text content, body nested
//! - Children → nested tags (no wrapper)
//!
//! ## Example
//!
//! ```text
//! <document>
//!   <block-chain>
//!     <named-block>if (X)
//!       <content>A</content>
//!     </named-block>
//!   </block-chain>
//! </document>
//! ```

use super::registry::{FormatError, Formatter};
use crate::ast::Node;
use crate::pipeline::CompiledTemplate;

struct TagSerializer {
    output: String,
    indent_level: usize,
}

impl TagSerializer {
    fn indent(&self) -> String {
        "  ".repeat(self.indent_level)
    }

    fn push_indent(&mut self, s: &str) {
        self.output.push_str(&self.indent());
        self.output.push_str(s);
    }

    fn open_tag(&mut self, tag: &str) {
        self.push_indent(&format!("<{tag}>"));
    }

    fn tag_with_text(&mut self, tag: &str, text: &str) {
        self.push_indent(&format!("<{tag}>{}</{}>\n", escape_xml(text), tag));
    }

    fn close_tag_inline(&mut self, tag: &str) {
        self.output.push_str(&format!("</{tag}>"));
    }

    fn nested(&mut self, children: &[Node]) {
        self.output.push('\n');
        self.indent_level += 1;
        for child in children {
            self.visit(child);
        }
        self.indent_level -= 1;
        self.push_indent("");
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::Sequence { name, children } => {
                self.open_tag(name);
                if !children.is_empty() {
                    self.nested(children);
                }
                self.close_tag_inline(name);
                self.output.push('\n');
            }
            Node::Literal { name, text }
            | Node::Value { name, text }
            | Node::Block { name, text } => self.tag_with_text(name, text),
            Node::NamedBlock { .. } => {
                self.open_tag("named-block");
                self.output.push_str(&escape_xml(&node.display_label()));
                self.nested(node.children());
                self.close_tag_inline("named-block");
                self.output.push('\n');
            }
            Node::Empty => self.push_indent("<empty/>\n"),
        }
    }
}

/// Serialize a tree to tag format
pub fn serialize_tree(node: &Node) -> String {
    let mut serializer = TagSerializer {
        output: String::new(),
        indent_level: 1,
    };
    serializer.visit(node);

    format!("<document>\n{}</document>", serializer.output)
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Formatter implementation for tag format
pub struct TagFormatter;

impl Formatter for TagFormatter {
    fn name(&self) -> &str {
        "tag"
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        Ok(serialize_tree(&template.ast))
    }

    fn description(&self) -> &str {
        "XML-like tag format reflecting the tree structure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_sequence() {
        let tree = Node::sequence(
            "template",
            vec![
                Node::literal("content", "<b>"),
                Node::value("expression", "Name"),
            ],
        );
        assert_eq!(
            serialize_tree(&tree),
            "<document>\n  <template>\n    <content>&lt;b&gt;</content>\n    <expression>Name</expression>\n  </template>\n</document>"
        );
    }

    #[test]
    fn test_serialize_named_block() {
        let tree = Node::named_block("if", "(a && b)", Node::Empty);
        let result = serialize_tree(&tree);
        assert!(result.contains("<named-block>if (a &amp;&amp; b)\n"));
        assert!(result.contains("    <empty/>\n  </named-block>\n"));
    }

    #[test]
    fn test_serialize_empty_template() {
        assert_eq!(serialize_tree(&Node::Empty), "<document>\n  <empty/>\n</document>");
    }
}
