//! Data formats: the syntax tree as JSON or YAML

use super::registry::{FormatError, Formatter};
use crate::pipeline::CompiledTemplate;

/// Pretty-printed JSON of the tree.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        serde_json::to_string_pretty(&template.ast).map_err(|e| FormatError::serialization("json", e))
    }

    fn description(&self) -> &str {
        "Syntax tree as JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        serde_yaml::to_string(&template.ast).map_err(|e| FormatError::serialization("yaml", e))
    }

    fn description(&self) -> &str {
        "Syntax tree as YAML"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_json_uses_kind_tag() {
        let template = CompiledTemplate::from_ast(Node::value("expression", "Name"));
        let json = JsonFormatter.serialize(&template).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "value");
        assert_eq!(value["name"], "expression");
        assert_eq!(value["text"], "Name");
    }

    #[test]
    fn test_yaml_named_block() {
        let template = CompiledTemplate::from_ast(Node::named_block(
            "if",
            "(x)",
            Node::literal("content", "A"),
        ));
        let yaml = YamlFormatter.serialize(&template).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["kind"], serde_yaml::Value::from("named_block"));
        assert_eq!(value["body"]["text"], serde_yaml::Value::from("A"));
    }
}
