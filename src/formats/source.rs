//! Generated render routine source

use super::registry::{FormatError, Formatter};
use crate::emit::{CSharpTarget, RustTarget, Target};
use crate::pipeline::CompiledTemplate;

/// Renders the template's instructions through a [`Target`].
pub struct SourceFormatter {
    target: Box<dyn Target>,
}

impl SourceFormatter {
    pub fn new(target: Box<dyn Target>) -> Self {
        Self { target }
    }

    pub fn csharp() -> Self {
        Self::new(Box::new(CSharpTarget))
    }

    pub fn rust() -> Self {
        Self::new(Box::new(RustTarget))
    }
}

impl Formatter for SourceFormatter {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        Ok(self
            .target
            .render(&template.instructions, &template.model, &template.options))
    }

    fn description(&self) -> &str {
        "Render routine source for the target language"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_source_formatter_uses_target_name() {
        assert_eq!(SourceFormatter::csharp().name(), "csharp");
        assert_eq!(SourceFormatter::rust().name(), "rust");
    }

    #[test]
    fn test_source_formatter_renders_instructions() {
        let template = CompiledTemplate::from_ast(Node::value("expression", "Model.Total"));
        let source = SourceFormatter::csharp().serialize(&template).unwrap();
        assert!(source.contains("builder.Append(Model.Total);"));
    }
}
