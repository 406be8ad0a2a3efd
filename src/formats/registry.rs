//! Output formats by name
//!
//! The CLI's `--format` flag and [`TemplateCompiler::compile_and_serialize`] look formats up
//! here. Names are kept in sorted order so listings are stable.
//!
//! [`TemplateCompiler::compile_and_serialize`]: crate::pipeline::TemplateCompiler::compile_and_serialize

use crate::pipeline::CompiledTemplate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No format is registered under `name`.
    UnknownFormat { name: String, available: Vec<String> },
    /// A data format could not encode the template.
    Serialization { format: String, message: String },
}

impl FormatError {
    pub fn serialization(format: &str, err: impl fmt::Display) -> Self {
        FormatError::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownFormat { name, available } => write!(
                f,
                "unknown format '{}' (available: {})",
                name,
                available.join(", ")
            ),
            FormatError::Serialization { format, message } => {
                write!(f, "cannot write {}: {}", format, message)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// One way of writing out a compiled template.
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError>;

    /// One line shown by `gillette list-formats`.
    fn description(&self) -> &str {
        ""
    }
}

pub struct FormatRegistry {
    formatters: BTreeMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// A registry with no formats at all.
    pub fn empty() -> Self {
        Self {
            formatters: BTreeMap::new(),
        }
    }

    /// Tree views, data dumps, the instruction listing and both source targets.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(super::TreevizFormatter);
        registry.register(super::TagFormatter);
        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);
        registry.register(super::InstructionsFormatter);
        registry.register(super::SourceFormatter::csharp());
        registry.register(super::SourceFormatter::rust());
        registry
    }

    /// Add `formatter`, replacing any format of the same name.
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Formatter, FormatError> {
        self.formatters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::UnknownFormat {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn render(&self, template: &CompiledTemplate, format: &str) -> Result<String, FormatError> {
        self.lookup(format)?.serialize(template)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.formatters.keys().cloned().collect()
    }

    /// `(name, description)` pairs in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.formatters
            .iter()
            .map(|(name, f)| (name.as_str(), f.description()))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
