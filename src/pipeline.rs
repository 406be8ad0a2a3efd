//! Template compilation API
//!
//! `TemplateCompiler` is the entry point used by the CLI and by library callers:
//! parse → flatten → serialize in a named output format.
//!
//! # Architecture
//!
//! - String-based methods are the core functionality (process template text)
//! - File-based methods are thin wrappers (read file, then call the string method)
//! - Serialization is delegated to the [`FormatRegistry`]
//!
//! # Examples
//!
//! ```rust,ignore
//! use gillette::pipeline::TemplateCompiler;
//!
//! let compiler = TemplateCompiler::new();
//! let compiled = compiler.compile("Hello @Model.Name!")?;
//! let source = compiler.compile_and_serialize("Hello @Model.Name!", "csharp")?;
//! ```

use crate::ast::Node;
use crate::config::GilletteConfig;
use crate::emit::{flatten, flatten_and_emit, EmitOptions, Instruction, ModelDescriptor, Target};
use crate::formats::{FormatError, FormatRegistry};
use crate::parsing::{self, ParseError};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// A parsed template together with everything needed to emit it.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledTemplate {
    pub ast: Node,
    pub instructions: Vec<Instruction>,
    pub model: ModelDescriptor,
    pub options: EmitOptions,
}

impl CompiledTemplate {
    /// Bind a tree to the dynamic model with default emit options.
    pub fn from_ast(ast: Node) -> Self {
        Self::new(ast, ModelDescriptor::dynamic(), EmitOptions::default())
    }

    pub fn new(ast: Node, model: ModelDescriptor, options: EmitOptions) -> Self {
        let instructions = flatten(&ast);
        Self {
            ast,
            instructions,
            model,
            options,
        }
    }
}

/// Error that can occur while compiling a template
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Format(FormatError),
    Io(std::io::Error),
    Config(config::ConfigError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Format(e) => write!(f, "{}", e),
            CompileError::Io(e) => write!(f, "I/O error: {}", e),
            CompileError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(e) => Some(e),
            CompileError::Format(e) => Some(e),
            CompileError::Io(e) => Some(e),
            CompileError::Config(e) => Some(e),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<FormatError> for CompileError {
    fn from(err: FormatError) -> Self {
        CompileError::Format(err)
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Io(err)
    }
}

impl From<config::ConfigError> for CompileError {
    fn from(err: config::ConfigError) -> Self {
        CompileError::Config(err)
    }
}

/// Compiles templates against one model type with one set of emit options.
pub struct TemplateCompiler {
    model: ModelDescriptor,
    options: EmitOptions,
    registry: FormatRegistry,
}

impl TemplateCompiler {
    /// A compiler for the dynamic model with default options.
    pub fn new() -> Self {
        Self::with_model(ModelDescriptor::dynamic(), EmitOptions::default())
    }

    pub fn with_model(model: ModelDescriptor, options: EmitOptions) -> Self {
        Self {
            model,
            options,
            registry: FormatRegistry::with_defaults(),
        }
    }

    /// A compiler set up from the `[model]` and `[emit]` configuration sections.
    pub fn from_config(config: &GilletteConfig) -> Self {
        Self::with_model(config.model.descriptor(), config.emit.clone())
    }

    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Names of all output formats.
    pub fn formats(&self) -> Vec<String> {
        self.registry.names()
    }

    // ===== STRING-BASED PROCESSING =====

    /// Parse and flatten a template.
    pub fn compile(&self, source: &str) -> Result<CompiledTemplate, CompileError> {
        let ast = parsing::parse(source)?;
        Ok(CompiledTemplate::new(
            ast,
            self.model.clone(),
            self.options.clone(),
        ))
    }

    /// Compile a template and serialize it in the named format.
    pub fn compile_and_serialize(&self, source: &str, format: &str) -> Result<String, CompileError> {
        let compiled = self.compile(source)?;
        Ok(self.registry.render(&compiled, format)?)
    }

    // ===== FILE-BASED PROCESSING =====

    pub fn load_and_compile(&self, path: impl AsRef<Path>) -> Result<CompiledTemplate, CompileError> {
        let source = fs::read_to_string(path)?;
        self.compile(&source)
    }

    pub fn load_and_serialize(
        &self,
        path: impl AsRef<Path>,
        format: &str,
    ) -> Result<String, CompileError> {
        let source = fs::read_to_string(path)?;
        self.compile_and_serialize(&source, format)
    }
}

impl Default for TemplateCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate render routine source for a template without compiling it.
pub fn precompile(
    source: &str,
    model: &ModelDescriptor,
    target: &dyn Target,
    options: &EmitOptions,
) -> Result<String, ParseError> {
    let ast = parsing::parse(source)?;
    Ok(flatten_and_emit(&ast, model, target, options))
}
