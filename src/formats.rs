//! Output formats for compiled templates
//!
//! This module contains the format implementations for serializing a compiled template:
//! - the syntax tree (treeviz, tag, json, yaml)
//! - the flattened instructions (instructions)
//! - the generated render routine (csharp, rust)

pub mod data;
pub mod instructions;
pub mod registry;
pub mod source;
pub mod tag;
pub mod treeviz;

pub use data::{JsonFormatter, YamlFormatter};
pub use instructions::{to_instruction_listing, InstructionsFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use source::SourceFormatter;
pub use tag::{serialize_tree as serialize_ast_tag, TagFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
