//! # gillette
//!
//! A compiler for text templates with embedded code.
//!
//! Templates are plain text (or RTF documents) in which `@` starts a code section:
//!
//! ```text
//! Dear @Model.Name,
//! @foreach (var item in Model.Items) {
//!   - @item.Title: @(item.Price * item.Quantity)
//! }
//! @{ var total = Model.Total; }Total: @total
//! ```
//!
//! A template is parsed into a [`Node`] tree, flattened into render
//! [`Instruction`](emit::Instruction)s and rendered as the source of a routine that takes the
//! model and returns the output text. Compiling and running that routine is left to the
//! toolchain of the target language.
//!
//! ## Modules
//!
//! - [`parsing`]: the combinator engine and the template grammar
//! - [`emit`]: flattening and target-language rendering
//! - [`formats`]: output formats for compiled templates
//! - [`pipeline`]: parse → flatten → serialize in one call
//! - [`config`]: layered configuration
//!
//! ## Testing
//!
//! Tree assertions for tests live in the [testing module](testing).

mod tracing_macros;

pub mod ast;
pub mod config;
pub mod emit;
pub mod formats;
pub mod parsing;
pub mod pipeline;
pub mod testing;

pub use ast::Node;
pub use emit::{flatten_and_emit, Instruction};
pub use parsing::{parse, ParseError};
pub use pipeline::{precompile, CompiledTemplate, TemplateCompiler};
