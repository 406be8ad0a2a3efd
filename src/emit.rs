//! Emission of render routines
//!
//! Turns a parsed template into target-language source:
//! 1. **Flattening**: the tree becomes an ordered list of [`Instruction`]s
//! 2. **Rendering**: a [`Target`] writes the instructions as the body of a routine that takes
//!    the model and returns the output text
//!
//! Nothing here compiles or runs the generated source.

pub mod instruction;
pub mod model;
pub mod target;

pub use instruction::{block_header, flatten, Instruction};
pub use model::ModelDescriptor;
pub use target::{target_by_name, CSharpTarget, EmitOptions, RustTarget, Target};

use crate::ast::Node;

/// Flatten `ast` and render it as a routine for `target`.
pub fn flatten_and_emit(
    ast: &Node,
    model: &ModelDescriptor,
    target: &dyn Target,
    options: &EmitOptions,
) -> String {
    let instructions = flatten(ast);
    crate::trace!(
        count = instructions.len(),
        target = target.name(),
        "emitting render routine"
    );
    target.render(&instructions, model, options)
}
