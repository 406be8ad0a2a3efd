//! Instruction listing
//!
//! One instruction per line, indented two spaces per open block:
//!
//! ```text
//! block_open if (X)
//!   append_literal "A"
//! block_close
//! ```

use super::registry::{FormatError, Formatter};
use crate::emit::Instruction;
use crate::pipeline::CompiledTemplate;

pub fn to_instruction_listing(instructions: &[Instruction]) -> String {
    let mut output = String::new();
    let mut depth = 0usize;
    for instruction in instructions {
        if *instruction == Instruction::BlockClose {
            depth = depth.saturating_sub(1);
        }
        output.push_str(&format!("{}{}\n", "  ".repeat(depth), instruction));
        if let Instruction::BlockOpen(_) = instruction {
            depth += 1;
        }
    }
    output
}

pub struct InstructionsFormatter;

impl Formatter for InstructionsFormatter {
    fn name(&self) -> &str {
        "instructions"
    }

    fn serialize(&self, template: &CompiledTemplate) -> Result<String, FormatError> {
        Ok(to_instruction_listing(&template.instructions))
    }

    fn description(&self) -> &str {
        "Flattened render instructions, one per line"
    }
}
