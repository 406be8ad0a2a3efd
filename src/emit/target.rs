//! Target languages for render routines
//!
//! A [`Target`] turns the instruction list into the source of one routine that takes the
//! model and returns the rendered text. Expressions and statements are copied through
//! untouched; only literal text is escaped. Whether the result compiles is up to the
//! toolchain of the target language.

use super::instruction::Instruction;
use super::model::ModelDescriptor;
use serde::{Deserialize, Serialize};

/// Indentation depth of the routine body inside the generated type.
const BODY_DEPTH: usize = 2;

const CSHARP_NAMESPACES: &str = "using System;
using System.Linq;
using System.Text;
using System.Collections.Generic;

";

const RUST_PRELUDE: &str = "#[allow(unused_imports)]
use std::fmt::Write as _;

";

/// Knobs shared by all targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Prepend the target's usual imports.
    pub include_namespaces: bool,
    /// Name of the variable output is accumulated in.
    pub builder_variable: String,
    /// One level of indentation.
    pub indent: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            include_namespaces: false,
            builder_variable: "builder".to_string(),
            indent: "    ".to_string(),
        }
    }
}

pub trait Target: Send + Sync {
    /// The name of this target (e.g., "csharp")
    fn name(&self) -> &str;

    /// Type of the model parameter.
    fn model_type(&self, model: &ModelDescriptor) -> String;

    /// One instruction as a single statement of the routine body.
    fn statement(&self, instruction: &Instruction, builder: &str) -> String;

    /// Wrap the indented routine body in the surrounding type and routine.
    fn wrap(&self, body: &str, model: &ModelDescriptor, options: &EmitOptions) -> String;

    /// Render a complete routine.
    fn render(
        &self,
        instructions: &[Instruction],
        model: &ModelDescriptor,
        options: &EmitOptions,
    ) -> String {
        let mut body = String::new();
        let mut depth = 0usize;
        for instruction in instructions {
            if *instruction == Instruction::BlockClose {
                depth = depth.saturating_sub(1);
            }
            body.push_str(&options.indent.repeat(BODY_DEPTH + depth));
            body.push_str(&self.statement(instruction, &options.builder_variable));
            body.push('\n');
            if let Instruction::BlockOpen(_) = instruction {
                depth += 1;
            }
        }
        self.wrap(&body, model, options)
    }
}

/// C# static class with a `TransformText(Model)` method built on `StringBuilder`.
pub struct CSharpTarget;

impl Target for CSharpTarget {
    fn name(&self) -> &str {
        "csharp"
    }

    fn model_type(&self, model: &ModelDescriptor) -> String {
        model.qualified_name().to_string()
    }

    fn statement(&self, instruction: &Instruction, builder: &str) -> String {
        match instruction {
            // verbatim string: only the quote needs escaping, by doubling it
            Instruction::AppendLiteral(text) => {
                format!("{}.Append(@\"{}\");", builder, text.replace('"', "\"\""))
            }
            Instruction::AppendExpression(expr) => format!("{}.Append({});", builder, expr),
            Instruction::RawStatement(code) => code.trim().to_string(),
            Instruction::BlockOpen(header) => format!("{} {{", header),
            Instruction::BlockClose => "}".to_string(),
        }
    }

    fn wrap(&self, body: &str, model: &ModelDescriptor, options: &EmitOptions) -> String {
        let prelude = if options.include_namespaces {
            CSHARP_NAMESPACES
        } else {
            ""
        };
        let short = model.short_name();
        let model_type = self.model_type(model);
        let i = &options.indent;
        let b = &options.builder_variable;
        format!(
            "{prelude}static class {short}Template\n{{\n\
             {i}public static string TransformText({model_type} Model)\n\
             {i}{{\n\
             {i}{i}var {b} = new StringBuilder();\n\
             {body}\
             {i}{i}return {b}.ToString();\n\
             {i}}}\n\
             }}\n"
        )
    }
}

/// Rust unit struct with a `transform_text(Model)` function writing into a `String`.
pub struct RustTarget;

impl Target for RustTarget {
    fn name(&self) -> &str {
        "rust"
    }

    fn model_type(&self, model: &ModelDescriptor) -> String {
        if model.is_dynamic() {
            return "serde_json::Value".to_string();
        }
        let mut path = model.qualified_name();
        let mut slices = 0;
        while let Some(rest) = path.strip_suffix("[]") {
            path = rest;
            slices += 1;
        }
        format!(
            "{}{}{}",
            "[".repeat(slices),
            path.replace('.', "::"),
            "]".repeat(slices)
        )
    }

    fn statement(&self, instruction: &Instruction, builder: &str) -> String {
        match instruction {
            Instruction::AppendLiteral(text) => {
                let hashes = "#".repeat(raw_string_hashes(text));
                format!("{}.push_str(r{}\"{}\"{});", builder, hashes, text, hashes)
            }
            Instruction::AppendExpression(expr) => {
                format!("{}.push_str(&({}).to_string());", builder, expr)
            }
            Instruction::RawStatement(code) => code.trim().to_string(),
            Instruction::BlockOpen(header) => format!("{} {{", header),
            Instruction::BlockClose => "}".to_string(),
        }
    }

    fn wrap(&self, body: &str, model: &ModelDescriptor, options: &EmitOptions) -> String {
        let prelude = if options.include_namespaces {
            RUST_PRELUDE
        } else {
            ""
        };
        let short = model.short_name();
        let model_type = self.model_type(model);
        let i = &options.indent;
        let b = &options.builder_variable;
        format!(
            "{prelude}pub struct {short}Template;\n\n\
             impl {short}Template {{\n\
             {i}#[allow(non_snake_case)]\n\
             {i}pub fn transform_text(Model: &{model_type}) -> String {{\n\
             {i}{i}let mut {b} = String::new();\n\
             {body}\
             {i}{i}{b}\n\
             {i}}}\n\
             }}\n"
        )
    }
}

/// Number of `#` a raw string literal needs to hold `text`.
fn raw_string_hashes(text: &str) -> usize {
    text.match_indices('"')
        .map(|(i, _)| text[i + 1..].chars().take_while(|&c| c == '#').count() + 1)
        .max()
        .unwrap_or(0)
}

/// Look up a built-in target by name.
pub fn target_by_name(name: &str) -> Option<Box<dyn Target>> {
    match name {
        "csharp" => Some(Box::new(CSharpTarget)),
        "rust" => Some(Box::new(RustTarget)),
        _ => None,
    }
}
