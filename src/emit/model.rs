//! Model type naming
//!
//! A render routine takes one argument, the model. Targets need two names for its type: the
//! qualified name for the parameter, and a short name usable as part of an identifier (the
//! generated type is called `{short}Template`).

use serde::Serialize;

/// Short name used when the model type cannot be named.
pub const DYNAMIC_SHORT_NAME: &str = "Dynamic";

/// Names of the type a template is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    qualified_name: String,
    short_name: String,
    dynamic: bool,
}

impl ModelDescriptor {
    /// A model whose type is not known when the template is compiled.
    pub fn dynamic() -> Self {
        Self {
            qualified_name: "dynamic".to_string(),
            short_name: DYNAMIC_SHORT_NAME.to_string(),
            dynamic: true,
        }
    }

    /// Derive both names from a type name as written in the host language.
    ///
    /// - nested types written `Outer+Inner` become `Outer.Inner`
    /// - the short name is the last path segment, with `[]` spelled `Array`
    /// - `object`, anonymous types and anything that does not yield an identifier map to
    ///   [`ModelDescriptor::dynamic`]
    pub fn from_type_name(type_name: &str) -> Self {
        let name = type_name.trim();
        if matches!(name, "" | "object" | "dynamic" | "System.Object") {
            return Self::dynamic();
        }

        let qualified_name = name.replace('+', ".");
        let (path, arrays) = strip_array_suffixes(&qualified_name);
        let segments: Vec<&str> = path.split('.').collect();
        if !segments.iter().all(|s| is_identifier(s)) {
            return Self::dynamic();
        }

        let last = segments.last().copied().unwrap_or_default();
        Self {
            short_name: format!("{}{}", last, "Array".repeat(arrays)),
            qualified_name,
            dynamic: false,
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

impl Default for ModelDescriptor {
    fn default() -> Self {
        Self::dynamic()
    }
}

fn strip_array_suffixes(name: &str) -> (&str, usize) {
    let mut path = name;
    let mut count = 0;
    while let Some(rest) = path.strip_suffix("[]") {
        path = rest;
        count += 1;
    }
    (path, count)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}
