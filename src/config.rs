//! Configuration loader.
//!
//! `defaults/gillette.default.toml` is embedded into the binary so that the documented
//! defaults and runtime behavior stay in sync. Callers layer user files and CLI overrides on
//! top of those defaults via [`Loader`] before deserializing into [`GilletteConfig`].

use crate::emit::{EmitOptions, ModelDescriptor};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/gillette.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GilletteConfig {
    pub model: ModelConfig,
    pub emit: EmitOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub type_name: String,
}

impl ModelConfig {
    pub fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::from_type_name(&self.type_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<GilletteConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GilletteConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.model.type_name, "object");
        assert!(config.model.descriptor().is_dynamic());
        assert_eq!(config.emit, EmitOptions::default());
        assert_eq!(config.output.format, "treeviz");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("model.type_name", "Shop.Order")
            .expect("override to apply")
            .set_override("emit.include_namespaces", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.model.descriptor().short_name(), "Order");
        assert!(config.emit.include_namespaces);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[emit]\nbuilder_variable = \"sb\"\n\n[output]\nformat = \"csharp\"").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.emit.builder_variable, "sb");
        assert_eq!(config.emit.indent, "    ");
        assert_eq!(config.output.format, "csharp");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/gillette.toml").build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/gillette.toml")
            .build()
            .unwrap();
        assert_eq!(config.output.format, "treeviz");
    }
}
