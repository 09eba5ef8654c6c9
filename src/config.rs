//! Configuration management for schema generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (uml-schemas.toml)
//! - Environment variables (UML_SCHEMAS__*)
//!
//! ## Example config file (uml-schemas.toml):
//! ```toml
//! [vocabulary]
//! profile = "JSON"
//! schema_root = "JSONSchema"
//! output_file_tag = "schemaFileName"
//!
//! [definitions]
//! array_items = "type_name"
//! single_reference = "attribute_name"
//!
//! [output]
//! format = "pretty"
//! directory = "schemas"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::definitions::KeyScheme;
use crate::error::{Result, SchemaError};
use crate::generator::GeneratorOptions;
use crate::vocabulary::Vocabulary;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Stereotype and tag names
    #[serde(default)]
    pub vocabulary: Vocabulary,

    /// Definitions key scheme
    #[serde(default)]
    pub definitions: KeyScheme,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory that relative output-file tags resolve against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn is_pretty(&self) -> bool {
        matches!(self, OutputFormat::Pretty)
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "uml-schemas.toml",
            ".uml-schemas.toml",
            "config/uml-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "uml-schemas", "uml-schemas") {
            let xdg_config = config_dir.config_dir().join("uml-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // UML_SCHEMAS__OUTPUT__FORMAT=compact
        builder = builder.add_source(
            Environment::with_prefix("UML_SCHEMAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("cannot serialize configuration: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the vocabulary can be written to and read back from a model.
    ///
    /// Names must be non-empty and free of whitespace and `::`. The four
    /// stereotypes and the three tags must each be distinct, otherwise the
    /// stamper and the generator cannot tell the roles apart.
    pub fn validate(&self) -> Result<()> {
        let v = &self.vocabulary;
        let names = [
            ("profile", &v.profile),
            ("schema_root", &v.schema_root),
            ("element", &v.element),
            ("data_type", &v.data_type),
            ("attribute", &v.attribute),
            ("output_file_tag", &v.output_file_tag),
            ("dialect_tag", &v.dialect_tag),
            ("identifier_tag", &v.identifier_tag),
        ];
        for (key, name) in names {
            if name.is_empty() || name.contains("::") || name.chars().any(char::is_whitespace) {
                return Err(invalid(format!("vocabulary.{key} is not a usable name: {name:?}")));
            }
        }

        distinct(
            "stereotype",
            [&v.schema_root, &v.element, &v.data_type, &v.attribute],
        )?;
        distinct("tag", [&v.output_file_tag, &v.dialect_tag, &v.identifier_tag])
    }

    /// Generator options derived from this configuration
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            vocabulary: self.vocabulary.clone(),
            keys: self.definitions,
            ..GeneratorOptions::default()
        }
    }
}

fn invalid(message: String) -> SchemaError {
    SchemaError::Config(ConfigError::Message(message))
}

/// Stereotype and tag names are matched case-insensitively
fn distinct<'a>(kind: &str, names: impl IntoIterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(invalid(format!("{kind} name {name:?} is used for more than one role")));
        }
    }
    Ok(())
}
