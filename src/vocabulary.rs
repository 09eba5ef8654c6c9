//! Stereotype and tag vocabulary
//!
//! Names the generator looks for on model elements, and the profile that
//! qualifies stereotypes when they are written back to the model.

use serde::{Deserialize, Serialize};

pub const PROFILE: &str = "JSON";
pub const SCHEMA_ROOT: &str = "JSONSchema";
pub const ELEMENT: &str = "JSONElement";
pub const DATA_TYPE: &str = "JSONDatatype";
pub const ATTRIBUTE: &str = "JSONProperty";
pub const OUTPUT_FILE_TAG: &str = "schemaFileName";
pub const DIALECT_TAG: &str = "schema";
pub const IDENTIFIER_TAG: &str = "id";

/// Configurable stereotype and tag names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_schema_root")]
    pub schema_root: String,
    #[serde(default = "default_element")]
    pub element: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default = "default_attribute")]
    pub attribute: String,
    #[serde(default = "default_output_file_tag")]
    pub output_file_tag: String,
    #[serde(default = "default_dialect_tag")]
    pub dialect_tag: String,
    #[serde(default = "default_identifier_tag")]
    pub identifier_tag: String,
}

fn default_profile() -> String {
    PROFILE.to_string()
}

fn default_schema_root() -> String {
    SCHEMA_ROOT.to_string()
}

fn default_element() -> String {
    ELEMENT.to_string()
}

fn default_data_type() -> String {
    DATA_TYPE.to_string()
}

fn default_attribute() -> String {
    ATTRIBUTE.to_string()
}

fn default_output_file_tag() -> String {
    OUTPUT_FILE_TAG.to_string()
}

fn default_dialect_tag() -> String {
    DIALECT_TAG.to_string()
}

fn default_identifier_tag() -> String {
    IDENTIFIER_TAG.to_string()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            schema_root: default_schema_root(),
            element: default_element(),
            data_type: default_data_type(),
            attribute: default_attribute(),
            output_file_tag: default_output_file_tag(),
            dialect_tag: default_dialect_tag(),
            identifier_tag: default_identifier_tag(),
        }
    }
}

impl Vocabulary {
    /// `Profile::Stereotype`
    pub fn qualified(&self, stereotype: &str) -> String {
        format!("{}::{}", self.profile, stereotype)
    }
}
