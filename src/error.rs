//! Error types for schema generation

use thiserror::Error;

use crate::model::ModelError;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema generation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("The root element {element} should have the «{stereotype}» stereotype")]
    MissingStereotype { element: String, stereotype: String },

    #[error("Root element {element} has no '{tag}' tagged value")]
    MissingTag { element: String, tag: String },

    #[error("Tagged value '{tag}' is not a valid URI: {value}")]
    InvalidUri {
        tag: String,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SchemaError {
    /// Whether this error was raised while validating the root element,
    /// before any traversal took place.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SchemaError::MissingStereotype { .. }
                | SchemaError::MissingTag { .. }
                | SchemaError::InvalidUri { .. }
        )
    }
}
