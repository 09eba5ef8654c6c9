//! UML Schemas
//!
//! Generates JSON Schema documents from UML class models: classes, data
//! types, enumerations, attributes with multiplicity, tagged-value facets and
//! stereotype markers.
//!
//! ## Pipeline
//!
//! ```text
//! SchemaGenerator            (root checks, $schema / $id / title / description)
//! └── SchemaBuilder          (class -> object with properties / required)
//!     ├── build_property     (scalar, array or inlined class per attribute)
//!     ├── TypeMapper         (class / enumeration / primitive data type)
//!     ├── facets             (tagged values -> constraints)
//!     └── DefinitionRegistry (shared `definitions` block)
//!
//! MetadataStamper            (separate pass: stereotypes onto a package tree)
//! ```
//!
//! The model is read and written through the [`ModelReader`] and
//! [`ModelWriter`] ports; [`InMemoryModel`] implements both.

pub mod builder;
pub mod config;
pub mod definitions;
pub mod error;
pub mod facets;
pub mod generator;
pub mod model;
pub mod schema;
pub mod sink;
pub mod stamp;
pub mod types;
pub mod vocabulary;

pub use builder::SchemaBuilder;
pub use config::{GeneratorConfig, OutputFormat};
pub use definitions::{DefinitionRegistry, KeyScheme, KeySource};
pub use error::{Result, SchemaError};
pub use facets::{apply_facets, Facets};
pub use generator::{generate_schema, GeneratorOptions, SchemaGenerator};
pub use model::{
    Attribute, Element, ElementBody, ElementId, InMemoryModel, Literal, ModelError, ModelReader,
    ModelWriter, Multiplicity, TaggedValue, Upper,
};
pub use schema::{Bound, BoundStyle, JsonType, SchemaDocument, SchemaNode};
pub use sink::{resolve_output_path, FileSink, OutputSink, StdoutSink};
pub use stamp::{stamp, MetadataStamper, StampReport};
pub use types::{PrimitiveRule, PrimitiveTable, TypeMapper};
pub use vocabulary::Vocabulary;
