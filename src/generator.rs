//! Schema document assembly
//!
//! [`SchemaGenerator`] validates the root element up front (stereotype,
//! dialect and identifier URIs) and then builds a fresh [`SchemaDocument`]
//! on every call to [`SchemaGenerator::generate`].

use tracing::info;
use url::Url;

use crate::builder::SchemaBuilder;
use crate::definitions::KeyScheme;
use crate::error::{Result, SchemaError};
use crate::model::{Element, ElementId, ModelReader};
use crate::schema::SchemaDocument;
use crate::types::{PrimitiveTable, TypeMapper};
use crate::vocabulary::Vocabulary;

/// Knobs for one generator
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub vocabulary: Vocabulary,
    pub keys: KeyScheme,
    pub primitives: PrimitiveTable,
}

/// Generates the JSON Schema rooted at one model element
pub struct SchemaGenerator<'a, R: ModelReader> {
    model: &'a R,
    root: Element,
    dialect: Url,
    id: Url,
    mapper: TypeMapper,
    keys: KeyScheme,
}

impl<'a, R: ModelReader> SchemaGenerator<'a, R> {
    /// Fails with a configuration error when the root is not a schema root
    pub fn new(model: &'a R, root: &ElementId, options: GeneratorOptions) -> Result<Self> {
        let root = model.element(root)?;
        let vocabulary = &options.vocabulary;

        if !root.has_stereotype(&vocabulary.schema_root) {
            return Err(SchemaError::MissingStereotype {
                element: root.name.clone(),
                stereotype: vocabulary.schema_root.clone(),
            });
        }
        let dialect = uri_tag(&root, &vocabulary.dialect_tag)?;
        let id = uri_tag(&root, &vocabulary.identifier_tag)?;

        Ok(Self {
            model,
            root,
            dialect,
            id,
            mapper: TypeMapper::new(options.primitives),
            keys: options.keys,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// `$schema`
    pub fn dialect(&self) -> &Url {
        &self.dialect
    }

    /// `$id`
    pub fn id(&self) -> &Url {
        &self.id
    }

    /// Build the schema document
    pub fn generate(&self) -> Result<SchemaDocument> {
        let mut builder = SchemaBuilder::new(self.model, &self.mapper, self.keys);
        let root = builder.build_root(&self.root)?;
        let definitions = builder.finish().into_inner();

        info!(
            root = %self.root.name,
            properties = root.properties.len(),
            definitions = definitions.len(),
            "schema generated"
        );

        Ok(SchemaDocument {
            dialect: self.dialect.clone(),
            id: self.id.clone(),
            title: self.root.name.clone(),
            description: root_description(&self.root),
            root,
            definitions,
        })
    }
}

/// Validate and generate in one step
pub fn generate_schema<R: ModelReader>(
    model: &R,
    root: &ElementId,
    options: GeneratorOptions,
) -> Result<SchemaDocument> {
    SchemaGenerator::new(model, root, options)?.generate()
}

fn uri_tag(root: &Element, tag: &str) -> Result<Url> {
    let value = root.tag(tag).ok_or_else(|| SchemaError::MissingTag {
        element: root.name.clone(),
        tag: tag.to_string(),
    })?;
    Url::parse(value.trim()).map_err(|source| SchemaError::InvalidUri {
        tag: tag.to_string(),
        value: value.to_string(),
        source,
    })
}

/// `Version <v>` and the documentation text, one per line
fn root_description(root: &Element) -> Option<String> {
    let version = root
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("Version {v}"));
    let documentation = root
        .documentation
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let lines: Vec<String> = version.into_iter().chain(documentation).collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
