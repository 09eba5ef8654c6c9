//! Type mapping
//!
//! Classifies a model type into a JSON Schema base type. Classes become
//! objects, enumerations become string enums, and data types are looked up by
//! name in a [`PrimitiveTable`]. A data type with an unknown name inherits the
//! mapping of its first generalization; when the chain runs out the node is
//! left untyped.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::Result;
use crate::facets::apply_facets;
use crate::model::{Element, ElementBody, ElementId, ModelError, ModelReader};
use crate::schema::{Bound, JsonType, SchemaNode};

/// ISO 8601 duration (`P1Y2M3DT4H5M6.7S` and friends)
pub const DURATION_PATTERN: &str = r"^-?P((([0-9]+Y([0-9]+M)?([0-9]+D)?|([0-9]+M)([0-9]+D)?|([0-9]+D))(T(([0-9]+H)([0-9]+M)?([0-9]+(\.[0-9]+)?S)?|([0-9]+M)([0-9]+(\.[0-9]+)?S)?|([0-9]+(\.[0-9]+)?S)))?)|(T(([0-9]+H)([0-9]+M)?([0-9]+(\.[0-9]+)?S)?|([0-9]+M)([0-9]+(\.[0-9]+)?S)?|([0-9]+(\.[0-9]+)?S))))$";

/// How one primitive type name maps onto a schema node
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveRule {
    pub schema_type: JsonType,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub pattern: Option<String>,
    pub format: Option<String>,
}

impl PrimitiveRule {
    pub fn new(schema_type: JsonType) -> Self {
        Self {
            schema_type,
            minimum: None,
            maximum: None,
            pattern: None,
            format: None,
        }
    }

    pub fn minimum(mut self, bound: Bound) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn maximum(mut self, bound: Bound) -> Self {
        self.maximum = Some(bound);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    fn apply_to(&self, node: &mut SchemaNode) {
        node.schema_type = Some(self.schema_type);
        if self.minimum.is_some() {
            node.minimum = self.minimum;
        }
        if self.maximum.is_some() {
            node.maximum = self.maximum;
        }
        if let Some(pattern) = &self.pattern {
            node.pattern = Some(pattern.clone());
        }
        if let Some(format) = &self.format {
            node.format = Some(format.clone());
        }
    }
}

/// Case-insensitive table of primitive type names
#[derive(Debug, Clone)]
pub struct PrimitiveTable {
    rules: HashMap<String, PrimitiveRule>,
}

impl Default for PrimitiveTable {
    fn default() -> Self {
        let mut table = Self::empty();

        table.insert("string", PrimitiveRule::new(JsonType::String));
        table.insert("boolean", PrimitiveRule::new(JsonType::Boolean));
        for name in ["number", "decimal", "float", "double"] {
            table.insert(name, PrimitiveRule::new(JsonType::Number));
        }
        for name in ["integer", "long", "int", "short", "byte"] {
            table.insert(name, PrimitiveRule::new(JsonType::Integer));
        }
        for name in [
            "nonNegativeInteger",
            "unsignedLong",
            "unsignedInt",
            "unsignedShort",
            "unsignedByte",
            "positiveInteger",
        ] {
            table.insert(
                name,
                PrimitiveRule::new(JsonType::Integer).minimum(Bound::inclusive(0.0)),
            );
        }
        table.insert(
            "nonPositiveInteger",
            PrimitiveRule::new(JsonType::Integer).maximum(Bound::inclusive(0.0)),
        );
        table.insert(
            "negativeInteger",
            PrimitiveRule::new(JsonType::Integer).maximum(Bound::exclusive(0.0)),
        );
        table.insert(
            "duration",
            PrimitiveRule::new(JsonType::String).pattern(DURATION_PATTERN),
        );
        table.insert(
            "dateTime",
            PrimitiveRule::new(JsonType::String).format("date-time"),
        );

        table
    }
}

impl PrimitiveTable {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace a rule
    pub fn insert(&mut self, name: &str, rule: PrimitiveRule) -> &mut Self {
        self.rules.insert(name.to_ascii_lowercase(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PrimitiveRule> {
        self.rules.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Maps model types onto schema base types
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    primitives: PrimitiveTable,
}

impl TypeMapper {
    pub fn new(primitives: PrimitiveTable) -> Self {
        Self { primitives }
    }

    pub fn primitives(&self) -> &PrimitiveTable {
        &self.primitives
    }

    /// Assign the base type and inline constraints of `ty` to `node`
    pub fn classify<R: ModelReader>(&self, model: &R, ty: &Element, node: &mut SchemaNode) -> Result<()> {
        let mut seen = HashSet::new();
        self.classify_inner(model, ty, node, &mut seen)
    }

    fn classify_inner<R: ModelReader>(
        &self,
        model: &R,
        ty: &Element,
        node: &mut SchemaNode,
        seen: &mut HashSet<ElementId>,
    ) -> Result<()> {
        seen.insert(ty.id.clone());

        match &ty.body {
            ElementBody::Class { .. } => node.schema_type = Some(JsonType::Object),
            ElementBody::Enumeration { literals } => {
                node.schema_type = Some(JsonType::String);
                for literal in literals {
                    node.push_enum(literal.value());
                }
            }
            ElementBody::DataType { generalizations, .. } => {
                if let Some(rule) = self.primitives.get(&ty.name) {
                    rule.apply_to(node);
                } else if let Some(general) = generalizations.first() {
                    if seen.contains(general) {
                        warn!(data_type = %ty.name, "generalization cycle, leaving type unresolved");
                    } else {
                        debug!(data_type = %ty.name, general = %general, "resolving through generalization");
                        match model.element(general) {
                            Ok(general) => self.classify_inner(model, &general, node, seen)?,
                            Err(ModelError::ElementNotFound(missing)) => warn!(
                                data_type = %ty.name,
                                general = %missing,
                                "generalization not in model, leaving type unresolved"
                            ),
                            Err(e) => return Err(e.into()),
                        }
                    }
                } else {
                    warn!(data_type = %ty.name, "no JSON type for data type, leaving node untyped");
                }
                apply_facets(&ty.tagged_values, node);
            }
            ElementBody::Package { .. } => {
                warn!(element = %ty.name, "package used as a type, leaving node untyped");
            }
        }
        Ok(())
    }
}
