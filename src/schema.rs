//! JSON Schema output types
//!
//! [`SchemaNode`] is built up by the type mapper, facet resolver and
//! builders, then rendered to `serde_json::Value`. Rendering depends on the
//! dialect: draft-04 and earlier express exclusive bounds as booleans next to
//! `minimum`/`maximum`, later drafts use numeric `exclusiveMinimum`/`exclusiveMaximum`.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use url::Url;

/// JSON Schema base type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric bound and whether it excludes its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: false,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: true,
        }
    }
}

/// How exclusive bounds are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundStyle {
    /// `"maximum": 10, "exclusiveMaximum": true` (draft-04 and earlier)
    Boolean,
    /// `"exclusiveMaximum": 10` (draft-06 and later)
    #[default]
    Numeric,
}

impl BoundStyle {
    /// Pick the style matching a `$schema` dialect URI
    pub fn for_dialect(dialect: &Url) -> Self {
        let uri = dialect.as_str();
        if uri.contains("draft-03") || uri.contains("draft-04") {
            BoundStyle::Boolean
        } else {
            BoundStyle::Numeric
        }
    }
}

/// One node of the generated schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// `$ref`, only used for placeholders of types already being built
    pub reference: Option<String>,
    pub schema_type: Option<JsonType>,
    pub description: Option<String>,

    // string
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub enum_values: Vec<String>,

    // number / integer
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub multiple_of: Option<f64>,

    // array
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<u32>,
    pub max_items: Option<u32>,
    pub unique_items: bool,

    // object
    pub properties: IndexMap<String, SchemaNode>,
    pub required: IndexSet<String>,
    pub additional_properties: Option<bool>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(schema_type: JsonType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Placeholder pointing at a definition or the document root
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn is_object(&self) -> bool {
        self.schema_type == Some(JsonType::Object)
    }

    /// Add an allowed value, keeping the list free of duplicates
    pub fn push_enum(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !self.enum_values.contains(&value) {
            self.enum_values.push(value);
        }
    }

    /// Render this node as JSON
    pub fn to_value(&self, style: BoundStyle) -> Value {
        Value::Object(self.to_map(style))
    }

    fn to_map(&self, style: BoundStyle) -> Map<String, Value> {
        let mut map = Map::new();

        if let Some(reference) = &self.reference {
            map.insert("$ref".into(), Value::String(reference.clone()));
        }
        if let Some(schema_type) = self.schema_type {
            map.insert("type".into(), Value::String(schema_type.as_str().into()));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }

        if let Some(format) = &self.format {
            map.insert("format".into(), Value::String(format.clone()));
        }
        if let Some(pattern) = &self.pattern {
            map.insert("pattern".into(), Value::String(pattern.clone()));
        }
        if let Some(min) = self.min_length {
            map.insert("minLength".into(), Value::from(min));
        }
        if let Some(max) = self.max_length {
            map.insert("maxLength".into(), Value::from(max));
        }
        if !self.enum_values.is_empty() {
            let values = self.enum_values.iter().cloned().map(Value::String).collect();
            map.insert("enum".into(), Value::Array(values));
        }

        if let Some(bound) = self.minimum {
            insert_bound(&mut map, "minimum", "exclusiveMinimum", bound, style);
        }
        if let Some(bound) = self.maximum {
            insert_bound(&mut map, "maximum", "exclusiveMaximum", bound, style);
        }
        if let Some(step) = self.multiple_of {
            map.insert("multipleOf".into(), number(step));
        }

        if let Some(items) = &self.items {
            map.insert("items".into(), items.to_value(style));
        }
        if let Some(min) = self.min_items {
            map.insert("minItems".into(), Value::from(min));
        }
        if let Some(max) = self.max_items {
            map.insert("maxItems".into(), Value::from(max));
        }
        if self.unique_items {
            map.insert("uniqueItems".into(), Value::Bool(true));
        }

        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(name, node)| (name.clone(), node.to_value(style)))
                .collect();
            map.insert("properties".into(), Value::Object(properties));
        }
        if !self.required.is_empty() {
            let required = self.required.iter().cloned().map(Value::String).collect();
            map.insert("required".into(), Value::Array(required));
        }
        if let Some(additional) = self.additional_properties {
            map.insert("additionalProperties".into(), Value::Bool(additional));
        }

        map
    }
}

fn insert_bound(
    map: &mut Map<String, Value>,
    inclusive_key: &str,
    exclusive_key: &str,
    bound: Bound,
    style: BoundStyle,
) {
    match (bound.exclusive, style) {
        (false, _) => {
            map.insert(inclusive_key.into(), number(bound.value));
        }
        (true, BoundStyle::Boolean) => {
            map.insert(inclusive_key.into(), number(bound.value));
            map.insert(exclusive_key.into(), Value::Bool(true));
        }
        (true, BoundStyle::Numeric) => {
            map.insert(exclusive_key.into(), number(bound.value));
        }
    }
}

/// Integral values render as JSON integers
fn number(value: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// A complete generated schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// `$schema`
    pub dialect: Url,
    /// `$id`
    pub id: Url,
    pub title: String,
    pub description: Option<String>,
    pub root: SchemaNode,
    pub definitions: IndexMap<String, SchemaNode>,
}

impl SchemaDocument {
    pub fn bound_style(&self) -> BoundStyle {
        BoundStyle::for_dialect(&self.dialect)
    }

    /// Render the document as JSON
    pub fn to_value(&self) -> Value {
        let style = self.bound_style();
        let id_key = match style {
            BoundStyle::Boolean => "id",
            BoundStyle::Numeric => "$id",
        };

        let mut map = Map::new();
        map.insert("$schema".into(), Value::String(self.dialect.to_string()));
        map.insert(id_key.into(), Value::String(self.id.to_string()));
        map.insert("title".into(), Value::String(self.title.clone()));
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }
        for (key, value) in self.root.to_map(style) {
            map.entry(key).or_insert(value);
        }
        if !self.definitions.is_empty() {
            let definitions = self
                .definitions
                .iter()
                .map(|(key, node)| (key.clone(), node.to_value(style)))
                .collect();
            map.insert("definitions".into(), Value::Object(definitions));
        }
        Value::Object(map)
    }

    /// Render the document as JSON text
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        let value = self.to_value();
        if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    }
}
