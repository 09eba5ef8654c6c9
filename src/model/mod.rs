//! Class Model Access
//!
//! The generator never talks to a modeling tool directly. It reads the model
//! through [`ModelReader`] and writes stereotypes back through [`ModelWriter`].
//! Any store (a tool repository, a file, an in-memory fake) can sit behind
//! these two ports.
//!
//! ```text
//! Element
//! ├── name, stereotypes, tagged values, comments
//! └── body
//!     ├── Class        { attributes }
//!     ├── DataType     { attributes, generalizations }
//!     ├── Enumeration  { literals }
//!     └── Package      { members }
//! ```

pub mod memory;

pub use memory::InMemoryModel;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by a model store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Model store failure: {0}")]
    Store(String),
}

/// Read side of the model store
pub trait ModelReader {
    /// Read a snapshot of one element
    fn element(&self, id: &ElementId) -> Result<Element, ModelError>;
}

/// Write side of the model store.
///
/// Implementations must make `add_stereotype` idempotent per element.
pub trait ModelWriter {
    /// Attach a profile-qualified stereotype to an element or attribute
    fn add_stereotype(&mut self, id: &ElementId, qualified_name: &str) -> Result<(), ModelError>;

    /// Persist pending changes to an element
    fn save(&mut self, id: &ElementId) -> Result<(), ModelError>;
}

// =============================================================================
// Identifiers and metadata
// =============================================================================

/// Stable identifier of a model element
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the placeholder id of an attribute not yet attached to an owner
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A named piece of free-form metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedValue {
    pub name: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub value: String,
}

impl TaggedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Tag names compare case-insensitively
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Tag values are string-coercible: numbers and booleans are accepted as-is
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Compare stereotype names, ignoring case and any `Profile::` qualifier
pub fn stereotype_matches(candidate: &str, name: &str) -> bool {
    fn local(s: &str) -> &str {
        s.rsplit("::").next().unwrap_or(s)
    }
    local(candidate).eq_ignore_ascii_case(local(name))
}

// =============================================================================
// Multiplicity
// =============================================================================

/// Upper occurrence bound of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UpperRepr", into = "UpperRepr")]
pub enum Upper {
    Bounded(u32),
    Unbounded,
}

impl Upper {
    /// Unbounded, or bounded above one
    pub fn is_many(&self) -> bool {
        match self {
            Upper::Unbounded => true,
            Upper::Bounded(n) => *n > 1,
        }
    }

    pub fn bound(&self) -> Option<u32> {
        match self {
            Upper::Bounded(n) => Some(*n),
            Upper::Unbounded => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UpperRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<UpperRepr> for Upper {
    type Error = String;

    fn try_from(repr: UpperRepr) -> Result<Self, Self::Error> {
        match repr {
            UpperRepr::Number(0) => Err("upper bound must be positive".to_string()),
            UpperRepr::Number(n) => Ok(Upper::Bounded(n)),
            UpperRepr::Text(s) if s == "*" || s == "-1" || s.eq_ignore_ascii_case("unbounded") => {
                Ok(Upper::Unbounded)
            }
            UpperRepr::Text(s) => match s.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Upper::Bounded(n)),
                _ => Err(format!("invalid upper bound: {s}")),
            },
        }
    }
}

impl From<Upper> for UpperRepr {
    fn from(upper: Upper) -> Self {
        match upper {
            Upper::Bounded(n) => UpperRepr::Number(n),
            Upper::Unbounded => UpperRepr::Text("*".to_string()),
        }
    }
}

/// Occurrence bounds of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplicity {
    #[serde(default = "default_lower")]
    pub lower: u32,
    #[serde(default = "default_upper")]
    pub upper: Upper,
}

fn default_lower() -> u32 {
    1
}

fn default_upper() -> Upper {
    Upper::Bounded(1)
}

impl Multiplicity {
    pub fn new(lower: u32, upper: Upper) -> Self {
        Self { lower, upper }
    }

    /// `1..1`
    pub fn one() -> Self {
        Self::new(1, Upper::Bounded(1))
    }

    /// `0..1`
    pub fn optional() -> Self {
        Self::new(0, Upper::Bounded(1))
    }

    /// `0..*`
    pub fn many() -> Self {
        Self::new(0, Upper::Unbounded)
    }

    pub fn is_required(&self) -> bool {
        self.lower > 0
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::one()
    }
}

// =============================================================================
// Elements
// =============================================================================

/// A typed attribute owned by a class or data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Assigned from the owner when a model file leaves it out
    #[serde(default, skip_serializing_if = "ElementId::is_empty")]
    pub id: ElementId,
    pub name: String,
    /// The attribute's type; `None` when the model leaves it untyped
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<ElementId>,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tagged_values: Vec<TaggedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Attribute {
    /// A `1..1` attribute. Its id is assigned as `<owner>.<name>` once it is
    /// attached to an element, unless set with [`Attribute::with_id`].
    pub fn new(name: impl Into<String>, type_ref: impl Into<ElementId>) -> Self {
        Self {
            id: ElementId::default(),
            name: name.into(),
            type_ref: Some(type_ref.into()),
            multiplicity: Multiplicity::one(),
            is_unique: false,
            stereotypes: Vec::new(),
            tagged_values: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub(crate) fn assign_owner(&mut self, owner: &ElementId) {
        if self.id.is_empty() {
            self.id = ElementId::new(format!("{}.{}", owner, self.name));
        }
    }

    pub fn with_multiplicity(mut self, lower: u32, upper: Upper) -> Self {
        self.multiplicity = Multiplicity::new(lower, upper);
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tagged_values.push(TaggedValue::new(name, value));
        self
    }

    pub fn with_comment(mut self, body: impl Into<String>) -> Self {
        self.comments.push(body.into());
        self
    }

    pub fn first_comment(&self) -> Option<&str> {
        self.comments.first().map(String::as_str)
    }

    pub fn has_stereotype(&self, name: &str) -> bool {
        self.stereotypes.iter().any(|s| stereotype_matches(s, name))
    }
}

/// A named enumeration literal with an optional serialized alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub name: String,
    #[serde(default)]
    pub alias: String,
}

impl Literal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }

    /// The value written into an `enum` list
    pub fn value(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

/// Kind-specific content of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementBody {
    Class {
        #[serde(default)]
        attributes: Vec<Attribute>,
    },
    DataType {
        #[serde(default)]
        attributes: Vec<Attribute>,
        /// Superclasses in declaration order
        #[serde(default)]
        generalizations: Vec<ElementId>,
    },
    Enumeration {
        #[serde(default)]
        literals: Vec<Literal>,
    },
    Package {
        #[serde(default)]
        members: Vec<ElementId>,
    },
}

/// Snapshot of one model element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tagged_values: Vec<TaggedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Primary documentation text (the element's notes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(flatten)]
    pub body: ElementBody,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>, body: ElementBody) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stereotypes: Vec::new(),
            tagged_values: Vec::new(),
            comments: Vec::new(),
            version: None,
            documentation: None,
            body,
        }
    }

    /// A class whose id is its name
    pub fn class(name: &str) -> Self {
        Self::new(name, name, ElementBody::Class { attributes: Vec::new() })
    }

    /// A data type whose id is its name
    pub fn data_type(name: &str) -> Self {
        Self::new(
            name,
            name,
            ElementBody::DataType {
                attributes: Vec::new(),
                generalizations: Vec::new(),
            },
        )
    }

    /// An enumeration whose id is its name
    pub fn enumeration(name: &str, literals: Vec<Literal>) -> Self {
        Self::new(name, name, ElementBody::Enumeration { literals })
    }

    /// A package whose id is its name
    pub fn package(name: &str, members: Vec<ElementId>) -> Self {
        Self::new(name, name, ElementBody::Package { members })
    }

    pub fn with_stereotype(mut self, name: impl Into<String>) -> Self {
        self.stereotypes.push(name.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tagged_values.push(TaggedValue::new(name, value));
        self
    }

    pub fn with_comment(mut self, body: impl Into<String>) -> Self {
        self.comments.push(body.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    /// Append an attribute; ignored for enumerations and packages
    pub fn with_attribute(mut self, mut attribute: Attribute) -> Self {
        attribute.assign_owner(&self.id);
        match &mut self.body {
            ElementBody::Class { attributes } | ElementBody::DataType { attributes, .. } => {
                attributes.push(attribute)
            }
            _ => {}
        }
        self
    }

    /// Append a superclass; ignored for anything but data types
    pub fn with_generalization(mut self, general: impl Into<ElementId>) -> Self {
        if let ElementBody::DataType { generalizations, .. } = &mut self.body {
            generalizations.push(general.into());
        }
        self
    }

    /// First tagged value with this name
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tagged_values
            .iter()
            .find(|t| t.is(name))
            .map(|t| t.value.as_str())
    }

    /// All tagged values with this name, in order
    pub fn tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tagged_values
            .iter()
            .filter(move |t| t.is(name))
            .map(|t| t.value.as_str())
    }

    pub fn has_stereotype(&self, name: &str) -> bool {
        self.stereotypes.iter().any(|s| stereotype_matches(s, name))
    }

    pub fn first_comment(&self) -> Option<&str> {
        self.comments.first().map(String::as_str)
    }

    pub fn attributes(&self) -> &[Attribute] {
        match &self.body {
            ElementBody::Class { attributes } | ElementBody::DataType { attributes, .. } => {
                attributes
            }
            _ => &[],
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut [Attribute] {
        match &mut self.body {
            ElementBody::Class { attributes } | ElementBody::DataType { attributes, .. } => {
                attributes
            }
            _ => &mut [],
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.body, ElementBody::Class { .. })
    }

    pub fn is_data_type(&self) -> bool {
        matches!(self.body, ElementBody::DataType { .. })
    }

    pub fn is_package(&self) -> bool {
        matches!(self.body, ElementBody::Package { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereotype_matching_ignores_profile_and_case() {
        assert!(stereotype_matches("JSON::JSONSchema", "jsonschema"));
        assert!(stereotype_matches("JSONSchema", "JSON::JSONSchema"));
        assert!(!stereotype_matches("JSONElement", "JSONSchema"));
    }

    #[test]
    fn test_literal_value_prefers_alias() {
        assert_eq!(Literal::new("Red").value(), "Red");
        assert_eq!(Literal::aliased("Green", "grn").value(), "grn");
    }

    #[test]
    fn test_upper_bound_parsing() {
        let m: Multiplicity = serde_json::from_str(r#"{"lower": 0, "upper": "*"}"#).unwrap();
        assert_eq!(m.upper, Upper::Unbounded);
        let m: Multiplicity = serde_json::from_str(r#"{"lower": 2, "upper": 5}"#).unwrap();
        assert_eq!(m, Multiplicity::new(2, Upper::Bounded(5)));
        assert!(serde_json::from_str::<Multiplicity>(r#"{"upper": 0}"#).is_err());
    }

    #[test]
    fn test_tag_values_accept_scalars() {
        let tag: TaggedValue = serde_json::from_str(r#"{"name": "totalDigits", "value": 5}"#).unwrap();
        assert_eq!(tag.value, "5");
    }

    #[test]
    fn test_element_body_round_trips_through_kind_tag() {
        let json = r#"{
            "id": "e1", "name": "Colour", "kind": "enumeration",
            "literals": [{"name": "Red"}, {"name": "Green", "alias": "grn"}]
        }"#;
        let element: Element = serde_json::from_str(json).unwrap();
        match &element.body {
            ElementBody::Enumeration { literals } => assert_eq!(literals.len(), 2),
            other => panic!("Expected Enumeration, got {:?}", other),
        }
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let element = Element::class("Person")
            .with_tag("ID", "https://example.com/person")
            .with_tag("enum", "a")
            .with_tag("Enum", "b");
        assert_eq!(element.tag("id"), Some("https://example.com/person"));
        assert_eq!(element.tags("ENUM").collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
