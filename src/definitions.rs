//! Definitions registry
//!
//! Object-shaped subschemas are lifted into the document's `definitions`
//! block. Keys are not unique across types: registering a key twice replaces
//! the earlier node.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::SchemaNode;

/// Where a definitions key comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Name of the attribute's type
    TypeName,
    /// Name of the attribute itself
    AttributeName,
}

impl KeySource {
    pub fn pick<'a>(&self, attribute_name: &'a str, type_name: &'a str) -> &'a str {
        match self {
            KeySource::TypeName => type_name,
            KeySource::AttributeName => attribute_name,
        }
    }
}

/// Key derivation for the two places definitions are registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyScheme {
    /// Object items of multi-valued attributes
    #[serde(default = "default_array_items")]
    pub array_items: KeySource,
    /// Single-valued class references
    #[serde(default = "default_single_reference")]
    pub single_reference: KeySource,
}

fn default_array_items() -> KeySource {
    KeySource::TypeName
}

fn default_single_reference() -> KeySource {
    KeySource::AttributeName
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self {
            array_items: default_array_items(),
            single_reference: default_single_reference(),
        }
    }
}

impl KeyScheme {
    /// Key every definition by its type name
    pub fn by_type_name() -> Self {
        Self {
            array_items: KeySource::TypeName,
            single_reference: KeySource::TypeName,
        }
    }
}

/// Accumulates definitions during one generation run
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    entries: IndexMap<String, SchemaNode>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node; an existing entry under the same key is replaced
    pub fn register(&mut self, key: impl Into<String>, node: SchemaNode) {
        let key = key.into();
        if self.entries.insert(key.clone(), node).is_some() {
            debug!(key = %key, "definition replaced");
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, SchemaNode> {
        self.entries
    }
}
