//! In-memory model store
//!
//! Backs the CLI (models are exchanged as JSON files) and the test suite.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use super::{stereotype_matches, Element, ElementId, ModelError, ModelReader, ModelWriter};
use crate::error::Result;

/// On-disk layout of a model file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A stereotype write observed by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereotypeWrite {
    pub element: ElementId,
    pub stereotype: String,
}

/// Model store holding every element in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryModel {
    /// Elements in insertion order
    elements: IndexMap<ElementId, Element>,
    /// Attribute id -> owning element id
    attribute_owners: HashMap<ElementId, ElementId>,
    /// Every `add_stereotype` call, including no-ops
    writes: Vec<StereotypeWrite>,
    /// Every `save` call
    saves: Vec<ElementId>,
}

impl InMemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of elements
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut model = Self::new();
        for element in elements {
            model.insert(element);
        }
        model
    }

    /// Parse a model from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        Ok(Self::from_elements(file.elements))
    }

    /// Load a model file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Write the model back as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = ModelFile {
            elements: self.elements.values().cloned().collect(),
        };
        fs::write(path.as_ref(), serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Add or replace an element
    ///
    /// Attributes without an id are named `<owner>.<name>`. An attribute id
    /// already owned by another element keeps its first owner.
    pub fn insert(&mut self, mut element: Element) -> &mut Self {
        let owner = element.id.clone();
        self.attribute_owners.retain(|_, o| o != &owner);
        for attribute in element.attributes_mut() {
            attribute.assign_owner(&owner);
            match self.attribute_owners.get(&attribute.id) {
                Some(existing) => warn!(
                    attribute = %attribute.id,
                    owner = %existing,
                    duplicate = %owner,
                    "attribute id already in use, not addressable on the new owner"
                ),
                None => {
                    self.attribute_owners
                        .insert(attribute.id.clone(), owner.clone());
                }
            }
        }
        self.elements.insert(owner, element);
        self
    }

    /// Direct access for inspection
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// First element with this name
    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.values().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn writes(&self) -> &[StereotypeWrite] {
        &self.writes
    }

    pub fn saves(&self) -> &[ElementId] {
        &self.saves
    }

    fn stereotypes_mut(&mut self, id: &ElementId) -> Option<&mut Vec<String>> {
        if self.elements.contains_key(id) {
            return self.elements.get_mut(id).map(|e| &mut e.stereotypes);
        }
        let owner = self.attribute_owners.get(id)?.clone();
        let element = self.elements.get_mut(&owner)?;
        match &mut element.body {
            super::ElementBody::Class { attributes }
            | super::ElementBody::DataType { attributes, .. } => attributes
                .iter_mut()
                .find(|a| &a.id == id)
                .map(|a| &mut a.stereotypes),
            _ => None,
        }
    }
}

impl ModelReader for InMemoryModel {
    fn element(&self, id: &ElementId) -> std::result::Result<Element, ModelError> {
        self.elements
            .get(id)
            .cloned()
            .ok_or_else(|| ModelError::ElementNotFound(id.clone()))
    }
}

impl ModelWriter for InMemoryModel {
    fn add_stereotype(
        &mut self,
        id: &ElementId,
        qualified_name: &str,
    ) -> std::result::Result<(), ModelError> {
        self.writes.push(StereotypeWrite {
            element: id.clone(),
            stereotype: qualified_name.to_string(),
        });
        let stereotypes = self
            .stereotypes_mut(id)
            .ok_or_else(|| ModelError::ElementNotFound(id.clone()))?;
        if !stereotypes.iter().any(|s| stereotype_matches(s, qualified_name)) {
            stereotypes.push(qualified_name.to_string());
        }
        Ok(())
    }

    fn save(&mut self, id: &ElementId) -> std::result::Result<(), ModelError> {
        if !self.elements.contains_key(id) && !self.attribute_owners.contains_key(id) {
            return Err(ModelError::ElementNotFound(id.clone()));
        }
        self.saves.push(id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn sample() -> InMemoryModel {
        InMemoryModel::from_elements([
            Element::data_type("String"),
            Element::class("Person").with_attribute(Attribute::new("name", "String")),
        ])
    }

    #[test]
    fn test_missing_element_is_reported() {
        let model = sample();
        let err = model.element(&ElementId::from("Nope")).unwrap_err();
        assert_eq!(err, ModelError::ElementNotFound(ElementId::from("Nope")));
    }

    #[test]
    fn test_add_stereotype_is_idempotent_but_logged() {
        let mut model = sample();
        let person = ElementId::from("Person");
        model.add_stereotype(&person, "JSON::JSONElement").unwrap();
        model.add_stereotype(&person, "JSON::JSONElement").unwrap();

        assert_eq!(model.get(&person).unwrap().stereotypes, vec!["JSON::JSONElement"]);
        assert_eq!(model.writes().len(), 2);
    }

    #[test]
    fn test_add_stereotype_reaches_attributes() {
        let mut model = sample();
        let attr = ElementId::from("Person.name");
        model.add_stereotype(&attr, "JSON::JSONProperty").unwrap();

        let person = model.get(&ElementId::from("Person")).unwrap();
        assert!(person.attributes()[0].has_stereotype("JSONProperty"));
    }

    #[test]
    fn test_same_attribute_name_on_two_owners() {
        let mut model = InMemoryModel::from_elements([
            Element::class("A").with_attribute(Attribute::new("name", "String")),
            Element::class("B").with_attribute(Attribute::new("name", "String")),
        ]);
        model.add_stereotype(&"A.name".into(), "JSON::JSONProperty").unwrap();

        assert!(model.get(&"A".into()).unwrap().attributes()[0].has_stereotype("JSONProperty"));
        assert!(model.get(&"B".into()).unwrap().attributes()[0].stereotypes.is_empty());
    }

    #[test]
    fn test_attribute_without_id_is_named_after_owner() {
        let element = Element::new(
            "Item",
            "Item",
            crate::model::ElementBody::Class { attributes: vec![Attribute::new("sku", "String")] },
        );
        let mut model = InMemoryModel::from_elements([element]);
        assert!(model.add_stereotype(&"Item.sku".into(), "JSON::JSONProperty").is_ok());
    }

    #[test]
    fn test_model_file_attributes_may_omit_ids() {
        let json = r#"{"elements": [
            {"id": "cls-a", "name": "A", "kind": "class", "attributes": [{"name": "code"}]}
        ]}"#;
        let model = InMemoryModel::from_json_str(json).unwrap();
        let a = model.get(&"cls-a".into()).unwrap();
        assert_eq!(a.attributes()[0].id, ElementId::from("cls-a.code"));
    }

    #[test]
    fn test_replacing_an_element_drops_its_old_attributes() {
        let mut model = sample();
        model.insert(Element::class("Person"));
        let err = model.save(&"Person.name".into()).unwrap_err();
        assert_eq!(err, ModelError::ElementNotFound("Person.name".into()));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = sample();
        model.save_to(&path).unwrap();

        let reloaded = InMemoryModel::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.find_by_name("Person").unwrap(),
            model.find_by_name("Person").unwrap()
        );
    }
}
