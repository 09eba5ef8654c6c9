//! Schema node and property builders
//!
//! Walks the model depth-first. A class becomes an object node with one
//! property per attribute; each attribute becomes a scalar, an array or an
//! inlined class node depending on its multiplicity and type.
//!
//! The walk keeps a stack of the classes currently being built. Meeting one of
//! them again yields a `$ref` placeholder (`#` for the root,
//! `#/definitions/<Type>` otherwise) instead of recursing forever, and the
//! class is registered under its type name once it is complete so the
//! placeholder resolves.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::definitions::{DefinitionRegistry, KeyScheme};
use crate::error::Result;
use crate::facets::apply_facets;
use crate::model::{Attribute, Element, ElementBody, ElementId, ModelReader};
use crate::schema::{JsonType, SchemaNode};
use crate::types::TypeMapper;

/// Builds schema nodes for one generation run
pub struct SchemaBuilder<'a, R: ModelReader> {
    model: &'a R,
    mapper: &'a TypeMapper,
    keys: KeyScheme,
    definitions: DefinitionRegistry,
    /// Classes whose properties are being built, innermost last
    in_progress: Vec<ElementId>,
    /// Classes that were referenced through a placeholder
    placeholders: HashSet<ElementId>,
    root: Option<ElementId>,
}

impl<'a, R: ModelReader> SchemaBuilder<'a, R> {
    pub fn new(model: &'a R, mapper: &'a TypeMapper, keys: KeyScheme) -> Self {
        Self {
            model,
            mapper,
            keys,
            definitions: DefinitionRegistry::new(),
            in_progress: Vec::new(),
            placeholders: HashSet::new(),
            root: None,
        }
    }

    /// Build the document root; references back to it become `{"$ref": "#"}`
    pub fn build_root(&mut self, root: &Element) -> Result<SchemaNode> {
        self.root = Some(root.id.clone());
        self.build_type(root)
    }

    /// Build the node for a model type
    pub fn build_type(&mut self, ty: &Element) -> Result<SchemaNode> {
        if self.in_progress.contains(&ty.id) {
            return Ok(self.placeholder(ty));
        }

        debug!(type_name = %ty.name, "building schema node");
        let mut node = SchemaNode::new();
        self.mapper.classify(self.model, ty, &mut node)?;

        if let ElementBody::Class { attributes } = &ty.body {
            if !attributes.is_empty() {
                self.in_progress.push(ty.id.clone());
                let result = self.add_properties(&mut node, attributes);
                self.in_progress.pop();
                result?;
            }

            let is_root = self.root.as_ref() == Some(&ty.id);
            if self.placeholders.remove(&ty.id) && !is_root {
                self.definitions.register(ty.name.clone(), node.clone());
            }
        }

        Ok(node)
    }

    fn placeholder(&mut self, ty: &Element) -> SchemaNode {
        warn!(type_name = %ty.name, "recursive type, emitting a reference");
        self.placeholders.insert(ty.id.clone());
        if self.root.as_ref() == Some(&ty.id) {
            SchemaNode::reference("#")
        } else {
            SchemaNode::reference(format!("#/definitions/{}", ty.name))
        }
    }

    fn add_properties(&mut self, node: &mut SchemaNode, attributes: &[Attribute]) -> Result<()> {
        for attribute in attributes {
            let property = self.build_property(attribute)?;
            node.properties.insert(attribute.name.clone(), property);
            if attribute.multiplicity.is_required() {
                node.required.insert(attribute.name.clone());
            }
        }
        node.additional_properties = Some(false);
        Ok(())
    }

    /// Build the schema of one attribute
    pub fn build_property(&mut self, attribute: &Attribute) -> Result<SchemaNode> {
        debug!(attribute = %attribute.name, "building property");
        let ty = match &attribute.type_ref {
            Some(id) => Some(self.model.element(id)?),
            None => None,
        };
        let multiplicity = attribute.multiplicity;

        let mut node = if multiplicity.upper.is_many() {
            let mut array = SchemaNode::of_type(JsonType::Array);
            if multiplicity.lower > 0 {
                array.min_items = Some(multiplicity.lower);
            }
            array.max_items = multiplicity.upper.bound();
            array.unique_items = attribute.is_unique;

            let items = match &ty {
                Some(ty) => self.build_type(ty)?,
                None => SchemaNode::new(),
            };
            if let Some(ty) = ty.as_ref().filter(|_| items.is_object()) {
                let key = self.keys.array_items.pick(&attribute.name, &ty.name);
                self.definitions.register(key, items.clone());
            }
            array.items = Some(Box::new(items));
            array
        } else if let Some(ty) = ty.as_ref().filter(|t| t.is_class()) {
            let node = self.build_type(ty)?;
            if node.is_object() {
                let key = self.keys.single_reference.pick(&attribute.name, &ty.name);
                self.definitions.register(key, node.clone());
            }
            node
        } else {
            let mut node = SchemaNode::new();
            if let Some(ty) = &ty {
                self.mapper.classify(self.model, ty, &mut node)?;
            }
            node
        };

        // siblings of `$ref` are ignored by validators
        if node.reference.is_some() {
            return Ok(node);
        }
        apply_facets(&attribute.tagged_values, &mut node);
        if let Some(comment) = attribute.first_comment() {
            node.description = Some(comment.to_string());
        }
        Ok(node)
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    /// Hand over the collected definitions
    pub fn finish(self) -> DefinitionRegistry {
        self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModel, Upper};
    use crate::schema::{Bound, BoundStyle};
    use serde_json::json;

    fn primitives() -> Vec<Element> {
        vec![
            Element::data_type("string"),
            Element::data_type("integer"),
        ]
    }

    fn build(model: &InMemoryModel, name: &str, keys: KeyScheme) -> (SchemaNode, DefinitionRegistry) {
        let mapper = TypeMapper::default();
        let ty = model.find_by_name(name).unwrap().clone();
        let mut builder = SchemaBuilder::new(model, &mapper, keys);
        let node = builder.build_root(&ty).unwrap();
        (node, builder.finish())
    }

    #[test]
    fn test_unbounded_string_attribute_is_plain_array() {
        let mut elements = primitives();
        elements.push(
            Element::class("Post")
                .with_attribute(Attribute::new("tags", "string").with_multiplicity(0, Upper::Unbounded)),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, _) = build(&model, "Post", KeyScheme::default());

        assert_eq!(
            node.properties["tags"].to_value(BoundStyle::Numeric),
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert!(node.required.is_empty());
    }

    #[test]
    fn test_bounded_array_items() {
        let mut elements = primitives();
        elements.push(
            Element::class("Team").with_attribute(
                Attribute::new("members", "string")
                    .with_multiplicity(2, Upper::Bounded(5))
                    .unique(),
            ),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, _) = build(&model, "Team", KeyScheme::default());
        let members = &node.properties["members"];

        assert_eq!(members.schema_type, Some(JsonType::Array));
        assert_eq!(members.min_items, Some(2));
        assert_eq!(members.max_items, Some(5));
        assert!(members.unique_items);
        assert!(node.required.contains("members"));
    }

    #[test]
    fn test_required_tracks_lower_bound() {
        let mut elements = primitives();
        elements.push(
            Element::class("Person")
                .with_attribute(Attribute::new("name", "string"))
                .with_attribute(Attribute::new("nickname", "string").with_multiplicity(0, Upper::Bounded(1)))
                .with_attribute(Attribute::new("age", "integer").with_comment("Age in years")),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, _) = build(&model, "Person", KeyScheme::default());

        let required: Vec<_> = node.required.iter().cloned().collect();
        assert_eq!(required, vec!["name", "age"]);
        assert_eq!(node.additional_properties, Some(false));
        assert_eq!(node.properties["age"].description.as_deref(), Some("Age in years"));
    }

    #[test]
    fn test_class_without_attributes_has_no_properties() {
        let model = InMemoryModel::from_elements([Element::class("Marker")]);
        let (node, _) = build(&model, "Marker", KeyScheme::default());
        assert_eq!(node.to_value(BoundStyle::Numeric), json!({"type": "object"}));
    }

    #[test]
    fn test_definition_keys_follow_scheme() {
        let mut elements = primitives();
        elements.push(Element::class("Address").with_attribute(Attribute::new("city", "string")));
        elements.push(Element::class("OrderLine").with_attribute(Attribute::new("sku", "string")));
        elements.push(
            Element::class("Order")
                .with_attribute(Attribute::new("shipTo", "Address"))
                .with_attribute(Attribute::new("lines", "OrderLine").with_multiplicity(1, Upper::Unbounded)),
        );
        let model = InMemoryModel::from_elements(elements);

        let (node, definitions) = build(&model, "Order", KeyScheme::default());
        assert!(definitions.contains("shipTo"));
        assert!(definitions.contains("OrderLine"));
        assert!(!definitions.contains("Address"));
        // the class is inlined as well as registered
        assert_eq!(definitions.get("shipTo"), Some(&node.properties["shipTo"]));

        let (_, definitions) = build(&model, "Order", KeyScheme::by_type_name());
        assert!(definitions.contains("Address"));
        assert!(definitions.contains("OrderLine"));
    }

    #[test]
    fn test_array_items_with_same_type_name_overwrite() {
        let mut elements = primitives();
        elements.push(Element::new(
            "pkg1.Item",
            "Item",
            ElementBody::Class { attributes: vec![Attribute::new("a", "string")] },
        ));
        elements.push(Element::new(
            "pkg2.Item",
            "Item",
            ElementBody::Class { attributes: vec![Attribute::new("b", "string")] },
        ));
        elements.push(
            Element::class("Basket")
                .with_attribute(Attribute::new("first", "pkg1.Item").with_multiplicity(0, Upper::Unbounded))
                .with_attribute(Attribute::new("second", "pkg2.Item").with_multiplicity(0, Upper::Unbounded)),
        );
        let model = InMemoryModel::from_elements(elements);
        let (_, definitions) = build(&model, "Basket", KeyScheme::default());

        assert_eq!(definitions.len(), 1);
        assert!(definitions.get("Item").unwrap().properties.contains_key("b"));
    }

    #[test]
    fn test_attribute_facets_apply_to_property() {
        let mut elements = primitives();
        elements.push(
            Element::class("Account").with_attribute(
                Attribute::new("balance", "integer")
                    .with_tag("totalDigits", "5")
                    .with_tag("fractionDigits", "2"),
            ),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, _) = build(&model, "Account", KeyScheme::default());
        let balance = &node.properties["balance"];

        assert_eq!(balance.maximum, Some(Bound::exclusive(1000.0)));
        assert_eq!(balance.minimum, Some(Bound::exclusive(-1000.0)));
        assert_eq!(balance.multiple_of, Some(0.01));
    }

    #[test]
    fn test_self_reference_becomes_placeholder() {
        let mut elements = primitives();
        elements.push(
            Element::class("TreeNode")
                .with_attribute(Attribute::new("label", "string"))
                .with_attribute(Attribute::new("children", "TreeNode").with_multiplicity(0, Upper::Unbounded)),
        );
        elements.push(Element::class("Forest").with_attribute(Attribute::new("tree", "TreeNode")));
        let model = InMemoryModel::from_elements(elements);

        let (node, definitions) = build(&model, "Forest", KeyScheme::default());
        let tree = &node.properties["tree"];
        assert_eq!(
            tree.properties["children"].items.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/TreeNode")
        );
        assert!(definitions.contains("TreeNode"));
        assert!(definitions.contains("tree"));
    }

    #[test]
    fn test_reference_back_to_root() {
        let mut elements = primitives();
        elements.push(
            Element::class("Category")
                .with_attribute(Attribute::new("parent", "Category").with_multiplicity(0, Upper::Bounded(1))),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, definitions) = build(&model, "Category", KeyScheme::default());

        assert_eq!(node.properties["parent"].reference.as_deref(), Some("#"));
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_placeholder_carries_only_the_reference() {
        let mut elements = primitives();
        elements.push(
            Element::class("Category").with_attribute(
                Attribute::new("parent", "Category")
                    .with_multiplicity(0, Upper::Bounded(1))
                    .with_tag("maxLength", "5")
                    .with_comment("Enclosing category"),
            ),
        );
        let model = InMemoryModel::from_elements(elements);
        let (node, _) = build(&model, "Category", KeyScheme::default());

        assert_eq!(
            node.properties["parent"].to_value(BoundStyle::Numeric),
            json!({"$ref": "#"})
        );
    }

    #[test]
    fn test_untyped_attribute_yields_untyped_node() {
        let mut attribute = Attribute::new("anything", "string");
        attribute.type_ref = None;
        let model = InMemoryModel::from_elements([Element::class("Bag").with_attribute(attribute)]);
        let (node, _) = build(&model, "Bag", KeyScheme::default());
        assert_eq!(node.properties["anything"], SchemaNode::new());
    }
}
