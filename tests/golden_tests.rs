//! Golden Tests for Schema Generation
//!
//! Runs model fixtures through stamping and generation and compares the
//! rendered documents against expected JSON.

use serde_json::{json, Value};

use uml_schemas::{
    generate_schema, resolve_output_path, stamp, ElementId, GeneratorOptions, InMemoryModel,
    KeyScheme, SchemaError, SchemaGenerator, Vocabulary,
};

fn load(fixture: &str) -> InMemoryModel {
    InMemoryModel::from_json_str(fixture).unwrap()
}

fn person_model() -> InMemoryModel {
    load(include_str!("fixtures/person.json"))
}

fn stamped_order_model() -> InMemoryModel {
    let mut model = load(include_str!("fixtures/order.json"));
    stamp(
        &mut model,
        &ElementId::from("pkg-orders"),
        &ElementId::from("cls-order"),
        &Vocabulary::default(),
    )
    .unwrap();
    model
}

fn order_document(model: &InMemoryModel) -> Value {
    generate_schema(model, &ElementId::from("cls-order"), GeneratorOptions::default())
        .unwrap()
        .to_value()
}

fn order_line() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sku": {"type": "string", "pattern": "^[A-Z]{3}-[0-9]{4}$"},
            "quantity": {"type": "integer", "minimum": 1, "maximum": 999},
            "price": {
                "type": "number",
                "exclusiveMinimum": -10000000,
                "exclusiveMaximum": 10000000,
                "multipleOf": 0.01
            }
        },
        "required": ["sku", "quantity", "price"],
        "additionalProperties": false
    })
}

fn customer() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "maxLength": 80},
            "email": {"type": "string", "format": "email"}
        },
        "required": ["name"],
        "additionalProperties": false
    })
}

// =============================================================================
// End-to-end documents
// =============================================================================

#[test]
fn test_person_document() {
    let model = person_model();
    let doc = generate_schema(&model, &ElementId::from("cls-person"), GeneratorOptions::default()).unwrap();

    assert_eq!(
        doc.to_value(),
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "https://example.com/person",
            "title": "Person",
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"],
            "additionalProperties": false
        })
    );
}

#[test]
fn test_person_document_text_keeps_key_order() {
    let model = person_model();
    let doc = generate_schema(&model, &ElementId::from("cls-person"), GeneratorOptions::default()).unwrap();
    let text = doc.to_json_string(false).unwrap();

    assert_eq!(
        text,
        r#"{"$schema":"http://json-schema.org/draft-07/schema#","$id":"https://example.com/person","title":"Person","type":"object","properties":{"name":{"type":"string"}},"required":["name"],"additionalProperties":false}"#
    );
}

#[test]
fn test_order_document() {
    let model = stamped_order_model();

    assert_eq!(
        order_document(&model),
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "https://example.com/schemas/order",
            "title": "Order",
            "description": "Version 2.1\nA customer order.",
            "type": "object",
            "properties": {
                "number": {
                    "type": "string",
                    "description": "Order number as printed on the invoice"
                },
                "status": {"type": "string", "enum": ["Open", "shipped", "Closed"]},
                "created": {"type": "string", "format": "date-time"},
                "customer": customer(),
                "lines": {"type": "array", "items": order_line(), "minItems": 1},
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "maxItems": 10,
                    "uniqueItems": true
                }
            },
            "required": ["number", "status", "created", "customer", "lines"],
            "additionalProperties": false,
            "definitions": {
                "customer": customer(),
                "OrderLine": order_line()
            }
        })
    );
}

#[test]
fn test_order_requires_stamping_first() {
    let model = load(include_str!("fixtures/order.json"));
    let err = generate_schema(&model, &ElementId::from("cls-order"), GeneratorOptions::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::MissingStereotype { .. }));
}

#[test]
fn test_key_scheme_by_type_name() {
    let model = stamped_order_model();
    let options = GeneratorOptions {
        keys: KeyScheme::by_type_name(),
        ..GeneratorOptions::default()
    };
    let doc = generate_schema(&model, &ElementId::from("cls-order"), options).unwrap();
    let keys: Vec<_> = doc.definitions.keys().cloned().collect();
    assert_eq!(keys, vec!["Customer", "OrderLine"]);
}

#[test]
fn test_output_path_comes_from_root_tag() {
    let model = stamped_order_model();
    let generator =
        SchemaGenerator::new(&model, &ElementId::from("cls-order"), GeneratorOptions::default()).unwrap();
    let path = resolve_output_path(generator.root(), &Vocabulary::default(), None, None);
    assert_eq!(path, Some("order.schema.json".into()));
}

// =============================================================================
// Stamping
// =============================================================================

#[test]
fn test_stamping_is_idempotent() {
    let mut model = stamped_order_model();
    let before: Vec<_> = ["cls-order", "cls-customer", "dt-amount", "enum-status"]
        .iter()
        .map(|id| model.get(&ElementId::from(*id)).unwrap().clone())
        .collect();

    let report = stamp(
        &mut model,
        &ElementId::from("pkg-orders"),
        &ElementId::from("cls-order"),
        &Vocabulary::default(),
    )
    .unwrap();
    assert_eq!(report.stereotypes_added, 0);

    for element in before {
        assert_eq!(model.get(&element.id).unwrap(), &element);
    }
}

// =============================================================================
// Generated schemas validate instances
// =============================================================================

#[test]
fn test_generated_schema_validates_instances() {
    let model = stamped_order_model();
    let schema = order_document(&model);
    let compiled = jsonschema::JSONSchema::compile(&schema).expect("generated schema compiles");

    let valid = json!({
        "number": "SO-1",
        "status": "shipped",
        "created": "2024-05-01T10:00:00Z",
        "customer": {"name": "Ada"},
        "lines": [
            {"sku": "ABC-1234", "quantity": 2, "price": 20},
            {"sku": "XYZ-0001", "quantity": 1, "price": 12.5}
        ],
        "tags": ["gift"]
    });
    assert!(compiled.is_valid(&valid));

    let mut missing_lines = valid.clone();
    missing_lines.as_object_mut().unwrap().remove("lines");
    assert!(!compiled.is_valid(&missing_lines));

    let mut extra_property = valid.clone();
    extra_property["discount"] = json!(5);
    assert!(!compiled.is_valid(&extra_property));

    let mut literal_name = valid.clone();
    literal_name["status"] = json!("Shipped");
    assert!(!compiled.is_valid(&literal_name));

    let mut bad_quantity = valid.clone();
    bad_quantity["lines"][0]["quantity"] = json!(0);
    assert!(!compiled.is_valid(&bad_quantity));

    let mut bad_sku = valid;
    bad_sku["lines"][0]["sku"] = json!("abc-1234");
    assert!(!compiled.is_valid(&bad_sku));
}
