use serde_json::json;

use field_sync::{
    DependencyType, EntitySchema, FieldDefinition, FieldShape, SchemaError, SyncBehavior,
    UpdateField, wire_schema,
};

#[test]
fn entity_payload_keeps_dashboard_config() {
    let schema = EntitySchema::from_json_str(include_str!("../tests/fixtures/location_form.json"))
        .expect("entity schema");

    assert_eq!(schema.form_fields.len(), 2);
    assert_eq!(
        schema.dashboard_config.as_ref().map(|config| config["columns"].clone()),
        Some(json!(["country", "city"]))
    );

    let country = &schema.form_fields[0];
    let rule = country.sync.as_ref().expect("country sync rule");
    assert_eq!(rule.followed_by, vec!["city".to_string()]);
    assert!(rule.dependent_on.is_empty());
    assert_eq!(rule.dependency_type(), Some(DependencyType::ValueUpdate));
    match &rule.behavior {
        SyncBehavior::ValueUpdate(maps) => {
            assert!(matches!(
                maps["IN"].update_field,
                Some(UpdateField::Remote(_))
            ));
            assert!(matches!(
                maps["JP"].update_field,
                Some(UpdateField::Values { .. })
            ));
        }
        other => panic!("unexpected behavior {other:?}"),
    }

    let city = &schema.form_fields[1];
    assert_eq!(city.extra.get("placeholder"), Some(&json!("Pick a city")));
}

#[test]
fn bare_field_arrays_are_accepted() {
    let schema = EntitySchema::from_json_str(include_str!("../tests/fixtures/order_form.json"))
        .expect("field array");
    assert!(schema.dashboard_config.is_none());
    assert!(matches!(schema.form_fields[1].shape, FieldShape::Array { .. }));
    assert_eq!(schema.form_fields[1].children().len(), 3);
}

#[test]
fn rejects_payloads_that_are_not_schemas() {
    assert!(matches!(
        EntitySchema::from_json_str(r#"{ "fields": [] }"#),
        Err(SchemaError::UnexpectedShape)
    ));
    assert!(matches!(
        EntitySchema::from_json_str(r#""formFields""#),
        Err(SchemaError::UnexpectedShape)
    ));
    assert!(matches!(
        EntitySchema::from_json_str("{ not json"),
        Err(SchemaError::Json(_))
    ));
}

#[test]
fn container_type_wins_over_type_hint() {
    let fields: Vec<FieldDefinition> = serde_json::from_value(json!([
        { "key": "a", "type": "array", "children": [] },
        { "key": "b", "type": "array", "containerType": "object", "children": [] },
        { "key": "c", "children": [{ "key": "d" }] },
        { "key": "e", "type": "array" }
    ]))
    .expect("fields");

    assert!(matches!(fields[0].shape, FieldShape::Array { .. }));
    assert!(matches!(fields[1].shape, FieldShape::Object { .. }));
    assert!(matches!(fields[2].shape, FieldShape::Object { .. }));
    assert!(!fields[3].is_container());
}

#[test]
fn typed_fields_serialize_back_to_wire_shape() {
    let raw = json!({
        "key": "items",
        "type": "array",
        "children": [{
            "key": "kind",
            "sync": {
                "followedBy": "details",
                "dependencyType": "dynamicFieldGen",
                "valueMaps": {
                    "gift": { "generateField": { "key": "giftNote", "required": true } },
                    "standard": {}
                }
            }
        }]
    });
    let field: FieldDefinition = serde_json::from_value(raw).expect("field");
    let wire = serde_json::to_value(&field).expect("serialize");

    assert_eq!(wire["containerType"], "array");
    assert_eq!(wire["children"][0]["sync"]["followedBy"], "details");
    assert_eq!(
        wire["children"][0]["sync"]["valueMaps"]["gift"]["generateField"]["required"],
        true
    );
    let reparsed: FieldDefinition = serde_json::from_value(wire).expect("reparse");
    assert_eq!(reparsed, field);
}

#[test]
fn unknown_dependency_types_round_trip() {
    let raw = json!({
        "key": "venue",
        "sync": { "dependentOn": ["a", " ", "b"], "dependencyType": "teleport", "valueMaps": { "x": 1 } }
    });
    let field: FieldDefinition = serde_json::from_value(raw).expect("field");
    let rule = field.sync.as_ref().expect("rule");

    assert_eq!(rule.dependent_on, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(rule.dependency_type(), None);
    let wire = serde_json::to_value(&field).expect("serialize");
    assert_eq!(wire["sync"]["dependencyType"], "teleport");
    assert_eq!(wire["sync"]["valueMaps"]["x"], 1);
}

#[test]
fn wire_schema_describes_sync_rules() {
    let schema = serde_json::to_string(&wire_schema()).expect("schema json");
    assert!(schema.contains("dependencyType"));
    assert!(schema.contains("followedBy"));
}
