use proptest::prelude::*;
use serde_json::{Value, json};

use field_sync::{
    FieldDefinition, Path, Segment, build_field_map, extract_value, find_field_paths,
    get_nested_value,
};

#[test]
fn finds_every_row_occurrence() {
    let tree = json!({ "items": [{ "country": "NP" }, { "country": "US" }] });
    let paths: Vec<String> = find_field_paths(&tree, "country")
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(paths, vec!["items[0].country", "items[1].country"]);
    assert_eq!(get_nested_value(&tree, &paths[0]), Some(&json!("NP")));
    assert_eq!(get_nested_value(&tree, &paths[1]), Some(&json!("US")));
}

#[test]
fn finds_keys_at_mixed_depths() {
    let tree = json!({
        "country": "NP",
        "shipping": { "address": { "country": "IN" } },
        "legs": [[{ "country": "JP" }]],
        "notes": "country"
    });
    let mut paths: Vec<String> = find_field_paths(&tree, "country")
        .iter()
        .map(ToString::to_string)
        .collect();
    paths.sort();

    assert_eq!(
        paths,
        vec!["country", "legs[0][0].country", "shipping.address.country"]
    );
}

#[test]
fn missing_key_resolves_to_nothing() {
    assert!(find_field_paths(&json!({ "a": { "b": 1 } }), "c").is_empty());
    assert!(find_field_paths(&json!("scalar"), "c").is_empty());
    assert!(find_field_paths(&json!(null), "c").is_empty());
}

#[test]
fn select_objects_are_not_searched() {
    let tree = json!({ "country": { "value": "NP", "label": "Nepal" }, "value": 3 });

    assert_eq!(find_field_paths(&tree, "value"), vec![Path::root().join_key("value")]);
    assert_eq!(find_field_paths(&tree, "country"), vec![Path::root().join_key("country")]);
    assert!(find_field_paths(&tree, "label").is_empty());
}

#[test]
fn top_level_key_resolves_to_bare_path() {
    let paths = find_field_paths(&json!({ "status": null }), "status");
    assert_eq!(paths, vec![Path::root().join_key("status")]);
}

#[test]
fn extraction_unwraps_select_objects() {
    assert_eq!(extract_value(&json!({ "value": "NP", "label": "Nepal" })), &json!("NP"));
    assert_eq!(extract_value(&json!("NP")), &json!("NP"));
    assert_eq!(extract_value(&json!(null)), &Value::Null);
    assert_eq!(extract_value(&json!({ "label": "no value" })), &json!({ "label": "no value" }));
}

#[test]
fn field_map_flattens_nested_schema() {
    let fields = vec![
        FieldDefinition::leaf("customer"),
        FieldDefinition::array(
            "items",
            vec![
                FieldDefinition::leaf("country"),
                FieldDefinition::object("price", vec![FieldDefinition::leaf("amount")]),
            ],
        ),
        FieldDefinition::object("slots", vec![FieldDefinition::leaf("0")]),
    ];
    let map = build_field_map(&fields);

    let paths: Vec<String> = map.entries().map(|entry| entry.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "customer",
            "items",
            "items.country",
            "items.price",
            "items.price.amount",
            "slots",
            "slots[0]",
        ]
    );
    assert_eq!(map.get("amount").map(|field| field.key.as_str()), Some("amount"));
    assert_eq!(map.get("items.price.amount"), map.get("amount"));
    assert!(map.contains("country"));
    assert!(!map.contains("missing"));
}

#[test]
fn full_paths_win_over_bare_key_collisions() {
    let mut outer = FieldDefinition::leaf("country");
    outer.label = Some("Billing country".into());
    let mut inner = FieldDefinition::leaf("country");
    inner.label = Some("Shipping country".into());
    let mut other = FieldDefinition::leaf("country");
    other.label = Some("Origin country".into());

    let fields = vec![
        outer,
        FieldDefinition::object("shipping", vec![inner]),
        FieldDefinition::object("origin", vec![other]),
    ];
    let map = build_field_map(&fields);

    let label = |address: &str| map.get(address).and_then(|field| field.label.clone());
    assert_eq!(label("country").as_deref(), Some("Billing country"));
    assert_eq!(label("shipping.country").as_deref(), Some("Shipping country"));
    assert_eq!(label("origin.country").as_deref(), Some("Origin country"));
    assert_eq!(map.len(), 5);
}

#[test]
fn strips_controller_key_to_row_context() {
    let path: Path = "orders[3].items[0].country".parse().unwrap();
    let context = path.strip_key_suffix("country").unwrap();

    assert_eq!(context.to_string(), "orders[3].items[0]");
    assert_eq!(context.without_indices().to_string(), "orders.items");
    assert_eq!(context.join_field("city").to_string(), "orders[3].items[0].city");
    assert_eq!(path.last_key(), Some("country"));
    assert!(path.starts_with(&context));
}

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-z_][a-zA-Z0-9_]{0,8}".prop_map(Segment::Key),
        (0usize..500).prop_map(Segment::Index),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn form_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 8, 1, |inner| {
        (inner, "[A-Za-z ]{0,8}")
            .prop_map(|(value, label)| json!({ "value": value, "label": label }))
    })
}

proptest! {
    #[test]
    fn path_text_round_trips(segments in proptest::collection::vec(segment(), 0..6)) {
        let path = Path::from_segments(segments);
        let reparsed: Path = path.to_string().parse().expect("display output parses");
        prop_assert_eq!(reparsed, path);
    }

    #[test]
    fn extraction_is_idempotent(value in form_value()) {
        let once = extract_value(&value);
        prop_assert_eq!(extract_value(once), once);
    }

    #[test]
    fn resolved_paths_lead_back_to_values(countries in proptest::collection::vec("[A-Z]{2}", 0..6)) {
        let rows: Vec<Value> = countries.iter().map(|code| json!({ "country": code })).collect();
        let tree = json!({ "items": rows });
        let paths = find_field_paths(&tree, "country");

        prop_assert_eq!(paths.len(), countries.len());
        for (path, code) in paths.iter().zip(&countries) {
            let expected = json!(code);
            prop_assert_eq!(path.lookup(&tree), Some(&expected));
        }
    }
}
