use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::{Value, json};

use field_sync_cli::cmd::{evaluate, fields, replay};
use field_sync_cli::{OutputFormat, Settings};

fn json_settings() -> Settings {
    Settings {
        format: OutputFormat::Json,
        ..Settings::default()
    }
}

#[test]
fn evaluate_json_matches_engine_result() {
    let temp = TempDir::new().unwrap();
    temp.child("order.json")
        .write_str(include_str!("fixtures/order_form.json"))
        .unwrap();
    temp.child("values.json")
        .write_str(include_str!("fixtures/order_values.json"))
        .unwrap();

    let args = evaluate::EvaluateArgs {
        schema: temp.path().join("order.json"),
        values: temp.path().join("values.json"),
        lookups: None,
    };
    let mut out = Vec::new();
    evaluate::run(&args, &json_settings(), &mut out).expect("evaluate should succeed");

    let json: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["fieldOptions"]["items[0].city"][0]["value"], "ktm");
    assert_eq!(json["fieldOptions"]["items[1].city"][0]["value"], "nyc");
    assert_eq!(json["dynamicFields"]["items[0].giftNote"]["type"], "text");
    assert!(json["dynamicFields"].get("giftNote").is_none());
}

#[test]
fn evaluate_rejects_lookups_that_are_not_route_maps() {
    let temp = TempDir::new().unwrap();
    temp.child("location.json")
        .write_str(include_str!("fixtures/location_form.json"))
        .unwrap();
    temp.child("values.json").write_str("{}").unwrap();
    temp.child("lookups.json").write_str("[1, 2]").unwrap();

    let args = evaluate::EvaluateArgs {
        schema: temp.path().join("location.json"),
        values: temp.path().join("values.json"),
        lookups: Some(temp.path().join("lookups.json")),
    };
    let err = evaluate::run(&args, &Settings::default(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("must map routes to responses"));
}

#[test]
fn fields_json_reports_shapes_and_rules() {
    let temp = TempDir::new().unwrap();
    temp.child("location.json")
        .write_str(include_str!("fixtures/location_form.json"))
        .unwrap();

    let args = fields::FieldsArgs {
        schema: temp.path().join("location.json"),
    };
    let mut out = Vec::new();
    fields::run(&args, &json_settings(), &mut out).expect("fields should succeed");

    let json: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        json,
        json!([
            {
                "path": "country",
                "key": "country",
                "label": "Country",
                "shape": "leaf",
                "dependencyType": "value_update"
            },
            { "path": "city", "key": "city", "label": "City", "shape": "leaf" }
        ])
    );
}

#[test]
fn replay_json_lines_and_bad_lines() {
    let temp = TempDir::new().unwrap();
    temp.child("location.json")
        .write_str(include_str!("fixtures/location_form.json"))
        .unwrap();
    temp.child("events.jsonl")
        .write_str(include_str!("fixtures/location_events.jsonl"))
        .unwrap();

    let args = replay::ReplayArgs {
        schema: temp.path().join("location.json"),
        events: temp.path().join("events.jsonl"),
    };
    let mut out = Vec::new();
    replay::run(&args, &json_settings(), &mut out).expect("replay should succeed");

    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["snapshot"], 1);
    assert_eq!(lines[1]["snapshot"], 4);
    assert_eq!(lines[1]["result"]["fieldOptions"]["city"][0]["label"], "Tokyo");
    assert_eq!(lines[2], json!({ "snapshots": 4, "evaluations": 3 }));

    temp.child("broken.jsonl")
        .write_str("{\"country\":\"NP\"}\n{oops\n")
        .unwrap();
    let args = replay::ReplayArgs {
        events: temp.path().join("broken.jsonl"),
        ..args
    };
    let err = replay::run(&args, &json_settings(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}
