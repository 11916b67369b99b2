use serde_json::Value;

/// Normalizes a form value to the thing rules compare against.
///
/// Selection controls emit `{ "value": .., "label": .. }`; those are unwrapped (nested
/// wrappers included) down to the inner value. Everything else, `null` included, is
/// returned as is.
pub fn extract_value(raw: &Value) -> &Value {
    let mut current = raw;
    while let Some(inner) = current.as_object().and_then(|map| map.get("value")) {
        current = inner;
    }
    current
}

/// Key used to look an extracted value up in a `valueMaps` table.
///
/// Strings match verbatim, numbers and booleans by their JSON text. `null`, arrays
/// and objects never match.
pub fn trigger_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// True for the `{ value, label }` objects produced by selection controls.
pub fn is_option_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("value") && map.contains_key("label"))
}
