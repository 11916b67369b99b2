use serde_json::{Map, Value};

use crate::value::{extract_value, is_option_object};

/// Shapes form values for a `POST`/`PUT` body.
///
/// Option objects collapse to their value and arrays of them to value arrays, at any
/// depth. Plain nested objects keep their structure.
pub fn submission_values(values: &Value) -> Value {
    match values {
        value if is_option_object(value) => submission_values(extract_value(value)),
        Value::Array(items) => Value::Array(items.iter().map(submission_values).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), submission_values(value)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}
