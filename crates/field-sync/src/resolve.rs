use serde_json::Value;

use crate::path::Path;
use crate::value::is_option_object;

/// Finds every place `target_key` occurs as an object member inside a form-value tree.
///
/// The walk is depth-first in map order. Arrays contribute an `[index]` segment per
/// element, so a key repeated across rows yields one path per row. Select option
/// objects (`{ value, label }`) are leaves: their members are never reported.
pub fn find_field_paths(tree: &Value, target_key: &str) -> Vec<Path> {
    let mut found = Vec::new();
    walk(tree, target_key, &Path::root(), &mut found);
    found
}

fn walk(value: &Value, target_key: &str, current: &Path, found: &mut Vec<Path>) {
    match value {
        Value::Object(_) if is_option_object(value) => {}
        Value::Object(map) => {
            for (key, child) in map {
                let path = current.join_key(key);
                if key == target_key {
                    found.push(path.clone());
                }
                walk(child, target_key, &path, found);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, target_key, &current.join_index(index), found);
            }
        }
        _ => {}
    }
}

/// Resolved occurrences of `target_key` paired with the raw value stored there.
pub fn find_field_values<'a>(tree: &'a Value, target_key: &str) -> Vec<(Path, &'a Value)> {
    find_field_paths(tree, target_key)
        .into_iter()
        .filter_map(|path| path.lookup(tree).map(|value| (path, value)))
        .collect()
}
