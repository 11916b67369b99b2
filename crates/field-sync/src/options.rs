//! Turns remote lookup responses into option lists.
//!
//! The engine only describes lookups (see [`ApiConfig`]); performing the `GET` is
//! the host's job, abstracted here as an [`OptionSource`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::FetchError;
use crate::evaluate::EvaluationResult;
use crate::path::get_nested_value;
use crate::schema::{ApiConfig, FieldOption};

/// Something that can answer `GET <route>` with a JSON body.
pub trait OptionSource {
    fn fetch(&self, route: &str) -> Result<Value, FetchError>;
}

/// Canned responses keyed by route.
impl OptionSource for BTreeMap<String, Value> {
    fn fetch(&self, route: &str) -> Result<Value, FetchError> {
        self.get(route)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(route.to_string()))
    }
}

/// The list carried by a response: the body itself, or its `data`, `results` or
/// `items` array.
pub fn response_items(response: &Value) -> &[Value] {
    if let Some(items) = response.as_array() {
        return items;
    }
    ["data", "results", "items"]
        .iter()
        .find_map(|key| response.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Maps each response item to `{ value: item.id, label }`.
///
/// The label joins the `dataToShow` entries, each resolved as a dotted path against
/// the item; absent parts are skipped. Items without an `id` are dropped.
pub fn options_from_response(
    response: &Value,
    config: &ApiConfig,
    separator: &str,
) -> Vec<FieldOption> {
    response_items(response)
        .iter()
        .filter_map(|item| {
            let id = item.get("id").filter(|id| !id.is_null())?;
            let parts: Vec<String> = config
                .data_to_show
                .iter()
                .filter_map(|path| get_nested_value(item, path))
                .filter_map(label_text)
                .collect();
            let label = if parts.is_empty() {
                label_text(id).unwrap_or_default()
            } else {
                parts.join(separator)
            };
            Some(FieldOption::new(id.clone(), label))
        })
        .collect()
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Fetches every lookup named in `result` and returns options per address.
///
/// Each distinct route is fetched once. A failed fetch is logged and leaves the
/// addresses that needed it without options.
pub fn resolve_remote_options(
    result: &EvaluationResult,
    source: &dyn OptionSource,
    separator: &str,
) -> BTreeMap<String, Vec<FieldOption>> {
    let mut by_route: BTreeMap<&str, Vec<(&str, &ApiConfig)>> = BTreeMap::new();
    for (address, config) in &result.field_api_config {
        by_route
            .entry(config.data_route.as_str())
            .or_default()
            .push((address.as_str(), config));
    }

    let mut resolved = BTreeMap::new();
    for (route, targets) in by_route {
        let response = match source.fetch(route) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%route, error = %err, "remote option lookup failed");
                continue;
            }
        };
        for (address, config) in targets {
            resolved.insert(
                address.to_string(),
                options_from_response(&response, config, separator),
            );
        }
    }
    resolved
}
