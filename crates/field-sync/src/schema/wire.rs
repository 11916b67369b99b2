//! JSON shape of server-supplied form schemas.
//!
//! These structs mirror the payload exactly as the backend sends it (camelCase keys,
//! `followedBy` as either a string or a list, `valueMaps` as untyped JSON). The typed
//! model in [`crate::schema::field`] and [`crate::schema::sync`] converts from and into
//! them, so serde never sees the tagged variants directly.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(mut values: Vec<T>) -> Self {
        if values.len() == 1 {
            OneOrMany::One(values.remove(0))
        } else {
            OneOrMany::Many(values)
        }
    }
}

/// Wire form of a field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldWire {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldWire>>,
    /// `object` or `array`; inferred from `type` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncWire>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Wire form of a field's `sync` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_on: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_by: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_maps: BTreeMap<String, Value>,
}

/// Accepts `"a"`, `["a", "b"]` or `null` for list-valued keys.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany<String>>::deserialize(deserializer)?;
    Ok(clean_keys(value))
}

/// Flattens an optional key list, dropping blank entries.
pub(crate) fn clean_keys(value: Option<OneOrMany<String>>) -> Vec<String> {
    value
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

/// JSON Schema describing [`FieldWire`], for schema authors and editor tooling.
pub fn wire_schema() -> schemars::Schema {
    schemars::schema_for!(FieldWire)
}
