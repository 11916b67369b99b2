pub mod field;
pub mod sync;
pub mod wire;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

pub use field::{FieldDefinition, FieldShape};
pub use sync::{
    ApiConfig, DependencyType, FieldOption, GenerateAction, RestrictionAction, SyncBehavior,
    SyncRule, UpdateField, ValueUpdateAction,
};
pub use wire::{FieldWire, OneOrMany, SyncWire, wire_schema};

/// Per-entity payload served by `GET /api/v1/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    #[serde(default)]
    pub form_fields: Vec<FieldDefinition>,
    /// Stats, table columns and filters for the dashboard view; not read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_config: Option<Value>,
}

impl EntitySchema {
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Accepts the entity object or a bare array of field definitions.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        if value.is_array() {
            return Ok(Self {
                form_fields: serde_json::from_value(value)?,
                dashboard_config: None,
            });
        }
        let is_entity = value
            .as_object()
            .is_some_and(|map| map.contains_key("formFields"));
        if !is_entity {
            return Err(SchemaError::UnexpectedShape);
        }
        Ok(serde_json::from_value(value)?)
    }
}
