use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::sync::SyncRule;
use crate::schema::wire::FieldWire;

/// Leaf input or container of child fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    Leaf,
    Object { children: Vec<FieldDefinition> },
    Array { children: Vec<FieldDefinition> },
}

/// A node of the form schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldWire", into = "FieldWire")]
pub struct FieldDefinition {
    pub key: String,
    pub label: Option<String>,
    pub field_type: Option<String>,
    pub sync: Option<SyncRule>,
    pub shape: FieldShape,
    /// Presentation props the engine does not interpret (placeholder, required, ...).
    pub extra: BTreeMap<String, Value>,
}

impl FieldDefinition {
    pub fn leaf(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            field_type: None,
            sync: None,
            shape: FieldShape::Leaf,
            extra: BTreeMap::new(),
        }
    }

    pub fn object(key: impl Into<String>, children: Vec<FieldDefinition>) -> Self {
        Self {
            shape: FieldShape::Object { children },
            ..Self::leaf(key)
        }
    }

    pub fn array(key: impl Into<String>, children: Vec<FieldDefinition>) -> Self {
        Self {
            shape: FieldShape::Array { children },
            ..Self::leaf(key)
        }
    }

    pub fn with_sync(mut self, sync: SyncRule) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn children(&self) -> &[FieldDefinition] {
        match &self.shape {
            FieldShape::Leaf => &[],
            FieldShape::Object { children } | FieldShape::Array { children } => children,
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.shape, FieldShape::Leaf)
    }
}

impl From<FieldWire> for FieldDefinition {
    fn from(wire: FieldWire) -> Self {
        let shape = match wire.children {
            None => FieldShape::Leaf,
            Some(children) => {
                let children = children.into_iter().map(FieldDefinition::from).collect();
                let container = wire
                    .container_type
                    .as_deref()
                    .or(wire.field_type.as_deref());
                if container == Some("array") {
                    FieldShape::Array { children }
                } else {
                    FieldShape::Object { children }
                }
            }
        };
        Self {
            key: wire.key,
            label: wire.label,
            field_type: wire.field_type,
            sync: wire.sync.map(SyncRule::from),
            shape,
            extra: wire.extra,
        }
    }
}

impl From<FieldDefinition> for FieldWire {
    fn from(field: FieldDefinition) -> Self {
        let (children, container_type) = match field.shape {
            FieldShape::Leaf => (None, None),
            FieldShape::Object { children } => (Some(children), Some("object")),
            FieldShape::Array { children } => (Some(children), Some("array")),
        };
        Self {
            key: field.key,
            label: field.label,
            field_type: field.field_type,
            children: children.map(|items| items.into_iter().map(FieldWire::from).collect()),
            container_type: container_type.map(str::to_string),
            sync: field.sync.map(Into::into),
            extra: field.extra,
        }
    }
}
