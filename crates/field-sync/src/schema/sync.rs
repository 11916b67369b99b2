use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::field::FieldDefinition;
use crate::schema::wire::{OneOrMany, SyncWire, clean_keys, one_or_many};

/// Which evaluator branch a sync rule drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyType {
    Restriction,
    ValueUpdate,
    DynamicFieldGen,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Restriction => "restriction",
            DependencyType::ValueUpdate => "value_update",
            DependencyType::DynamicFieldGen => "dynamicFieldGen",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "restriction" => Some(DependencyType::Restriction),
            "value_update" => Some(DependencyType::ValueUpdate),
            "dynamicFieldGen" => Some(DependencyType::DynamicFieldGen),
            _ => None,
        }
    }
}

/// Option pair offered by a selection control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(alias = "Value")]
    pub value: Value,
    #[serde(alias = "Label", default, deserialize_with = "scalar_label")]
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

fn scalar_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Option lists keep their well-formed entries; an entry without a `value` is dropped
/// on its own.
fn option_list<'de, D>(deserializer: D) -> Result<Vec<FieldOption>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(keep_options(Vec::<Value>::deserialize(deserializer)?))
}

fn optional_option_list<'de, D>(deserializer: D) -> Result<Option<Vec<FieldOption>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.map(keep_options))
}

fn keep_options(items: Vec<Value>) -> Vec<FieldOption> {
    items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .inspect_err(|err| tracing::debug!(error = %err, "dropping malformed option"))
                .ok()
        })
        .collect()
}

/// Remote lookup that populates a field's options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub data_route: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub data_to_show: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub populated_key: Option<String>,
}

impl ApiConfig {
    /// Fills `populated_key` with the owning field's key when the rule left it unset.
    pub fn with_default_populated_key(mut self, field_key: &str) -> Self {
        if self.populated_key.as_deref().is_none_or(str::is_empty) {
            self.populated_key = Some(field_key.to_string());
        }
        self
    }
}

/// `updateField` payload of a `value_update` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateField {
    Remote(ApiConfig),
    Values {
        #[serde(deserialize_with = "option_list")]
        values: Vec<FieldOption>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestrictionAction {
    #[serde(default, deserialize_with = "one_or_many")]
    pub show: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueUpdateAction {
    #[serde(
        default,
        deserialize_with = "optional_option_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_field: Option<UpdateField>,
}

/// A `dynamicFieldGen` action; no `generate_field` means "remove what was generated".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_field: Option<FieldDefinition>,
}

/// Trigger value -> action tables, one variant per dependency type.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncBehavior {
    Restriction(BTreeMap<String, RestrictionAction>),
    ValueUpdate(BTreeMap<String, ValueUpdateAction>),
    DynamicFieldGen(BTreeMap<String, GenerateAction>),
    /// A `dependencyType` this engine does not know; kept so it round-trips.
    Unrecognized {
        dependency_type: Option<String>,
        value_maps: BTreeMap<String, Value>,
    },
}

impl SyncBehavior {
    pub fn dependency_type(&self) -> Option<DependencyType> {
        match self {
            SyncBehavior::Restriction(_) => Some(DependencyType::Restriction),
            SyncBehavior::ValueUpdate(_) => Some(DependencyType::ValueUpdate),
            SyncBehavior::DynamicFieldGen(_) => Some(DependencyType::DynamicFieldGen),
            SyncBehavior::Unrecognized { .. } => None,
        }
    }

    /// Every field key a `dynamicFieldGen` table can synthesize.
    pub fn generated_keys(&self) -> Vec<&str> {
        match self {
            SyncBehavior::DynamicFieldGen(maps) => maps
                .values()
                .filter_map(|action| action.generate_field.as_ref())
                .map(|field| field.key.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Dependency declaration attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRule {
    /// Controllers this field listens to.
    pub dependent_on: Vec<String>,
    /// Fields this field controls.
    pub followed_by: Vec<String>,
    pub behavior: SyncBehavior,
}

impl SyncRule {
    pub fn dependency_type(&self) -> Option<DependencyType> {
        self.behavior.dependency_type()
    }
}

impl From<SyncWire> for SyncRule {
    fn from(wire: SyncWire) -> Self {
        let kind = wire.dependency_type.as_deref().and_then(DependencyType::parse);
        let behavior = match kind {
            Some(DependencyType::Restriction) => {
                SyncBehavior::Restriction(parse_actions(wire.value_maps))
            }
            Some(DependencyType::ValueUpdate) => {
                SyncBehavior::ValueUpdate(parse_actions(wire.value_maps))
            }
            Some(DependencyType::DynamicFieldGen) => {
                SyncBehavior::DynamicFieldGen(parse_actions(wire.value_maps))
            }
            None => SyncBehavior::Unrecognized {
                dependency_type: wire.dependency_type,
                value_maps: wire.value_maps,
            },
        };
        Self {
            dependent_on: clean_keys(wire.dependent_on),
            followed_by: clean_keys(wire.followed_by),
            behavior,
        }
    }
}

impl From<SyncRule> for SyncWire {
    fn from(rule: SyncRule) -> Self {
        let (dependency_type, value_maps) = match rule.behavior {
            SyncBehavior::Restriction(maps) => (
                Some(DependencyType::Restriction.as_str().into()),
                encode_actions(maps),
            ),
            SyncBehavior::ValueUpdate(maps) => (
                Some(DependencyType::ValueUpdate.as_str().into()),
                encode_actions(maps),
            ),
            SyncBehavior::DynamicFieldGen(maps) => (
                Some(DependencyType::DynamicFieldGen.as_str().into()),
                encode_actions(maps),
            ),
            SyncBehavior::Unrecognized {
                dependency_type,
                value_maps,
            } => (dependency_type, value_maps),
        };
        Self {
            dependent_on: non_empty(rule.dependent_on),
            followed_by: non_empty(rule.followed_by),
            dependency_type,
            value_maps,
        }
    }
}

fn non_empty(keys: Vec<String>) -> Option<OneOrMany<String>> {
    if keys.is_empty() {
        None
    } else {
        Some(OneOrMany::from(keys))
    }
}

/// Entries that do not fit the action shape become the empty action, so a typo in
/// one trigger value degrades to "no effect" instead of rejecting the schema.
fn parse_actions<A>(maps: BTreeMap<String, Value>) -> BTreeMap<String, A>
where
    A: for<'de> Deserialize<'de> + Default,
{
    maps.into_iter()
        .map(|(trigger, raw)| {
            let action = serde_json::from_value(raw).unwrap_or_else(|err| {
                tracing::debug!(%trigger, error = %err, "valueMaps entry does not fit its action shape");
                A::default()
            });
            (trigger, action)
        })
        .collect()
}

fn encode_actions<A: Serialize>(maps: BTreeMap<String, A>) -> BTreeMap<String, Value> {
    maps.into_iter()
        .map(|(trigger, action)| (trigger, serde_json::to_value(action).unwrap_or_default()))
        .collect()
}
