//! Recomputes field visibility, option lists, remote lookups and generated fields
//! from a schema and the current form values.
//!
//! One call is one pass over the flattened schema:
//!
//! 1. fields without a `dependentOn` rule start visible;
//! 2. every field with `dependentOn` reads its controllers' values and applies its
//!    own `valueMaps` to itself;
//! 3. every field with `followedBy` reads its own value and applies its `valueMaps`
//!    to the fields it controls.
//!
//! Step 2 completes before step 3 starts and both write the same result sets, so a
//! later write for an address replaces an earlier one. Nothing here fails: missing
//! controllers, unmatched values and malformed actions leave addresses untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::field_map::{FieldEntry, build_field_map};
use crate::path::Path;
use crate::resolve::find_field_values;
use crate::schema::{
    ApiConfig, FieldDefinition, FieldOption, GenerateAction, SyncBehavior, SyncRule, UpdateField,
    ValueUpdateAction,
};
use crate::value::{extract_value, trigger_key};

/// Outcome of one evaluation, keyed by textual path and by bare key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub visible_fields: BTreeSet<String>,
    pub dynamic_fields: BTreeMap<String, FieldDefinition>,
    pub field_options: BTreeMap<String, Vec<FieldOption>>,
    pub field_api_config: BTreeMap<String, ApiConfig>,
    /// Structured path behind each `dynamic_fields` address; keys containing `.` or
    /// `[` do not survive a trip through the text form.
    #[serde(skip)]
    generated_paths: BTreeMap<String, Path>,
}

impl EvaluationResult {
    pub fn is_field_visible(&self, address: &str) -> bool {
        self.visible_fields.contains(address)
    }

    pub fn options(&self, address: &str) -> Option<&[FieldOption]> {
        self.field_options.get(address).map(Vec::as_slice)
    }

    pub fn api_config(&self, address: &str) -> Option<&ApiConfig> {
        self.field_api_config.get(address)
    }

    pub fn dynamic_field(&self, address: &str) -> Option<&FieldDefinition> {
        self.dynamic_fields.get(address)
    }

    fn show(&mut self, addresses: &Addresses) {
        for address in addresses.iter() {
            self.visible_fields.insert(address.to_string());
        }
    }

    fn set_options(&mut self, addresses: &Addresses, options: &[FieldOption]) {
        for address in addresses.iter() {
            self.field_api_config.remove(address);
            self.field_options
                .insert(address.to_string(), options.to_vec());
        }
    }

    fn set_api_config(&mut self, addresses: &Addresses, config: &ApiConfig) {
        for address in addresses.iter() {
            self.field_options.remove(address);
            self.field_api_config
                .insert(address.to_string(), config.clone());
        }
    }

    fn clear_options(&mut self, addresses: &Addresses) {
        for address in addresses.iter() {
            self.field_options.remove(address);
            self.field_api_config.remove(address);
        }
    }

    fn insert_generated(&mut self, addresses: &Addresses, field: &FieldDefinition) {
        for (address, path) in addresses.entries() {
            self.dynamic_fields
                .insert(address.to_string(), field.clone());
            self.generated_paths
                .insert(address.to_string(), path.clone());
            self.visible_fields.insert(address.to_string());
        }
    }

    /// Visibility is only withdrawn from addresses that were generated, so removal
    /// never hides a static schema field.
    fn remove_generated(&mut self, addresses: &Addresses) {
        for address in addresses.iter() {
            if self.dynamic_fields.remove(address).is_some() {
                self.generated_paths.remove(address);
                self.visible_fields.remove(address);
            }
        }
    }

    /// Drops every generated field nested under `context`.
    fn purge_generated_under(&mut self, context: &Path) {
        let stale: Vec<(String, Path)> = self
            .generated_paths
            .iter()
            .filter(|(_, path)| path.len() > context.len() && path.starts_with(context))
            .map(|(address, path)| (address.clone(), path.clone()))
            .collect();
        let addresses = Addresses(stale);
        self.remove_generated(&addresses);
    }
}

/// Ordered set of addresses for one logical field, de-duplicated by text.
#[derive(Debug, Default)]
struct Addresses(Vec<(String, Path)>);

impl Addresses {
    fn push(&mut self, path: Path) {
        let address = path.to_string();
        if !address.is_empty() && !self.0.iter().any(|(known, _)| *known == address) {
            self.0.push((address, path));
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(address, _)| address.as_str())
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(address, path)| (address.as_str(), path))
    }

    /// A rule-owning field: its schema path, its bare key and, when the controller
    /// sits inside a row, the row-specific path.
    fn for_dependent(entry: &FieldEntry<'_>, context: Option<&Path>) -> Self {
        let mut addresses = Self::default();
        addresses.push(entry.path.clone());
        addresses.push(Path::root().join_key(&entry.field.key));
        if let Some(context) = context.filter(|context| !context.is_root()) {
            addresses.push(context.join_field(&entry.field.key));
        }
        addresses
    }

    /// A field addressed relative to a controller: exact row path, index-free path,
    /// bare key.
    fn in_context(context: &Path, key: &str) -> Self {
        let mut addresses = Self::default();
        addresses.push(context.join_field(key));
        addresses.push(context.without_indices().join_field(key));
        addresses.push(Path::root().join_key(key));
        addresses
    }
}

/// Runs all passes over `fields` against `values`.
pub fn evaluate(fields: &[FieldDefinition], values: &Value) -> EvaluationResult {
    let map = build_field_map(fields);
    let mut result = EvaluationResult::default();

    for entry in map.entries() {
        let listens = entry
            .field
            .sync
            .as_ref()
            .is_some_and(|rule| !rule.dependent_on.is_empty());
        if !listens {
            result.visible_fields.insert(entry.path.to_string());
            result.visible_fields.insert(entry.field.key.clone());
        }
    }

    for entry in map.entries() {
        if let Some(rule) = &entry.field.sync
            && !rule.dependent_on.is_empty()
        {
            apply_dependent(&mut result, &entry, rule, values);
        }
    }

    for entry in map.entries() {
        if let Some(rule) = &entry.field.sync
            && !rule.followed_by.is_empty()
        {
            apply_controller(&mut result, &entry, rule, values);
        }
    }

    tracing::debug!(
        fields = map.len(),
        visible = result.visible_fields.len(),
        dynamic = result.dynamic_fields.len(),
        options = result.field_options.len(),
        lookups = result.field_api_config.len(),
        "evaluated field dependencies"
    );
    result
}

/// The row context a controller value lives in: its path minus its own key.
fn parent_context(path: &Path, controller_key: &str) -> Path {
    path.strip_key_suffix(controller_key)
        .or_else(|| path.parent())
        .unwrap_or_default()
}

fn apply_dependent(
    result: &mut EvaluationResult,
    entry: &FieldEntry<'_>,
    rule: &SyncRule,
    values: &Value,
) {
    let field = entry.field;
    let mut matched = false;
    let mut contexts = Vec::new();

    for controller in &rule.dependent_on {
        for (path, raw) in find_field_values(values, controller) {
            let context = parent_context(&path, controller);
            let trigger = trigger_key(extract_value(raw));
            contexts.push(context.clone());
            let Some(trigger) = trigger else {
                continue;
            };

            match &rule.behavior {
                SyncBehavior::Restriction(maps) => {
                    if let Some(action) = maps.get(&trigger) {
                        matched = true;
                        if action.show.iter().any(|key| key == &field.key) {
                            tracing::trace!(field = %entry.path, %controller, %trigger, "restriction grants visibility");
                            result.show(&Addresses::for_dependent(entry, Some(&context)));
                        }
                    }
                }
                SyncBehavior::ValueUpdate(maps) => {
                    if let Some(action) = maps.get(&trigger) {
                        matched = true;
                        let addresses = Addresses::for_dependent(entry, Some(&context));
                        result.show(&addresses);
                        apply_value_update(result, &addresses, action, &field.key);
                    }
                }
                SyncBehavior::DynamicFieldGen(maps) => {
                    if let Some(action) = maps.get(&trigger) {
                        matched = true;
                        let mut removal_keys = rule.behavior.generated_keys();
                        removal_keys.push(&field.key);
                        apply_generation(result, &context, action, &removal_keys);
                    }
                }
                SyncBehavior::Unrecognized {
                    dependency_type, ..
                } => {
                    tracing::warn!(
                        field = %entry.path,
                        dependency_type = dependency_type.as_deref().unwrap_or("<missing>"),
                        "ignoring sync rule with unrecognized dependency type"
                    );
                    return;
                }
            }
        }
    }

    if matched {
        return;
    }
    match &rule.behavior {
        SyncBehavior::ValueUpdate(_) => {
            let mut addresses = Addresses::for_dependent(entry, None);
            for context in contexts.iter().filter(|context| !context.is_root()) {
                addresses.push(context.join_field(&field.key));
            }
            result.show(&addresses);
            result.clear_options(&addresses);
        }
        // Generated fields stay until a present trigger maps to a removal action, so a
        // controller that is momentarily empty does not make them flicker.
        SyncBehavior::DynamicFieldGen(_) => {
            tracing::trace!(field = %entry.path, "no trigger matched; keeping generated fields");
        }
        SyncBehavior::Restriction(_) | SyncBehavior::Unrecognized { .. } => {}
    }
}

fn apply_controller(
    result: &mut EvaluationResult,
    entry: &FieldEntry<'_>,
    rule: &SyncRule,
    values: &Value,
) {
    let key = &entry.field.key;
    let occurrences = find_field_values(values, key);

    if occurrences.is_empty() {
        if let SyncBehavior::ValueUpdate(_) = &rule.behavior {
            for followed in &rule.followed_by {
                result.clear_options(&Addresses::in_context(&Path::root(), followed));
            }
        }
        return;
    }

    for (path, raw) in occurrences {
        let context = parent_context(&path, key);
        let trigger = trigger_key(extract_value(raw));

        match &rule.behavior {
            SyncBehavior::Restriction(maps) => {
                let Some(action) = trigger.and_then(|trigger| maps.get(&trigger)) else {
                    continue;
                };
                for followed in &rule.followed_by {
                    if action.show.contains(followed) {
                        result.show(&Addresses::in_context(&context, followed));
                    }
                }
            }
            SyncBehavior::ValueUpdate(maps) => {
                match trigger.and_then(|trigger| maps.get(&trigger)) {
                    Some(action) => {
                        for followed in &rule.followed_by {
                            let addresses = Addresses::in_context(&context, followed);
                            result.show(&addresses);
                            apply_value_update(result, &addresses, action, followed);
                        }
                    }
                    None => {
                        for followed in &rule.followed_by {
                            result.clear_options(&Addresses::in_context(&context, followed));
                        }
                    }
                }
            }
            SyncBehavior::DynamicFieldGen(maps) => {
                match trigger.and_then(|trigger| maps.get(&trigger)) {
                    Some(action) => {
                        let mut removal_keys = rule.behavior.generated_keys();
                        removal_keys.extend(rule.followed_by.iter().map(String::as_str));
                        apply_generation(result, &context, action, &removal_keys);
                    }
                    None => {
                        tracing::trace!(controller = %path, "no trigger matched; purging generated fields");
                        result.purge_generated_under(&context);
                    }
                }
            }
            SyncBehavior::Unrecognized {
                dependency_type, ..
            } => {
                tracing::warn!(
                    field = %entry.path,
                    dependency_type = dependency_type.as_deref().unwrap_or("<missing>"),
                    "ignoring sync rule with unrecognized dependency type"
                );
                return;
            }
        }
    }
}

fn apply_value_update(
    result: &mut EvaluationResult,
    addresses: &Addresses,
    action: &ValueUpdateAction,
    target_key: &str,
) {
    if let Some(options) = &action.options {
        result.set_options(addresses, options);
    } else if let Some(update) = &action.update_field {
        match update {
            UpdateField::Remote(config) => {
                let config = config.clone().with_default_populated_key(target_key);
                result.set_api_config(addresses, &config);
            }
            UpdateField::Values { values } => result.set_options(addresses, values),
        }
    }
}

fn apply_generation(
    result: &mut EvaluationResult,
    context: &Path,
    action: &GenerateAction,
    removal_keys: &[&str],
) {
    match &action.generate_field {
        Some(generated) => {
            tracing::trace!(%context, key = %generated.key, "generating field");
            result.insert_generated(&Addresses::in_context(context, &generated.key), generated);
        }
        None => {
            for key in removal_keys {
                result.remove_generated(&Addresses::in_context(context, key));
            }
        }
    }
}
