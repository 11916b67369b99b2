pub mod evaluate;
pub mod fields;
pub mod paths;
pub mod replay;
pub mod schema;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use field_sync::EntitySchema;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn read_json(path: &Path, what: &str) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{what} {} must be valid JSON", path.display()))
}

pub(crate) fn load_schema(path: &Path) -> Result<EntitySchema> {
    let value = read_json(path, "schema")?;
    let schema = EntitySchema::from_value(value)
        .with_context(|| format!("schema {} is not a form schema", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        fields = schema.form_fields.len(),
        "loaded schema"
    );
    Ok(schema)
}

pub(crate) fn write_pretty<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Compact rendering of a JSON scalar: strings without quotes.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
