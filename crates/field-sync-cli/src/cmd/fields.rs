use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use field_sync::{FieldShape, build_field_map};
use serde::Serialize;

use crate::cmd::{load_schema, write_pretty};
use crate::config::{OutputFormat, Settings};

#[derive(Args, Debug, Clone)]
pub struct FieldsArgs {
    /// Entity payload or bare field array
    #[arg(long, value_name = "schema.json")]
    pub schema: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldRow<'a> {
    path: String,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    shape: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency_type: Option<&'static str>,
}

pub fn run(args: &FieldsArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let map = build_field_map(&schema.form_fields);
    let rows: Vec<FieldRow<'_>> = map
        .entries()
        .map(|entry| FieldRow {
            path: entry.path.to_string(),
            key: &entry.field.key,
            label: entry.field.label.as_deref(),
            shape: match entry.field.shape {
                FieldShape::Leaf => "leaf",
                FieldShape::Object { .. } => "object",
                FieldShape::Array { .. } => "array",
            },
            dependency_type: entry
                .field
                .sync
                .as_ref()
                .and_then(|rule| rule.dependency_type())
                .map(|kind| kind.as_str()),
        })
        .collect();

    match settings.format {
        OutputFormat::Json => write_pretty(out, &rows),
        OutputFormat::Text => {
            for row in &rows {
                write!(out, "{}\t{}", row.path, row.shape)?;
                if let Some(kind) = row.dependency_type {
                    write!(out, "\t{kind}")?;
                }
                writeln!(out)?;
            }
            Ok(())
        }
    }
}
