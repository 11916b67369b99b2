use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use field_sync::{EvaluationResult, FieldOption, evaluate, resolve_remote_options};
use serde::Serialize;
use serde_json::Value;

use crate::cmd::{display_value, load_schema, read_json, write_pretty};
use crate::config::{OutputFormat, Settings};

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Entity payload or bare field array
    #[arg(long, value_name = "schema.json")]
    pub schema: PathBuf,
    /// Current form values
    #[arg(long, value_name = "values.json")]
    pub values: PathBuf,
    /// JSON object of route -> response, used to fill remote option lookups
    #[arg(long, value_name = "lookups.json")]
    pub lookups: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateOutput<'a> {
    #[serde(flatten)]
    result: &'a EvaluationResult,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    resolved_options: BTreeMap<String, Vec<FieldOption>>,
}

pub fn run(args: &EvaluateArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let values = read_json(&args.values, "values")?;
    let result = evaluate(&schema.form_fields, &values);

    let resolved_options = match &args.lookups {
        Some(path) => {
            let lookups: BTreeMap<String, Value> = serde_json::from_value(read_json(path, "lookups")?)
                .with_context(|| format!("lookups {} must map routes to responses", path.display()))?;
            resolve_remote_options(&result, &lookups, &settings.label_separator)
        }
        None => BTreeMap::new(),
    };

    let output = EvaluateOutput {
        result: &result,
        resolved_options,
    };
    match settings.format {
        OutputFormat::Json => write_pretty(out, &output),
        OutputFormat::Text => write_text(out, &output),
    }
}

fn write_text(out: &mut dyn Write, output: &EvaluateOutput<'_>) -> Result<()> {
    let visible: Vec<&str> = output.result.visible_fields.iter().map(String::as_str).collect();
    writeln!(out, "visible: {}", visible.join(", "))?;
    for (address, options) in &output.result.field_options {
        writeln!(out, "options {address}: {}", render_options(options))?;
    }
    for (address, config) in &output.result.field_api_config {
        writeln!(
            out,
            "lookup {address}: GET {} [{}]",
            config.data_route,
            config.data_to_show.join(", ")
        )?;
    }
    for (address, field) in &output.result.dynamic_fields {
        let label = field.label.as_deref().unwrap_or(&field.key);
        writeln!(out, "generated {address}: {label}")?;
    }
    for (address, options) in &output.resolved_options {
        writeln!(out, "resolved {address}: {}", render_options(options))?;
    }
    Ok(())
}

fn render_options(options: &[FieldOption]) -> String {
    options
        .iter()
        .map(|option| format!("{}={}", display_value(&option.value), option.label))
        .collect::<Vec<_>>()
        .join(", ")
}
