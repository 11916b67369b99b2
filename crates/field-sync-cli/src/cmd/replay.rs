use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use field_sync::{EvaluationResult, MemoizedEvaluator};
use serde::Serialize;
use serde_json::Value;

use crate::cmd::load_schema;
use crate::config::{OutputFormat, Settings};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Entity payload or bare field array
    #[arg(long, value_name = "schema.json")]
    pub schema: PathBuf,
    /// One JSON form-value snapshot per line
    #[arg(long, value_name = "events.jsonl")]
    pub events: PathBuf,
}

#[derive(Debug, Serialize)]
struct Change<'a> {
    snapshot: usize,
    result: &'a EvaluationResult,
}

#[derive(Debug, Serialize)]
struct Summary {
    snapshots: usize,
    evaluations: u64,
}

pub fn run(args: &ReplayArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let raw = fs::read_to_string(&args.events)
        .with_context(|| format!("failed to read events {}", args.events.display()))?;

    let mut memo = MemoizedEvaluator::new();
    let mut last: Option<EvaluationResult> = None;
    let mut snapshots = 0;
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values: Value = serde_json::from_str(line).with_context(|| {
            format!("events {} line {} must be valid JSON", args.events.display(), index + 1)
        })?;
        snapshots += 1;

        let result = memo.evaluate(&schema.form_fields, &values);
        if last.as_ref() == Some(result) {
            continue;
        }
        write_change(out, settings.format, snapshots, result)?;
        last = Some(result.clone());
    }

    let summary = Summary {
        snapshots,
        evaluations: memo.evaluation_count(),
    };
    match settings.format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&summary)?)?,
        OutputFormat::Text => writeln!(
            out,
            "snapshots: {}, evaluations: {}",
            summary.snapshots, summary.evaluations
        )?,
    }
    Ok(())
}

fn write_change(
    out: &mut dyn Write,
    format: OutputFormat,
    snapshot: usize,
    result: &EvaluationResult,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string(&Change { snapshot, result })?)?;
        }
        OutputFormat::Text => {
            let visible: Vec<&str> = result.visible_fields.iter().map(String::as_str).collect();
            write!(out, "#{snapshot} visible: {}", visible.join(", "))?;
            if !result.field_options.is_empty() {
                let addresses: Vec<&str> = result.field_options.keys().map(String::as_str).collect();
                write!(out, "; options: {}", addresses.join(", "))?;
            }
            if !result.dynamic_fields.is_empty() {
                let addresses: Vec<&str> = result.dynamic_fields.keys().map(String::as_str).collect();
                write!(out, "; generated: {}", addresses.join(", "))?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
