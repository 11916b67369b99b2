use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use field_sync::{extract_value, find_field_values};
use serde::Serialize;
use serde_json::Value;

use crate::cmd::{read_json, write_pretty};
use crate::config::{OutputFormat, Settings};

#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    /// Form values to search
    #[arg(long, value_name = "values.json")]
    pub values: PathBuf,
    /// Field key to look for at any depth
    #[arg(long)]
    pub key: String,
}

#[derive(Debug, Serialize)]
struct Occurrence<'a> {
    path: String,
    value: &'a Value,
}

pub fn run(args: &PathsArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let values = read_json(&args.values, "values")?;
    let found: Vec<Occurrence<'_>> = find_field_values(&values, &args.key)
        .into_iter()
        .map(|(path, raw)| Occurrence {
            path: path.to_string(),
            value: extract_value(raw),
        })
        .collect();
    if found.is_empty() {
        tracing::info!(key = %args.key, "key does not occur in the values");
    }

    match settings.format {
        OutputFormat::Json => write_pretty(out, &found),
        OutputFormat::Text => {
            for occurrence in &found {
                writeln!(out, "{} = {}", occurrence.path, occurrence.value)?;
            }
            Ok(())
        }
    }
}
