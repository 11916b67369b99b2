use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, evaluate::EvaluateArgs, fields::FieldsArgs, paths::PathsArgs, replay::ReplayArgs,
};
use crate::config::{Config, OutputFormat, Settings};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "field-sync",
    about = "Evaluate and replay dynamic form field dependencies",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format (defaults to the config file, then text)
    #[arg(long, value_enum, global = true, env = "FIELD_SYNC_FORMAT")]
    format: Option<OutputFormat>,

    /// Config file to use instead of the per-user one
    #[arg(long, value_name = "PATH", global = true, env = "FIELD_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `field_sync=trace`
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one form-value snapshot against a schema
    Evaluate(EvaluateArgs),
    /// List every schema field with its full path
    Fields(FieldsArgs),
    /// Resolve every occurrence of a key in a value tree
    Paths(PathsArgs),
    /// Feed a JSONL stream of snapshots through the memoizing evaluator
    Replay(ReplayArgs),
    /// Print the JSON Schema of the field wire format
    Schema,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.log_level.as_deref(), config.log_level.as_deref());
    let settings = Settings::resolve(&config, cli.format);
    tracing::debug!(?settings, "resolved cli settings");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Evaluate(args) => cmd::evaluate::run(&args, &settings, &mut out),
        Commands::Fields(args) => cmd::fields::run(&args, &settings, &mut out),
        Commands::Paths(args) => cmd::paths::run(&args, &settings, &mut out),
        Commands::Replay(args) => cmd::replay::run(&args, &settings, &mut out),
        Commands::Schema => cmd::schema::run(&mut out),
    }
}
