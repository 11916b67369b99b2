use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "warn";

/// Installs the stderr subscriber. `RUST_LOG` wins over `--log-level`, which wins over
/// the config file.
pub fn init(cli_level: Option<&str>, config_level: Option<&str>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = directive(env.as_deref(), cli_level, config_level);
    let (filter, rejected) = match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_LEVEL), Some((directive.to_string(), err))),
    };

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Some((directive, err)) = rejected {
        tracing::warn!(%directive, error = %err, "ignoring invalid log filter");
    }
}

fn directive<'a>(
    env: Option<&'a str>,
    cli_level: Option<&'a str>,
    config_level: Option<&'a str>,
) -> &'a str {
    [env, cli_level, config_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
}
