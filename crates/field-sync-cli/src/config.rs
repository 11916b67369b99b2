use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::Deserialize;

pub const DEFAULT_LABEL_SEPARATOR: &str = " ";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: Option<String>,
    pub format: Option<OutputFormat>,
    pub label_separator: Option<String>,
}

impl Config {
    /// Loads `explicit` when given (it must exist), otherwise the per-user config file
    /// if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("config {} is not valid", path.display()))
    }
}

/// `<config dir>/field-sync/config.toml` on this platform.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "field-sync").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Effective output settings after flags override the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub format: OutputFormat,
    pub label_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            label_separator: DEFAULT_LABEL_SEPARATOR.to_string(),
        }
    }
}

impl Settings {
    pub fn resolve(config: &Config, format: Option<OutputFormat>) -> Self {
        Self {
            format: format.or(config.format).unwrap_or_default(),
            label_separator: config
                .label_separator
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL_SEPARATOR.to_string()),
        }
    }
}
