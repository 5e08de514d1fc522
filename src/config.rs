use crate::cli::Cli;
use crate::core::{InspectError, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Table inspected when neither the CLI nor the config file names one.
pub const DEFAULT_TABLE: &str = "Agent";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database: Option<DatabaseConfig>,
    pub output: Option<OutputConfig>,
}

/// Which database to open and which table to dump.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub table: Option<String>,
}

/// Report configuration.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub strict: Option<bool>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON document.
    Json,
}

/// What to do when the database cannot be opened or read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenFailurePolicy {
    /// Print the error and exit 0.
    #[default]
    Report,
    /// Print the error and exit 1.
    Fail,
}

/// Fully resolved settings for one inspection run.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectConfig {
    pub path: PathBuf,
    pub table: String,
    pub format: OutputFormat,
    pub open_failure: OpenFailurePolicy,
}

impl InspectConfig {
    /// Settings for `path` with every other option at its default.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        InspectConfig {
            path: path.into(),
            table: DEFAULT_TABLE.to_string(),
            format: OutputFormat::default(),
            open_failure: OpenFailurePolicy::default(),
        }
    }

    /// Merges CLI arguments over file settings. The CLI wins on every key.
    ///
    /// # Errors
    ///
    /// Returns `InspectError::Config` when no database path is given anywhere.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let database = file.database.unwrap_or_default();
        let output = file.output.unwrap_or_default();

        let path = cli
            .path
            .clone()
            .or(database.path)
            .ok_or_else(|| InspectError::Config("no database path given".to_string()))?;

        let strict = cli.strict || output.strict.unwrap_or(false);

        Ok(InspectConfig {
            path,
            table: cli
                .table
                .clone()
                .or(database.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            format: cli.format.or(output.format).unwrap_or_default(),
            open_failure: if strict {
                OpenFailurePolicy::Fail
            } else {
                OpenFailurePolicy::Report
            },
        })
    }
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        InspectError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}

/// `<config dir>/dbpeek/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dbpeek").join("config.toml"))
}

/// Loads the explicit config file, or the default one if it exists.
///
/// An explicit path that cannot be read is an error; a missing default file
/// is not.
pub fn load_for_cli(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Loading config from {}", path.display());
            load_config(path)
        }
        _ => Ok(FileConfig::default()),
    }
}
