//! CLI configuration

use std::path::PathBuf;

use serde::Deserialize;

/// Output layout of log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per record
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Snapshot file holding the catalog, clients and invoices
    pub snapshot_path: PathBuf,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Log layout
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/catalog.json"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Loads configuration from `BILLING_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix("BILLING"))
    }

    /// Loads configuration from the given environment source, filling gaps with defaults
    pub fn from_source(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("snapshot_path", defaults.snapshot_path.to_string_lossy().into_owned())?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Replaces the snapshot path when one was given on the command line
    pub fn with_snapshot_override(mut self, snapshot: Option<PathBuf>) -> Self {
        if let Some(path) = snapshot {
            self.snapshot_path = path;
        }
        self
    }
}
