//! Command-Line Interface
//!
//! The `cloud-billing` binary loads a JSON snapshot into the in-memory store,
//! runs one command from the billing surface, prints the result as JSON and
//! writes the snapshot back after `generate`, `reset` and the bulk loads.
//!
//! # Environment Variables
//!
//! * `BILLING_SNAPSHOT_PATH` - Snapshot file (default: data/catalog.json)
//! * `BILLING_LOG_LEVEL` - Log level or filter directive (default: info)
//! * `BILLING_LOG_FORMAT` - `pretty` or `json` (default: pretty)

pub mod commands;
pub mod config;
pub mod telemetry;

pub use commands::{execute, run, Cli, Command, WindowArgs};
pub use config::{CliConfig, LogFormat};
pub use telemetry::init_tracing;
