//! Cloud Billing - Command-Line Binary
//!
//! # Usage
//!
//! ```bash
//! cloud-billing generate --from 01/01/2024 --to 31/01/2024
//! cloud-billing --snapshot state.json sales-by-configuration --from 01/01/2024 --to 31/03/2024
//! BILLING_LOG_FORMAT=json cloud-billing pending --nit 12345-6
//! ```

use clap::Parser;

use interface_cli::{init_tracing, run, Cli, CliConfig};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::from_env()?.with_snapshot_override(cli.snapshot.clone());

    init_tracing(&config);
    tracing::debug!(snapshot = %config.snapshot_path.display(), command = ?cli.command, "Starting");

    let output = run(&cli.command, &config.snapshot_path)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
