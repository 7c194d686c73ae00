//! Command surface of the `cloud-billing` binary

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use core_kernel::{InvoiceNumber, Nit};
use domain_billing::{price_list, InvoiceBuilder, Receivables, SalesAnalytics};
use domain_catalog::{parse_nit, CatalogDocument, CatalogService, ConsumptionDocument};
use infra_store::{load_snapshot, save_snapshot, InMemoryStore};

/// Usage-based billing over a catalog snapshot
#[derive(Debug, Parser)]
#[command(name = "cloud-billing", author, version, about, long_about = None)]
pub struct Cli {
    /// Snapshot file (overrides BILLING_SNAPSHOT_PATH)
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Inclusive billing window in dd/mm/yyyy
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// First day of the window
    #[arg(long)]
    pub from: String,
    /// Last day of the window
    #[arg(long)]
    pub to: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Bill every client's unbilled consumption inside the window
    Generate(WindowArgs),
    /// Revenue per configuration over invoices issued in the window
    SalesByConfiguration(WindowArgs),
    /// Revenue per resource over invoices issued in the window
    SalesByResource(WindowArgs),
    /// Unbilled consumption and its current cost
    Pending {
        #[arg(long, value_parser = parse_nit)]
        nit: Option<Nit>,
    },
    /// Totals over every committed invoice
    Summary,
    /// Committed invoices, optionally for one client
    Invoices {
        #[arg(long, value_parser = parse_nit)]
        nit: Option<Nit>,
    },
    /// A single invoice
    Invoice { number: InvoiceNumber },
    /// Hourly price of every configuration
    PriceList,
    /// Add resources, categories and clients from a JSON catalog feed
    LoadCatalog { file: PathBuf },
    /// Append consumption events from a JSON feed
    LoadConsumption { file: PathBuf },
    /// Drop every record from the snapshot
    Reset,
}

impl Command {
    /// Whether the snapshot must be written back after the command
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Generate(_) | Command::Reset | Command::LoadCatalog { .. } | Command::LoadConsumption { .. }
        )
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("failed to serialize command output")
}

fn read_feed<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read feed {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse feed {}", path.display()))
}

/// Runs a command against a loaded store
pub fn execute(command: &Command, store: &InMemoryStore) -> anyhow::Result<Value> {
    match command {
        Command::Generate(window) => {
            let run = InvoiceBuilder::new(store).run(&window.from, &window.to)?;
            info!(
                invoices = run.invoices.len(),
                skipped = run.skipped.len(),
                total = ?run.total_billed().ok(),
                "Billing run finished"
            );
            to_json(&run)
        }
        Command::SalesByConfiguration(window) => {
            to_json(&SalesAnalytics::new(store).by_configuration(&window.from, &window.to)?)
        }
        Command::SalesByResource(window) => to_json(&SalesAnalytics::new(store).by_resource(&window.from, &window.to)?),
        Command::Pending { nit } => to_json(&Receivables::new(store).pending_consumption(nit.as_ref())?),
        Command::Summary => to_json(&Receivables::new(store).billing_summary()?),
        Command::Invoices { nit } => to_json(&Receivables::new(store).invoices(nit.as_ref())?),
        Command::Invoice { number } => to_json(&Receivables::new(store).invoice(*number)?),
        Command::PriceList => to_json(&price_list(store)?),
        Command::LoadCatalog { file } => {
            let document: CatalogDocument = read_feed(file)?;
            to_json(&CatalogService::new(store).load_catalog(document)?)
        }
        Command::LoadConsumption { file } => {
            let document: ConsumptionDocument = read_feed(file)?;
            to_json(&CatalogService::new(store).load_consumption(document)?)
        }
        Command::Reset => {
            store.clear()?;
            Ok(serde_json::json!({ "reset": true }))
        }
    }
}

/// Loads the snapshot, runs the command and persists mutations
pub fn run(command: &Command, snapshot_path: &std::path::Path) -> anyhow::Result<Value> {
    let snapshot = load_snapshot(snapshot_path)
        .with_context(|| format!("failed to load snapshot {}", snapshot_path.display()))?;
    let store = InMemoryStore::from_snapshot(snapshot)?;

    let output = execute(command, &store)?;

    if command.mutates() {
        save_snapshot(snapshot_path, &store.snapshot()?)
            .with_context(|| format!("failed to save snapshot {}", snapshot_path.display()))?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from(["cloud-billing", "generate", "--from", "01/01/2024", "--to", "31/01/2024"]).unwrap();
        assert!(cli.snapshot.is_none());
        match cli.command {
            Command::Generate(window) => {
                assert_eq!(window.from, "01/01/2024");
                assert_eq!(window.to, "31/01/2024");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_snapshot_flag() {
        let cli = Cli::try_parse_from(["cloud-billing", "summary", "--snapshot", "state.json"]).unwrap();
        assert_eq!(cli.snapshot, Some(PathBuf::from("state.json")));
        assert!(!cli.command.mutates());
    }

    #[test]
    fn test_parse_nit_filter() {
        let cli = Cli::try_parse_from(["cloud-billing", "pending", "--nit", "12345-6"]).unwrap();
        assert!(matches!(cli.command, Command::Pending { nit: Some(ref nit) } if nit.as_str() == "12345-6"));

        assert!(Cli::try_parse_from(["cloud-billing", "invoices", "--nit", "bogus"]).is_err());
    }

    #[test]
    fn test_parse_invoice_number() {
        let cli = Cli::try_parse_from(["cloud-billing", "invoice", "INV-7"]).unwrap();
        assert!(matches!(cli.command, Command::Invoice { number } if number == InvoiceNumber::new(7)));

        let cli = Cli::try_parse_from(["cloud-billing", "invoice", "7"]).unwrap();
        assert!(matches!(cli.command, Command::Invoice { number } if number == InvoiceNumber::new(7)));
    }

    #[test]
    fn test_window_commands_require_both_bounds() {
        assert!(Cli::try_parse_from(["cloud-billing", "sales-by-resource", "--from", "01/01/2024"]).is_err());
    }

    #[test]
    fn test_mutating_commands() {
        let window = WindowArgs {
            from: "01/01/2024".into(),
            to: "31/01/2024".into(),
        };
        assert!(Command::Generate(window.clone()).mutates());
        assert!(Command::Reset.mutates());
        assert!(!Command::SalesByConfiguration(window).mutates());
        assert!(!Command::PriceList.mutates());
        assert!(Command::LoadCatalog { file: "feed.json".into() }.mutates());
    }

    #[test]
    fn test_parse_load_commands() {
        let cli = Cli::try_parse_from(["cloud-billing", "load-consumption", "meter.json"]).unwrap();
        assert!(matches!(cli.command, Command::LoadConsumption { ref file } if file == Path::new("meter.json")));
        assert!(Cli::try_parse_from(["cloud-billing", "load-catalog"]).is_err());
    }
}
