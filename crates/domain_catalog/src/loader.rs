//! Bulk loading
//!
//! Catalog and consumption feeds arrive as JSON documents. Every record is
//! parsed and applied on its own through [`CatalogService`], so the same
//! integrity rules hold as for single additions. A record that is malformed
//! or conflicts with the store is counted as rejected and the rest of the
//! document still loads. Store failures abort the load.
//!
//! Catalog documents are applied in dependency order: resources, then
//! categories with their configurations, then clients with their instances.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use core_kernel::{InstanceId, Nit, PortError};

use crate::category::Category;
use crate::client::Client;
use crate::error::CatalogError;
use crate::ports::CatalogPort;
use crate::resource::Resource;
use crate::services::CatalogService;

/// A catalog feed
///
/// Records are kept as raw JSON until they are applied so one bad record
/// doesn't fail the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub resources: Vec<Value>,
    #[serde(default)]
    pub categories: Vec<Value>,
    #[serde(default)]
    pub clients: Vec<Value>,
}

/// A consumption feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumptionDocument {
    #[serde(default)]
    pub consumptions: Vec<Value>,
}

/// One metered event in a consumption feed
#[derive(Debug, Clone, Deserialize)]
struct ConsumptionEntry {
    nit: Nit,
    instance_id: InstanceId,
    hours: Decimal,
    timestamp: String,
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
    /// One `location: reason` entry per rejected record
    pub errors: Vec<String>,
}

impl LoadReport {
    /// Counts a record's outcome; store failures are handed back
    fn tally(&mut self, location: &str, outcome: Result<(), CatalogError>) -> Result<bool, PortError> {
        match outcome {
            Ok(()) => {
                self.accepted += 1;
                Ok(true)
            }
            Err(CatalogError::Store(err)) => Err(err),
            Err(err) => {
                warn!(record = location, error = %err, "Record rejected");
                self.rejected += 1;
                self.errors.push(format!("{location}: {err}"));
                Ok(false)
            }
        }
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|err| CatalogError::invalid(err.to_string()))
}

impl<'s, S: CatalogPort + ?Sized> CatalogService<'s, S> {
    /// Applies a catalog feed
    ///
    /// A category's configurations and a client's instances are applied
    /// one by one after their owner is accepted; each counts as a record.
    ///
    /// # Errors
    ///
    /// `CatalogError::Store` if the store fails; earlier records stay applied.
    pub fn load_catalog(&self, document: CatalogDocument) -> Result<LoadReport, CatalogError> {
        let mut report = LoadReport::default();

        for (i, value) in document.resources.into_iter().enumerate() {
            let outcome = parse::<Resource>(value).and_then(|resource| self.add_resource(resource));
            report.tally(&format!("resources[{i}]"), outcome)?;
        }

        for (i, value) in document.categories.into_iter().enumerate() {
            let location = format!("categories[{i}]");
            let mut category = match parse::<Category>(value) {
                Ok(category) => category,
                Err(err) => {
                    report.tally(&location, Err(err))?;
                    continue;
                }
            };
            let category_id = category.id;
            let configurations = category.take_configurations();
            if !report.tally(&location, self.add_category(category))? {
                continue;
            }
            for (j, configuration) in configurations.into_iter().enumerate() {
                let outcome = self.add_configuration(category_id, configuration);
                report.tally(&format!("{location}.configurations[{j}]"), outcome)?;
            }
        }

        for (i, value) in document.clients.into_iter().enumerate() {
            let location = format!("clients[{i}]");
            let mut client = match parse::<Client>(value) {
                Ok(client) => client,
                Err(err) => {
                    report.tally(&location, Err(err))?;
                    continue;
                }
            };
            let nit = client.nit.clone();
            let instances = client.take_instances();
            if !report.tally(&location, self.add_client(client))? {
                continue;
            }
            for (j, instance) in instances.into_iter().enumerate() {
                let outcome = self.add_instance(&nit, instance);
                report.tally(&format!("{location}.instances[{j}]"), outcome)?;
            }
        }

        info!(accepted = report.accepted, rejected = report.rejected, "Catalog feed loaded");
        Ok(report)
    }

    /// Applies a consumption feed
    ///
    /// Each event is appended unbilled to its instance; events naming an
    /// unknown client or instance are rejected.
    pub fn load_consumption(&self, document: ConsumptionDocument) -> Result<LoadReport, CatalogError> {
        let mut report = LoadReport::default();

        for (i, value) in document.consumptions.into_iter().enumerate() {
            let outcome = parse::<ConsumptionEntry>(value).and_then(|entry| {
                self.record_consumption(&entry.nit, entry.instance_id, entry.hours, &entry.timestamp)
                    .map(|_| ())
            });
            report.tally(&format!("consumptions[{i}]"), outcome)?;
        }

        info!(accepted = report.accepted, rejected = report.rejected, "Consumption feed loaded");
        Ok(report)
    }
}
