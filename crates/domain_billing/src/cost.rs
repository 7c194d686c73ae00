//! Cost model
//!
//! Prices a configuration against the resource catalog. A configuration may
//! reference a resource that was deleted after it was written; such a
//! reference contributes nothing to the price and produces no breakdown entry.
//! Every product and sum is checked; an amount past the decimal range is an
//! `AmountOverflow`, never a panic.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use core_kernel::{checked_mul, checked_sum, round_display, AmountOverflow, CategoryId, ConfigurationId, PortError, ResourceId};
use domain_catalog::{CategoryPort, Configuration, Resource, ResourcePort};

use crate::error::BillingError;
use crate::invoice::ResourceCharge;

/// The resource catalog indexed by id
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: HashMap<ResourceId, Resource>,
}

impl ResourceCatalog {
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            resources: resources.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Reads the full catalog from the store
    pub fn load<S: ResourcePort + ?Sized>(store: &S) -> Result<Self, PortError> {
        Ok(Self::new(store.load_resources()?))
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Price of running one instance of the configuration for an hour
pub fn hourly_cost(configuration: &Configuration, catalog: &ResourceCatalog) -> Result<Decimal, AmountOverflow> {
    let rates = configuration
        .resource_quantities()
        .iter()
        .filter_map(|entry| catalog.get(entry.resource_id).map(|resource| checked_mul(resource.hourly_rate, entry.quantity)))
        .collect::<Result<Vec<_>, _>>()?;
    checked_sum(rates)
}

/// Per-resource charges for running the configuration for `hours`
///
/// One entry per resource the catalog still knows, in the order the
/// resources were added to the configuration.
pub fn itemize(
    configuration: &Configuration,
    catalog: &ResourceCatalog,
    hours: Decimal,
) -> Result<Vec<ResourceCharge>, AmountOverflow> {
    configuration
        .resource_quantities()
        .iter()
        .filter_map(|entry| {
            catalog.get(entry.resource_id).map(|resource| {
                resource.cost(hours, entry.quantity).map(|cost| ResourceCharge {
                    resource_name: resource.name.clone(),
                    quantity: entry.quantity,
                    hours,
                    cost,
                })
            })
        })
        .collect()
}

/// One row of the price list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceListEntry {
    pub category_id: CategoryId,
    pub category_name: String,
    pub configuration_id: ConfigurationId,
    pub configuration_name: String,
    pub hourly_cost: Decimal,
}

/// Hourly price of every configuration, in category order
pub fn price_list<S>(store: &S) -> Result<Vec<PriceListEntry>, BillingError>
where
    S: ResourcePort + CategoryPort + ?Sized,
{
    let catalog = ResourceCatalog::load(store)?;
    let mut entries = Vec::new();
    for category in store.load_categories()? {
        for configuration in category.configurations() {
            entries.push(PriceListEntry {
                category_id: category.id,
                category_name: category.name.clone(),
                configuration_id: configuration.id,
                configuration_name: configuration.name.clone(),
                hourly_cost: round_display(hourly_cost(configuration, &catalog)?),
            });
        }
    }
    Ok(entries)
}
