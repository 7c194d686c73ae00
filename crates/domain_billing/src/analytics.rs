//! Sales analytics
//!
//! Read-only reports over committed invoices whose issue date falls inside
//! a window. Totals are accumulated at full precision, sorted by revenue
//! (descending, ties keep catalog order), and rounded to two decimal places
//! in the returned rows. A total past the decimal range fails the report
//! with `BillingError::AmountOverflow`.
//!
//! Line items don't record their configuration. The by-configuration report
//! resolves each line through the billed client's current instance list,
//! loaded fresh for the report.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{checked_add, round_display, CategoryId, ConfigurationId, DateWindow, Nit};
use domain_catalog::Client;

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::ports::BillingStore;

/// Revenue attributed to one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationSales {
    pub category_id: CategoryId,
    pub category_name: String,
    pub configuration_id: ConfigurationId,
    pub configuration_name: String,
    pub revenue: Decimal,
    /// Number of billed line items
    pub count_sold: u32,
    pub hours_total: Decimal,
}

/// Revenue attributed to one resource name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSales {
    pub resource_name: String,
    pub revenue: Decimal,
    pub hours_total: Decimal,
    pub quantity_total: Decimal,
}

/// Sales reports over a [`BillingStore`]
pub struct SalesAnalytics<'s, S: BillingStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: BillingStore + ?Sized> SalesAnalytics<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Revenue per configuration over `[start, end]`
    ///
    /// Every catalog configuration is a candidate; only those with positive
    /// revenue are returned. When two categories share a configuration id,
    /// the later category's names are reported.
    pub fn by_configuration(&self, start: &str, end: &str) -> Result<Vec<ConfigurationSales>, BillingError> {
        let window = DateWindow::parse(start, end)?;
        let invoices = self.invoices_in(&window)?;

        let mut rows: Vec<ConfigurationSales> = Vec::new();
        let mut index: HashMap<ConfigurationId, usize> = HashMap::new();
        for category in self.store.load_categories()? {
            for configuration in category.configurations() {
                let row = ConfigurationSales {
                    category_id: category.id,
                    category_name: category.name.clone(),
                    configuration_id: configuration.id,
                    configuration_name: configuration.name.clone(),
                    revenue: Decimal::ZERO,
                    count_sold: 0,
                    hours_total: Decimal::ZERO,
                };
                match index.get(&configuration.id) {
                    Some(&slot) => rows[slot] = row,
                    None => {
                        index.insert(configuration.id, rows.len());
                        rows.push(row);
                    }
                }
            }
        }

        let clients: HashMap<Nit, Client> = self
            .store
            .load_clients()?
            .into_iter()
            .map(|client| (client.nit.clone(), client))
            .collect();

        for invoice in &invoices {
            let Some(client) = clients.get(&invoice.client_nit) else {
                debug!(invoice = %invoice.number, client = %invoice.client_nit, "Billed client no longer exists");
                continue;
            };
            for line in invoice.lines() {
                let slot = client
                    .instance(line.instance_id)
                    .and_then(|instance| index.get(&instance.configuration_id));
                if let Some(&slot) = slot {
                    let row = &mut rows[slot];
                    row.revenue = checked_add(row.revenue, line.line_total())?;
                    row.count_sold += 1;
                    row.hours_total = checked_add(row.hours_total, line.hours_consumed)?;
                }
            }
        }

        let mut rows: Vec<ConfigurationSales> = rows.into_iter().filter(|row| row.revenue > Decimal::ZERO).collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        for row in &mut rows {
            row.revenue = round_display(row.revenue);
            row.hours_total = round_display(row.hours_total);
        }
        Ok(rows)
    }

    /// Revenue per resource name over `[start, end]`
    ///
    /// Rows are keyed by display name, so two resources sharing a name are
    /// reported together.
    pub fn by_resource(&self, start: &str, end: &str) -> Result<Vec<ResourceSales>, BillingError> {
        let window = DateWindow::parse(start, end)?;
        let invoices = self.invoices_in(&window)?;

        let mut rows: Vec<ResourceSales> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let charges = invoices
            .iter()
            .flat_map(|invoice| invoice.lines())
            .flat_map(|line| line.breakdown());

        for charge in charges {
            let slot = *index.entry(charge.resource_name.clone()).or_insert_with(|| {
                rows.push(ResourceSales {
                    resource_name: charge.resource_name.clone(),
                    revenue: Decimal::ZERO,
                    hours_total: Decimal::ZERO,
                    quantity_total: Decimal::ZERO,
                });
                rows.len() - 1
            });
            let row = &mut rows[slot];
            row.revenue = checked_add(row.revenue, charge.cost)?;
            row.hours_total = checked_add(row.hours_total, charge.hours)?;
            row.quantity_total = checked_add(row.quantity_total, charge.quantity)?;
        }

        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        for row in &mut rows {
            row.revenue = round_display(row.revenue);
            row.hours_total = round_display(row.hours_total);
            row.quantity_total = round_display(row.quantity_total);
        }
        Ok(rows)
    }

    fn invoices_in(&self, window: &DateWindow) -> Result<Vec<Invoice>, BillingError> {
        Ok(self
            .store
            .load_invoices()?
            .into_iter()
            .filter(|invoice| window.contains_date(invoice.issue_date))
            .collect())
    }
}
