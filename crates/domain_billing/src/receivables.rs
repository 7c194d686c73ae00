//! Receivables reports
//!
//! What is still owed (unbilled consumption, priced at today's catalog) and
//! what has been invoiced so far.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use core_kernel::{checked_add, checked_mul, checked_sum, round_display, InstanceId, InvoiceNumber, Nit};
use domain_catalog::Client;

use crate::cost::{hourly_cost, ResourceCatalog};
use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::ports::BillingStore;

/// Unbilled consumption of one instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingInstance {
    pub instance_id: InstanceId,
    pub instance_name: String,
    pub pending_count: usize,
    pub pending_hours: Decimal,
    /// Pending hours at the configuration's hourly cost; zero if the configuration is gone
    pub pending_amount: Decimal,
}

/// Unbilled consumption of one client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientPending {
    pub nit: Nit,
    pub name: String,
    pub instances: Vec<PendingInstance>,
    pub total_pending: Decimal,
}

/// Aggregate figures over every committed invoice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSummary {
    pub total_invoices: usize,
    pub total_revenue: Decimal,
    pub average_invoice: Decimal,
    pub clients_billed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smallest_invoice: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_invoice: Option<Decimal>,
}

/// Receivables queries over a [`BillingStore`]
pub struct Receivables<'s, S: BillingStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: BillingStore + ?Sized> Receivables<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Unbilled consumption for every client, or for one
    ///
    /// No window applies: every unbilled event counts, including ones whose
    /// timestamp can't be read. Clients with nothing pending are omitted.
    ///
    /// # Errors
    ///
    /// `BillingError::ClientNotFound` when `nit` names an unknown client.
    pub fn pending_consumption(&self, nit: Option<&Nit>) -> Result<Vec<ClientPending>, BillingError> {
        let clients = match nit {
            Some(nit) => vec![self
                .store
                .load_client(nit)?
                .ok_or_else(|| BillingError::ClientNotFound(nit.clone()))?],
            None => self.store.load_clients()?,
        };
        let catalog = ResourceCatalog::load(self.store)?;

        let mut report = Vec::new();
        for client in &clients {
            if let Some(pending) = self.client_pending(client, &catalog)? {
                report.push(pending);
            }
        }
        Ok(report)
    }

    fn client_pending(&self, client: &Client, catalog: &ResourceCatalog) -> Result<Option<ClientPending>, BillingError> {
        let mut instances = Vec::new();
        let mut total = Decimal::ZERO;

        for instance in client.instances() {
            let pending_count = instance.unbilled().count();
            if pending_count == 0 {
                continue;
            }
            let hours = instance.pending_hours()?;
            let rate = match self.store.find_configuration(instance.configuration_id)? {
                Some((_, configuration)) => hourly_cost(&configuration, catalog)?,
                None => Decimal::ZERO,
            };
            let amount = checked_mul(rate, hours)?;
            total = checked_add(total, amount)?;

            instances.push(PendingInstance {
                instance_id: instance.id,
                instance_name: instance.name.clone(),
                pending_count,
                pending_hours: round_display(hours),
                pending_amount: round_display(amount),
            });
        }

        if instances.is_empty() {
            return Ok(None);
        }
        Ok(Some(ClientPending {
            nit: client.nit.clone(),
            name: client.name.clone(),
            instances,
            total_pending: round_display(total),
        }))
    }

    /// Totals over every committed invoice
    pub fn billing_summary(&self) -> Result<BillingSummary, BillingError> {
        let invoices = self.store.load_invoices()?;
        let totals: Vec<Decimal> = invoices.iter().map(Invoice::total_amount).collect();

        let total_revenue = checked_sum(totals.iter().copied())?;
        let average_invoice = if totals.is_empty() {
            Decimal::ZERO
        } else {
            total_revenue / Decimal::from(totals.len())
        };
        let clients_billed = invoices
            .iter()
            .map(|invoice| &invoice.client_nit)
            .collect::<HashSet<_>>()
            .len();

        Ok(BillingSummary {
            total_invoices: invoices.len(),
            total_revenue: round_display(total_revenue),
            average_invoice: round_display(average_invoice),
            clients_billed,
            smallest_invoice: totals.iter().min().copied().map(round_display),
            largest_invoice: totals.iter().max().copied().map(round_display),
        })
    }

    /// Every invoice, or only one client's
    pub fn invoices(&self, nit: Option<&Nit>) -> Result<Vec<Invoice>, BillingError> {
        let invoices = match nit {
            Some(nit) => self.store.load_client_invoices(nit)?,
            None => self.store.load_invoices()?,
        };
        Ok(invoices)
    }

    /// One invoice by number
    pub fn invoice(&self, number: InvoiceNumber) -> Result<Invoice, BillingError> {
        self.store
            .load_invoice(number)?
            .ok_or(BillingError::InvoiceNotFound(number))
    }
}
