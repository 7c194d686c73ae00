//! Invoice builder
//!
//! Drives a billing run end to end. For every client, each instance's
//! unbilled consumption inside the window is priced into one line item, the
//! line items accumulate into a single invoice, and the matched consumption is
//! flagged as billed. A client's invoice and its flipped flags are persisted
//! together only when the invoice total is positive.
//!
//! # Run lifecycle
//!
//! ```text
//! parse window ──► load clients + resources ──► per client:
//!     allocate number ──► per instance: select ─► price ─► mark
//!     ──► total > 0 ? save invoice + client : discard shell
//! ```
//!
//! Window errors abort the run before anything is read or written. Every
//! later anomaly (an instance whose configuration is gone, a timestamp that
//! can't be read, an amount past the decimal range) only reduces what is
//! billed and is reported on the returned [`BillingRun`]. Per-client commits are independent: a store
//! failure mid-run leaves earlier clients billed.
//!
//! A run must not overlap another run against the same store.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use core_kernel::{checked_sum, AmountOverflow, DateWindow, InstanceId, Nit};
use domain_catalog::{Client, Configuration, Instance};

use crate::cost::{itemize, ResourceCatalog};
use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceLineItem};
use crate::ports::BillingStore;
use crate::selector::{select_unbilled, UnbilledSelection};
use crate::sequence::InvoiceSequence;

/// Why an instance contributed nothing to its client's invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Unbilled consumption exists but none of it is billable in the window
    NoBillableConsumption,
    /// The instance's configuration no longer exists; consumption stays unbilled
    MissingConfiguration,
    /// Pricing the consumption exceeds the decimal range; consumption stays unbilled
    AmountOverflow,
}

/// An instance left out of a billing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInstance {
    pub client: Nit,
    pub instance: InstanceId,
    pub reason: SkipReason,
}

/// Outcome of one billing run
#[derive(Debug, Clone, Serialize)]
pub struct BillingRun {
    pub window: DateWindow,
    /// Persisted invoices, in client order
    pub invoices: Vec<Invoice>,
    pub skipped: Vec<SkippedInstance>,
    /// Unbilled events skipped because their timestamp could not be read
    pub unparseable_timestamps: usize,
}

impl BillingRun {
    fn new(window: DateWindow) -> Self {
        Self {
            window,
            invoices: Vec::new(),
            skipped: Vec::new(),
            unparseable_timestamps: 0,
        }
    }

    /// Sum of every persisted invoice total
    pub fn total_billed(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum(self.invoices.iter().map(Invoice::total_amount))
    }

    fn skip(&mut self, client: &Nit, instance: InstanceId, reason: SkipReason) {
        self.skipped.push(SkippedInstance {
            client: client.clone(),
            instance,
            reason,
        });
    }
}

/// Converts unbilled consumption into invoices
pub struct InvoiceBuilder<'s, S: BillingStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: BillingStore + ?Sized> InvoiceBuilder<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Bills every client over `[start, end]` and returns the persisted invoices
    ///
    /// Both bounds are `dd/mm/yyyy`. Clients with nothing billable are absent
    /// from the result.
    ///
    /// # Errors
    ///
    /// - `BillingError::InvalidDateFormat` / `InvalidDateRange` before any store access
    /// - `BillingError::Store` if a read or write fails mid-run
    pub fn generate_invoices(&self, start: &str, end: &str) -> Result<Vec<Invoice>, BillingError> {
        Ok(self.run(start, end)?.invoices)
    }

    /// Bills every client and reports what was skipped
    pub fn run(&self, start: &str, end: &str) -> Result<BillingRun, BillingError> {
        let window = DateWindow::parse(start, end)?;
        let span = info_span!("billing_run", start = %start, end = %end);
        let _guard = span.enter();

        let clients = self.store.load_clients()?;
        let catalog = ResourceCatalog::load(self.store)?;
        let mut sequence = InvoiceSequence::default();
        let mut report = BillingRun::new(window);

        info!(clients = clients.len(), resources = catalog.len(), "Starting billing run");

        for client in clients {
            if let Some(invoice) = self.bill_client(client, &window, &catalog, &mut sequence, &mut report)? {
                report.invoices.push(invoice);
            }
        }

        info!(
            invoices = report.invoices.len(),
            skipped = report.skipped.len(),
            unparseable = report.unparseable_timestamps,
            total = ?report.total_billed().ok(),
            "Billing run complete"
        );
        Ok(report)
    }

    fn bill_client(
        &self,
        mut client: Client,
        window: &DateWindow,
        catalog: &ResourceCatalog,
        sequence: &mut InvoiceSequence,
        report: &mut BillingRun,
    ) -> Result<Option<Invoice>, BillingError> {
        let nit = client.nit.clone();
        let number = sequence.allocate_from(self.store)?;
        let mut invoice = Invoice::new(number, nit.clone(), window.end());

        for instance in client.instances_mut() {
            let selection = match select_unbilled(instance, window) {
                Ok(selection) => selection,
                Err(AmountOverflow) => {
                    warn!(client = %nit, instance = %instance.id, "Unbilled hours exceed the decimal range, leaving consumption unbilled");
                    report.skip(&nit, instance.id, SkipReason::AmountOverflow);
                    continue;
                }
            };
            report.unparseable_timestamps += selection.unparseable;
            if selection.unparseable > 0 {
                warn!(client = %nit, instance = %instance.id, count = selection.unparseable, "Skipping consumption with unreadable timestamps");
            }

            if selection.is_empty() {
                if selection.unparseable + selection.outside_window > 0 {
                    debug!(client = %nit, instance = %instance.id, "No billable consumption in window");
                    report.skip(&nit, instance.id, SkipReason::NoBillableConsumption);
                }
                continue;
            }

            let Some((_, configuration)) = self.store.find_configuration(instance.configuration_id)? else {
                warn!(
                    client = %nit,
                    instance = %instance.id,
                    configuration = %instance.configuration_id,
                    "Configuration missing, leaving consumption unbilled"
                );
                report.skip(&nit, instance.id, SkipReason::MissingConfiguration);
                continue;
            };

            let priced = price_line(instance, &configuration, catalog, &selection)
                .and_then(|line| invoice.add_line(line));
            if priced.is_err() {
                warn!(client = %nit, instance = %instance.id, hours = %selection.total_hours, "Line total exceeds the decimal range, leaving consumption unbilled");
                report.skip(&nit, instance.id, SkipReason::AmountOverflow);
                continue;
            }
            instance.mark_billed(&selection.matched);
        }

        if !invoice.is_billable() {
            debug!(client = %nit, candidate = %number, "Nothing billable, discarding invoice shell");
            return Ok(None);
        }

        self.store.save_invoice(&invoice)?;
        self.store.save_client(&client)?;
        info!(client = %nit, invoice = %number, total = %invoice.total_amount(), lines = invoice.lines().len(), "Invoice issued");
        Ok(Some(invoice))
    }
}

fn price_line(
    instance: &Instance,
    configuration: &Configuration,
    catalog: &ResourceCatalog,
    selection: &UnbilledSelection,
) -> Result<InvoiceLineItem, AmountOverflow> {
    let breakdown = itemize(configuration, catalog, selection.total_hours)?;
    let line = InvoiceLineItem::new(instance.id, instance.name.clone(), selection.total_hours, breakdown)?;
    debug!(
        instance = %instance.id,
        hours = %selection.total_hours,
        line_total = %line.line_total(),
        "Line item built"
    );
    Ok(line)
}
