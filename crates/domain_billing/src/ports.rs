//! Invoice storage port
//!
//! Invoices are immutable: the port offers creation and reads only. Saving a
//! number that already exists is a `PortError::Conflict`.

use core_kernel::{DomainPort, InvoiceNumber, Nit, PortError};
use domain_catalog::CatalogPort;

use crate::invoice::Invoice;

/// Storage for committed invoices
pub trait InvoicePort: DomainPort {
    /// Every invoice, in store order
    fn load_invoices(&self) -> Result<Vec<Invoice>, PortError>;

    /// One invoice by number
    fn load_invoice(&self, number: InvoiceNumber) -> Result<Option<Invoice>, PortError>;

    /// Persists a new invoice
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the number is already taken.
    fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// Invoices issued to one client, in store order
    fn load_client_invoices(&self, nit: &Nit) -> Result<Vec<Invoice>, PortError> {
        Ok(self
            .load_invoices()?
            .into_iter()
            .filter(|invoice| &invoice.client_nit == nit)
            .collect())
    }

    /// Highest persisted invoice number
    fn max_invoice_number(&self) -> Result<Option<InvoiceNumber>, PortError> {
        Ok(self.load_invoices()?.iter().map(|invoice| invoice.number).max())
    }

    /// Max persisted number plus one, or [`InvoiceNumber::FIRST`] when empty
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` when the highest persisted number is the last one.
    fn next_invoice_number(&self) -> Result<InvoiceNumber, PortError> {
        match self.max_invoice_number()? {
            None => Ok(InvoiceNumber::FIRST),
            Some(max) => max.next().ok_or_else(|| sequence_exhausted(max)),
        }
    }
}

pub(crate) fn sequence_exhausted(last: InvoiceNumber) -> PortError {
    PortError::conflict(format!("invoice numbers exhausted after {last}"))
}

/// Everything a billing run reads and writes
pub trait BillingStore: CatalogPort + InvoicePort {}

impl<T> BillingStore for T where T: CatalogPort + InvoicePort {}
