//! Billing domain errors

use thiserror::Error;

use core_kernel::{AmountOverflow, InvoiceNumber, Nit, PortError, TemporalError};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// A window bound is not a `dd/mm/yyyy` date
    #[error("Invalid date format: '{0}' (expected dd/mm/yyyy)")]
    InvalidDateFormat(String),

    /// Window start falls after window end
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: String,
        end: String,
    },

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(Nit),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceNumber),

    /// A computed amount exceeds the decimal range
    #[error("Amount overflow: {0}")]
    AmountOverflow(#[from] AmountOverflow),

    /// Storage failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl From<TemporalError> for BillingError {
    fn from(err: TemporalError) -> Self {
        match err {
            TemporalError::InvalidDateFormat(raw) => BillingError::InvalidDateFormat(raw),
            TemporalError::InvalidDateRange { start, end } => BillingError::InvalidDateRange { start, end },
        }
    }
}
