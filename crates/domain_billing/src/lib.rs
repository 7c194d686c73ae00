//! Billing Domain - Usage-Based Invoicing
//!
//! This crate turns metered consumption into immutable invoices and reports
//! on what has been billed.
//!
//! # Components
//!
//! - **Cost model** ([`cost`]): hourly price of a configuration, and its
//!   per-resource breakdown for a number of hours
//! - **Consumption selector** ([`selector`]): an instance's unbilled events
//!   inside a billing window
//! - **Invoice builder** ([`builder`]): one run over every client, committing
//!   one invoice per client with billable usage
//! - **Sales analytics** ([`analytics`]): revenue by configuration and by
//!   resource over committed invoices
//! - **Receivables** ([`receivables`]): pending consumption and invoice totals
//!
//! # Billing Guarantees
//!
//! - A consumption event is billed at most once; its flag never reverts
//! - An invoice total is the sum of its line totals, rounded only on output
//! - Invoice numbers strictly increase and are never reused within a run
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::InvoiceBuilder;
//!
//! let builder = InvoiceBuilder::new(&store);
//! let invoices = builder.generate_invoices("01/01/2024", "31/01/2024")?;
//! ```

pub mod cost;
pub mod selector;
pub mod invoice;
pub mod sequence;
pub mod builder;
pub mod analytics;
pub mod receivables;
pub mod ports;
pub mod error;

pub use cost::{hourly_cost, itemize, price_list, PriceListEntry, ResourceCatalog};
pub use selector::{select_unbilled, UnbilledSelection};
pub use invoice::{Invoice, InvoiceLineItem, ResourceCharge};
pub use sequence::InvoiceSequence;
pub use builder::{BillingRun, InvoiceBuilder, SkipReason, SkippedInstance};
pub use analytics::{ConfigurationSales, ResourceSales, SalesAnalytics};
pub use receivables::{BillingSummary, ClientPending, PendingInstance, Receivables};
pub use ports::{BillingStore, InvoicePort};
pub use error::BillingError;
