//! Storage Infrastructure
//!
//! This crate provides the catalog store used by the command-line binary and
//! the test suites: an in-memory implementation of every catalog and invoice
//! port, and JSON snapshot files to carry its contents between runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{load_snapshot, save_snapshot, InMemoryStore};
//!
//! let store = InMemoryStore::from_snapshot(load_snapshot(path)?)?;
//! InvoiceBuilder::new(&store).generate_invoices("01/01/2024", "31/01/2024")?;
//! save_snapshot(path, &store.snapshot()?)?;
//! ```

pub mod memory;
pub mod snapshot;
pub mod error;

pub use memory::InMemoryStore;
pub use snapshot::{load_snapshot, save_snapshot, CatalogSnapshot};
pub use error::StoreError;
