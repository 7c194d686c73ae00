//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! billing test suites.
//!
//! # Modules
//!
//! - `fixtures`: The canonical catalog every suite starts from
//! - `builders`: Builder patterns for clients, instances and configurations
//! - `assertions`: Invariant checks over invoices and consumption
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
