//! Core Kernel - Foundational types shared by the catalog and billing domains
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed numeric identifiers and the client tax identifier (NIT)
//! - `dd/mm/yyyy` date handling and closed billing windows
//! - Output rounding for monetary values
//! - The error type shared by every storage port

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{checked_add, checked_mul, checked_sum, round_display, serialize_rounded, AmountOverflow, DISPLAY_DECIMALS};
pub use temporal::{DateWindow, TemporalError, parse_date, parse_timestamp, format_date};
pub use identifiers::{
    ResourceId, CategoryId, ConfigurationId, InstanceId, InvoiceNumber, Nit,
};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
