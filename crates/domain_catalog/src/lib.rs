//! Catalog Domain
//!
//! This crate holds everything a billing run reads: the priced resource
//! catalog, the categories grouping sellable configurations, and the clients
//! whose provisioned instances accumulate metered consumption.
//!
//! # Aggregates
//!
//! - **Resource**: a priced unit of infrastructure with an hourly rate
//! - **Category**: owns an ordered list of **Configuration**s, each a bundle
//!   of resource quantities
//! - **Client**: owns its **Instance**s, which own their **Consumption** events
//!
//! Aggregates are owned values keyed by explicit identifiers. Loading the same
//! client twice yields two independent copies; nothing is shared by reference.
//!
//! # Examples
//!
//! ```rust
//! use domain_catalog::{Configuration, Resource, ResourceKind};
//! use core_kernel::{ConfigurationId, ResourceId};
//! use rust_decimal_macros::dec;
//!
//! let cpu = Resource::new(ResourceId::new(1), "vCPU", "CPU", "core", ResourceKind::Hardware, dec!(2.0)).unwrap();
//! let small = Configuration::new(ConfigurationId::new(10), "Small", "1 core")
//!     .with_resource(cpu.id, dec!(3))
//!     .unwrap();
//!
//! assert!(small.uses_resource(cpu.id));
//! ```

pub mod resource;
pub mod category;
pub mod client;
pub mod validation;
pub mod ports;
pub mod services;
pub mod loader;
pub mod error;

pub use resource::{Resource, ResourceKind};
pub use category::{Category, Configuration, ResourceQuantity};
pub use client::{Client, Consumption, Instance, InstanceState};
pub use ports::{CatalogPort, CategoryPort, ClientPort, ResourcePort};
pub use services::{CatalogService, ConfigurationCheck};
pub use loader::{CatalogDocument, ConsumptionDocument, LoadReport};
pub use validation::{normalize_timestamp, parse_nit};
pub use error::CatalogError;
