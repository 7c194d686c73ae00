//! Pre-built Test Fixtures
//!
//! The canonical catalog: three resources, one category with two
//! configurations, and two client NITs. Rates are chosen so expected totals
//! are easy to compute by hand.
//!
//! | Resource | Rate/h |
//! |---|---|
//! | 1 vCPU | 2.00 |
//! | 2 RAM | 0.50 |
//! | 3 OS License | 0.10 |
//!
//! Configuration 10 "Small VM" = 3 vCPU, hourly cost 6.00.
//! Configuration 11 "Database" = 2 vCPU + 4 RAM + 1 OS License, hourly cost 6.10.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{CategoryId, ConfigurationId, Nit, ResourceId};
use domain_catalog::{Category, Configuration, Resource, ResourceKind};

/// Identifiers of the canonical catalog
pub struct IdFixtures;

impl IdFixtures {
    pub const VCPU: ResourceId = ResourceId::new(1);
    pub const RAM: ResourceId = ResourceId::new(2);
    pub const OS_LICENSE: ResourceId = ResourceId::new(3);

    pub const COMPUTE: CategoryId = CategoryId::new(1);

    pub const SMALL_VM: ConfigurationId = ConfigurationId::new(10);
    pub const DATABASE: ConfigurationId = ConfigurationId::new(11);

    pub fn acme() -> Nit {
        Nit::parse("12345-6").expect("fixture NIT is valid")
    }

    pub fn globex() -> Nit {
        Nit::parse("67890-K").expect("fixture NIT is valid")
    }
}

/// Canonical resources and configurations
pub struct CatalogFixtures;

impl CatalogFixtures {
    pub fn vcpu() -> Resource {
        Resource::new(IdFixtures::VCPU, "vCPU", "CPU", "core", ResourceKind::Hardware, dec!(2.0))
            .expect("fixture resource is valid")
    }

    pub fn ram() -> Resource {
        Resource::new(IdFixtures::RAM, "RAM", "RAM", "GB", ResourceKind::Hardware, dec!(0.5))
            .expect("fixture resource is valid")
    }

    pub fn os_license() -> Resource {
        Resource::new(IdFixtures::OS_LICENSE, "OS License", "OS", "license", ResourceKind::Software, dec!(0.1))
            .expect("fixture resource is valid")
    }

    pub fn resources() -> Vec<Resource> {
        vec![Self::vcpu(), Self::ram(), Self::os_license()]
    }

    pub fn small_vm() -> Configuration {
        Configuration::new(IdFixtures::SMALL_VM, "Small VM", "3 vCPU")
            .with_resource(IdFixtures::VCPU, dec!(3))
            .expect("fixture quantity is valid")
    }

    pub fn database() -> Configuration {
        Configuration::new(IdFixtures::DATABASE, "Database", "2 vCPU, 4 GB, licensed OS")
            .with_resource(IdFixtures::VCPU, dec!(2))
            .and_then(|c| c.with_resource(IdFixtures::RAM, dec!(4)))
            .and_then(|c| c.with_resource(IdFixtures::OS_LICENSE, dec!(1)))
            .expect("fixture quantities are valid")
    }

    pub fn compute() -> Category {
        let mut category = Category::new(IdFixtures::COMPUTE, "Compute", "General purpose machines", "web");
        category.add_configuration(Self::small_vm()).expect("fresh category");
        category.add_configuration(Self::database()).expect("fresh category");
        category
    }
}

/// Dates used across the suites
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn provisioned() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    /// `dd/mm/yyyy` bounds of January 2024
    pub fn january() -> (&'static str, &'static str) {
        ("01/01/2024", "31/01/2024")
    }

    /// `dd/mm/yyyy` bounds of February 2024
    pub fn february() -> (&'static str, &'static str) {
        ("01/02/2024", "29/02/2024")
    }
}
