//! Billable resources
//!
//! A resource is one priced unit of infrastructure (a vCPU, a GB of RAM, an
//! OS license) with a rate per hour of use.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{checked_mul, AmountOverflow, ResourceId};
use crate::error::CatalogError;

/// Kind of resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Hardware,
    Software,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Hardware => f.write_str("Hardware"),
            ResourceKind::Software => f.write_str("Software"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hardware" => Ok(ResourceKind::Hardware),
            "Software" => Ok(ResourceKind::Software),
            other => Err(CatalogError::invalid(format!("invalid resource kind: {other}"))),
        }
    }
}

/// A priced resource in the catalog
///
/// Deserialization goes through [`Resource::new`], so stored records obey
/// the same rules as new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceRecord")]
pub struct Resource {
    /// Unique identifier
    pub id: ResourceId,
    /// Display name (used as the key of the by-resource sales report)
    pub name: String,
    /// Short label, e.g. "vCPU"
    pub abbreviation: String,
    /// Unit the quantity is measured in, e.g. "GB"
    pub unit_of_measure: String,
    /// Hardware or software
    pub kind: ResourceKind,
    /// Price per hour for one unit
    pub hourly_rate: Decimal,
}

impl Resource {
    /// Creates a resource
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is blank or the
    /// hourly rate is not strictly positive.
    pub fn new(
        id: ResourceId,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        unit_of_measure: impl Into<String>,
        kind: ResourceKind,
        hourly_rate: Decimal,
    ) -> Result<Self, CatalogError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::invalid(format!("resource {id} has no name")));
        }
        if hourly_rate <= Decimal::ZERO {
            return Err(CatalogError::invalid(format!(
                "resource {id} hourly rate must be positive, got {hourly_rate}"
            )));
        }

        Ok(Self {
            id,
            name,
            abbreviation: abbreviation.into().trim().to_string(),
            unit_of_measure: unit_of_measure.into().trim().to_string(),
            kind,
            hourly_rate,
        })
    }

    /// Cost of using `quantity` units of this resource for `hours`
    pub fn cost(&self, hours: Decimal, quantity: Decimal) -> Result<Decimal, AmountOverflow> {
        checked_mul(checked_mul(self.hourly_rate, hours)?, quantity)
    }
}

#[derive(Deserialize)]
struct ResourceRecord {
    id: ResourceId,
    name: String,
    #[serde(default)]
    abbreviation: String,
    #[serde(default)]
    unit_of_measure: String,
    kind: ResourceKind,
    hourly_rate: Decimal,
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = CatalogError;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        Resource::new(
            record.id,
            record.name,
            record.abbreviation,
            record.unit_of_measure,
            record.kind,
            record.hourly_rate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resource_cost() {
        let cpu = Resource::new(ResourceId::new(1), "vCPU", "CPU", "core", ResourceKind::Hardware, dec!(2.0)).unwrap();
        assert_eq!(cpu.cost(dec!(5), dec!(3)), Ok(dec!(30.0)));
        assert_eq!(cpu.cost(Decimal::ZERO, dec!(3)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_cost_overflow_is_reported() {
        let rate = dec!(1000000000000000);
        let big = Resource::new(ResourceId::new(1), "Bulk", "B", "unit", ResourceKind::Hardware, rate).unwrap();
        assert_eq!(big.cost(dec!(100000), dec!(1000000000000000)), Err(AmountOverflow));
    }

    #[test]
    fn test_deserialize_validates_rate() {
        let ok: Resource = serde_json::from_str(
            r#"{"id":1,"name":"vCPU","abbreviation":"CPU","unit_of_measure":"core","kind":"Hardware","hourly_rate":"2.0"}"#,
        )
        .unwrap();
        assert_eq!(ok.hourly_rate, dec!(2.0));

        let zero = serde_json::from_str::<Resource>(
            r#"{"id":1,"name":"vCPU","abbreviation":"CPU","unit_of_measure":"core","kind":"Hardware","hourly_rate":"0"}"#,
        );
        assert!(zero.unwrap_err().to_string().contains("hourly rate must be positive"));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let zero = Resource::new(ResourceId::new(1), "vCPU", "CPU", "core", ResourceKind::Hardware, Decimal::ZERO);
        assert!(matches!(zero, Err(CatalogError::Validation(_))));

        let negative = Resource::new(ResourceId::new(1), "vCPU", "CPU", "core", ResourceKind::Hardware, dec!(-1));
        assert!(negative.is_err());
    }

    #[test]
    fn test_rejects_blank_name() {
        let blank = Resource::new(ResourceId::new(1), "   ", "CPU", "core", ResourceKind::Hardware, dec!(1));
        assert!(blank.is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Hardware".parse::<ResourceKind>().unwrap(), ResourceKind::Hardware);
        assert_eq!(" Software ".parse::<ResourceKind>().unwrap(), ResourceKind::Software);
        assert!("Firmware".parse::<ResourceKind>().is_err());
    }
}
