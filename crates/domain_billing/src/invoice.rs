//! Invoices
//!
//! An invoice is created once per client per billing run and never changes
//! after it is persisted. Amounts are held at full precision; the serializer
//! rounds `total_amount`, `line_total` and `cost` to two decimal places.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{checked_add, checked_sum, money::serialize_rounded, temporal::dmy, AmountOverflow, InstanceId, InvoiceNumber, Nit};

/// Cost of one resource within a line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCharge {
    /// Resource display name at billing time
    pub resource_name: String,
    /// Units of the resource in the configuration
    pub quantity: Decimal,
    /// Hours billed
    pub hours: Decimal,
    /// `hourly_rate * hours * quantity`
    #[serde(serialize_with = "serialize_rounded")]
    pub cost: Decimal,
}

/// One instance's billed consumption on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub instance_id: InstanceId,
    pub instance_name: String,
    /// Sum of the consumption durations that produced this line
    pub hours_consumed: Decimal,
    #[serde(serialize_with = "serialize_rounded")]
    line_total: Decimal,
    breakdown: Vec<ResourceCharge>,
}

impl InvoiceLineItem {
    /// Builds a line from its per-resource breakdown
    ///
    /// The line total is the sum of the breakdown costs.
    pub fn new(
        instance_id: InstanceId,
        instance_name: impl Into<String>,
        hours_consumed: Decimal,
        breakdown: Vec<ResourceCharge>,
    ) -> Result<Self, AmountOverflow> {
        let line_total = checked_sum(breakdown.iter().map(|charge| charge.cost))?;
        Ok(Self {
            instance_id,
            instance_name: instance_name.into(),
            hours_consumed,
            line_total,
            breakdown,
        })
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    /// Per-resource charges, in configuration order
    pub fn breakdown(&self) -> &[ResourceCharge] {
        &self.breakdown
    }
}

/// A committed bill for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Globally unique, strictly increasing number
    pub number: InvoiceNumber,
    /// Billed client
    pub client_nit: Nit,
    /// End of the billing window that produced the invoice
    #[serde(with = "dmy")]
    pub issue_date: NaiveDate,
    #[serde(serialize_with = "serialize_rounded")]
    total_amount: Decimal,
    #[serde(default)]
    lines: Vec<InvoiceLineItem>,
}

impl Invoice {
    /// Creates an empty invoice shell
    pub fn new(number: InvoiceNumber, client_nit: Nit, issue_date: NaiveDate) -> Self {
        Self {
            number,
            client_nit,
            issue_date,
            total_amount: Decimal::ZERO,
            lines: Vec::new(),
        }
    }

    /// Appends a line item and adds its total to the invoice total
    ///
    /// On overflow the invoice is left untouched.
    pub fn add_line(&mut self, line: InvoiceLineItem) -> Result<(), AmountOverflow> {
        self.total_amount = checked_add(self.total_amount, line.line_total)?;
        self.lines.push(line);
        Ok(())
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn lines(&self) -> &[InvoiceLineItem] {
        &self.lines
    }

    /// True when the invoice carries a strictly positive total
    pub fn is_billable(&self) -> bool {
        self.total_amount > Decimal::ZERO
    }
}
