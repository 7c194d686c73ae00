//! Monetary rounding
//!
//! Amounts, hours and quantities are `rust_decimal::Decimal` and are
//! accumulated at full precision. Rounding to two decimal places happens
//! only when a value leaves the system: in serializers and in report
//! projections.
//!
//! `Decimal` operators panic when a result leaves the representable range,
//! so amounts derived from stored data go through the checked helpers here.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Number of decimal places shown on invoices and reports
pub const DISPLAY_DECIMALS: u32 = 2;

/// Rounds a value for output using banker's rounding (round half to even)
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointNearestEven)
}

/// An amount exceeded the range a `Decimal` can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount exceeds the representable decimal range")]
pub struct AmountOverflow;

/// `a + b`, or `AmountOverflow`
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    a.checked_add(b).ok_or(AmountOverflow)
}

/// `a * b`, or `AmountOverflow`
pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    a.checked_mul(b).ok_or(AmountOverflow)
}

/// Sum of every value, or `AmountOverflow` as soon as a partial sum overflows
pub fn checked_sum<I>(values: I) -> Result<Decimal, AmountOverflow>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

/// Serializer that rounds a decimal for output
///
/// ```rust,ignore
/// #[serde(serialize_with = "core_kernel::money::serialize_rounded")]
/// total_amount: Decimal,
/// ```
pub fn serialize_rounded<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut rounded = round_display(*value);
    rounded.rescale(DISPLAY_DECIMALS);
    Serialize::serialize(&rounded, serializer)
}
