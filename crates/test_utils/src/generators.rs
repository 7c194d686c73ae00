//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating consumption and catalog
//! data that respect the domain's validation rules.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::temporal::TIMESTAMP_FORMAT;

/// Strategy for consumption durations, 0.00 to 99.99 hours
pub fn hours_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for strictly positive hourly rates, 0.0001 to 99.9999
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Strategy for resource quantities, 0 to 64 in steps of 0.5
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=128i64).prop_map(|n| Decimal::new(n * 5, 1))
}

fn year_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Strategy for instants in 2024, at minute resolution
pub fn instant_2024_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..366 * 24 * 60).prop_map(|minutes| year_start() + Duration::minutes(minutes))
}

/// Strategy for stored `dd/mm/yyyy hh:mm` timestamps in 2024
pub fn timestamp_2024_strategy() -> impl Strategy<Value = String> {
    instant_2024_strategy().prop_map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Strategy for consumption events: (hours, timestamp)
pub fn consumption_strategy() -> impl Strategy<Value = (Decimal, String)> {
    (hours_strategy(), timestamp_2024_strategy())
}

/// Strategy for a `dd/mm/yyyy` window inside 2024, start <= end
pub fn window_2024_strategy() -> impl Strategy<Value = (String, String)> {
    (0i64..366, 0i64..366).prop_map(|(a, b)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let day = |offset: i64| (year_start() + Duration::days(offset)).format("%d/%m/%Y").to_string();
        (day(lo), day(hi))
    })
}
