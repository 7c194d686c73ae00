//! Operator input normalization
//!
//! Consumption feeds arrive as loosely formatted text ("05/01/2024 10:30 UTC",
//! "metered at 5/1/2024 9:05"). These helpers pull the first recognizable
//! date or date-time out of such text and render it in the canonical
//! `dd/mm/yyyy hh:mm` layout used by stored consumption.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use core_kernel::temporal::TIMESTAMP_FORMAT;
use core_kernel::Nit;

use crate::error::CatalogError;

static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{2})").expect("valid timestamp regex")
});

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid date regex"));

fn captured_date(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let year = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Extracts the first `d/m/yyyy h:mm` occurrence in free text
pub fn extract_timestamp(text: &str) -> Option<NaiveDateTime> {
    let caps = TIMESTAMP_PATTERN.captures(text)?;
    let date = captured_date(&caps)?;
    let hour = caps.get(4)?.as_str().parse().ok()?;
    let minute = caps.get(5)?.as_str().parse().ok()?;
    Some(date.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?))
}

/// Extracts the first `d/m/yyyy` occurrence in free text
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.captures(text)?;
    captured_date(&caps)
}

/// Normalizes a raw consumption timestamp for storage
///
/// Text holding a full date-time becomes `dd/mm/yyyy hh:mm`; text holding only
/// a date becomes that date at `00:00`. Anything else is kept verbatim (trimmed)
/// and will never match a billing window.
pub fn normalize_timestamp(raw: &str) -> String {
    if let Some(ts) = extract_timestamp(raw) {
        return ts.format(TIMESTAMP_FORMAT).to_string();
    }
    match extract_date(raw) {
        Some(date) => date.and_time(NaiveTime::MIN).format(TIMESTAMP_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parses operator-supplied text as a client NIT
pub fn parse_nit(raw: &str) -> Result<Nit, CatalogError> {
    Nit::parse(raw).map_err(|_| CatalogError::InvalidNit(raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_timestamp_from_noise() {
        let ts = extract_timestamp("metered at 5/1/2024 9:05 by agent-3").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "05/01/2024 09:05");
    }

    #[test]
    fn test_extract_rejects_impossible_dates() {
        assert!(extract_timestamp("31/02/2024 10:00").is_none());
        assert!(extract_timestamp("01/01/2024 25:00").is_none());
        assert!(extract_date("no date here").is_none());
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp("05/01/2024 10:30 UTC"), "05/01/2024 10:30");
        assert_eq!(normalize_timestamp("  7/3/2024 "), "07/03/2024 00:00");
        assert_eq!(normalize_timestamp(" garbage "), "garbage");
    }

    #[test]
    fn test_parse_nit() {
        assert_eq!(parse_nit(" 12345-6 ").unwrap().as_str(), "12345-6");
        assert!(matches!(parse_nit("12345-X"), Err(CatalogError::InvalidNit(raw)) if raw == "12345-X"));
    }
}
