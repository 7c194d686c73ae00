//! Unit tests for billing windows and timestamp parsing
//!
//! Tests cover DateWindow construction, boundary inclusivity, the
//! date-only timestamp fallback, and the dd/mm/yyyy serde adapter.

use core_kernel::temporal::{self, TemporalError, DATE_FORMAT};
use core_kernel::{DateWindow, parse_date, parse_timestamp, format_date};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

fn day(d: u32, m: u32, y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_window {
    use super::*;

    mod creation {
        use super::*;

        #[test]
        fn test_parse_creates_window() {
            let window = DateWindow::parse("01/01/2024", "31/01/2024").unwrap();

            assert_eq!(window.start(), day(1, 1, 2024));
            assert_eq!(window.end(), day(31, 1, 2024));
        }

        #[test]
        fn test_start_equal_to_end_is_allowed() {
            let window = DateWindow::parse("10/10/2024", "10/10/2024");
            assert!(window.is_ok());
        }

        #[test]
        fn test_start_after_end_fails() {
            let result = DateWindow::parse("31/12/2024", "01/01/2024");

            match result {
                Err(TemporalError::InvalidDateRange { start, end }) => {
                    assert_eq!(start, "31/12/2024");
                    assert_eq!(end, "01/01/2024");
                }
                other => panic!("Expected InvalidDateRange, got {:?}", other),
            }
        }

        #[test]
        fn test_malformed_start_fails() {
            let result = DateWindow::parse("2024/01/01", "31/01/2024");
            assert!(matches!(result, Err(TemporalError::InvalidDateFormat(s)) if s == "2024/01/01"));
        }

        #[test]
        fn test_impossible_calendar_day_fails() {
            let result = DateWindow::parse("30/02/2024", "31/03/2024");
            assert!(matches!(result, Err(TemporalError::InvalidDateFormat(_))));
        }

        #[test]
        fn test_display() {
            let window = DateWindow::parse("01/01/2024", "31/01/2024").unwrap();
            assert_eq!(window.to_string(), "01/01/2024 - 31/01/2024");
        }
    }

    mod containment {
        use super::*;

        fn january() -> DateWindow {
            DateWindow::parse("01/01/2024", "31/01/2024").unwrap()
        }

        #[test]
        fn test_exact_start_is_included() {
            let start = day(1, 1, 2024).and_time(NaiveTime::MIN);
            assert!(january().contains(start));
        }

        #[test]
        fn test_exact_end_is_included() {
            let end = day(31, 1, 2024).and_time(NaiveTime::MIN);
            assert!(january().contains(end));
        }

        #[test]
        fn test_one_hour_before_start_is_excluded() {
            let before = day(1, 1, 2024).and_time(NaiveTime::MIN) - Duration::hours(1);
            assert!(!january().contains(before));
        }

        #[test]
        fn test_one_hour_after_end_is_excluded() {
            let after = day(31, 1, 2024).and_time(NaiveTime::MIN) + Duration::hours(1);
            assert!(!january().contains(after));
        }

        #[test]
        fn test_contains_date_is_inclusive() {
            let window = january();
            assert!(window.contains_date(day(1, 1, 2024)));
            assert!(window.contains_date(day(31, 1, 2024)));
            assert!(!window.contains_date(day(1, 2, 2024)));
        }
    }
}

mod timestamps {
    use super::*;

    #[test]
    fn test_full_timestamp() {
        let ts = parse_timestamp("14/02/2024 08:15").unwrap();
        assert_eq!(ts, day(14, 2, 2024).and_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(parse_timestamp("  14/02/2024 08:15 ").is_some());
    }

    #[test]
    fn test_date_only_value_is_midnight() {
        let ts = parse_timestamp("14/02/2024").unwrap();
        assert_eq!(ts, day(14, 2, 2024).and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_garbage_time_uses_leading_date() {
        let ts = parse_timestamp("14/02/2024 late-evening").unwrap();
        assert_eq!(ts.date(), day(14, 2, 2024));
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert!(parse_timestamp("sometime in February").is_none());
        assert!(parse_timestamp("   ").is_none());
    }
}

mod formatting {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "temporal::dmy")]
        issued: NaiveDate,
        #[serde(with = "temporal::dmy::option", default)]
        closed: Option<NaiveDate>,
    }

    #[test]
    fn test_format_round_trip() {
        let date = day(3, 7, 2024);
        assert_eq!(format_date(date), "03/07/2024");
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        assert_eq!(date.format(DATE_FORMAT).to_string(), "03/07/2024");
    }

    #[test]
    fn test_dmy_serde() {
        let value = Stamped { issued: day(3, 7, 2024), closed: None };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"issued":"03/07/2024","closed":null}"#);

        let back: Stamped = serde_json::from_str(r#"{"issued":"03/07/2024","closed":"04/07/2024"}"#).unwrap();
        assert_eq!(back.closed, Some(day(4, 7, 2024)));
    }

    #[test]
    fn test_dmy_option_treats_blank_as_none() {
        let back: Stamped = serde_json::from_str(r#"{"issued":"03/07/2024","closed":""}"#).unwrap();
        assert_eq!(back.closed, None);
    }

    #[test]
    fn test_dmy_rejects_iso_dates() {
        let result: Result<Stamped, _> = serde_json::from_str(r#"{"issued":"2024-07-03"}"#);
        assert!(result.is_err());
    }
}
