//! Strongly-typed identifiers for catalog and billing entities
//!
//! Catalog records are keyed by small positive integers assigned by the
//! operator, so the identifiers are newtypes over `u32` rather than UUIDs.
//! The wrappers keep a resource id from ever being passed where a
//! configuration id is expected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw numeric identifier
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Returns the raw numeric value
            pub const fn value(&self) -> u32 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.trim();
                let raw = raw.strip_prefix(concat!($prefix, "-")).unwrap_or(raw);
                raw.parse::<u32>()
                    .map(Self)
                    .map_err(|_| CoreError::validation(format!("invalid {}: {}", stringify!($name), s)))
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

// Catalog identifiers
define_id!(ResourceId, "RES");
define_id!(CategoryId, "CAT");
define_id!(ConfigurationId, "CFG");
define_id!(InstanceId, "INS");

// Billing identifiers
define_id!(InvoiceNumber, "INV");

impl InvoiceNumber {
    /// The number handed out when no invoice has ever been persisted
    pub const FIRST: InvoiceNumber = InvoiceNumber(1);

    /// Returns the number immediately after this one, or `None` once the
    /// sequence is exhausted
    pub fn next(&self) -> Option<InvoiceNumber> {
        self.0.checked_add(1).map(InvoiceNumber)
    }
}

static NIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+-[0-9K]$").expect("NIT pattern is a valid regex")
});

/// Client tax identifier
///
/// A NIT is a run of digits, a hyphen, and a single check character that is
/// either a digit or the literal `K` (e.g. `12345-6`, `110339001-K`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nit(String);

impl Nit {
    /// Parses and validates a NIT
    ///
    /// Surrounding whitespace is ignored; anything else that does not match
    /// `digits-[0-9K]` is rejected.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if NIT_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::validation(format!("invalid NIT: {raw}")))
        }
    }

    /// Returns true if the text is a well-formed NIT
    pub fn is_valid(raw: &str) -> bool {
        NIT_PATTERN.is_match(raw.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Nit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nit::parse(s)
    }
}

impl TryFrom<String> for Nit {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Nit::parse(&value)
    }
}

impl From<Nit> for String {
    fn from(nit: Nit) -> String {
        nit.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_display() {
        let id = ResourceId::new(7);
        assert_eq!(id.to_string(), "RES-7");
    }

    #[test]
    fn test_id_parsing() {
        let parsed: ConfigurationId = "CFG-10".parse().unwrap();
        assert_eq!(parsed, ConfigurationId::new(10));

        let bare: ConfigurationId = "10".parse().unwrap();
        assert_eq!(bare, parsed);

        assert!("CFG-x".parse::<ConfigurationId>().is_err());
    }

    #[test]
    fn test_invoice_number_next() {
        assert_eq!(InvoiceNumber::FIRST.next(), Some(InvoiceNumber::new(2)));
        assert_eq!(InvoiceNumber::new(u32::MAX).next(), None);
    }

    #[test]
    fn test_nit_validation() {
        assert!(Nit::parse("12345-6").is_ok());
        assert!(Nit::parse("110339001-K").is_ok());
        assert!(Nit::parse(" 4578-9 ").is_ok());

        assert!(Nit::parse("12345-k").is_err());
        assert!(Nit::parse("12345-67").is_err());
        assert!(Nit::parse("ABC-1").is_err());
        assert!(Nit::parse("12345").is_err());
        assert!(Nit::parse("").is_err());
    }

    #[test]
    fn test_nit_serde_rejects_malformed() {
        let ok: Nit = serde_json::from_str("\"12345-6\"").unwrap();
        assert_eq!(ok.as_str(), "12345-6");

        let bad: Result<Nit, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
