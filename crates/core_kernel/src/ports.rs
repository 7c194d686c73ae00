//! Ports infrastructure
//!
//! Each domain crate declares the storage operations it needs as a port
//! trait extending [`DomainPort`]. Adapters (the in-memory store, the JSON
//! snapshot loader, a test double) implement those traits and report every
//! failure through [`PortError`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   InvoiceBuilder / SalesAnalytics / ...      │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  ResourcePort, CategoryPort, ClientPort,     │
//! │  InvoicePort                                 │
//! └──────────────────────────────────────────────┘
//!                       ▲
//!                       │
//!              ┌────────┴────────┐
//!              │  infra_store    │
//!              └─────────────────┘
//! ```
//!
//! Ports are synchronous. Every operation is a blocking read or write and
//! callers guarantee that at most one writer touches a store at a time.

use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// so domain services can propagate storage failures without knowing which
/// adapter produced them.
#[derive(Debug, Error)]
pub enum PortError {
    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Reading or writing the backing medium failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Encoding or decoding a stored record failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PortError {
    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Io error wrapping the underlying cause
    pub fn io(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        PortError::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        PortError::Serialization {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a write conflicting with stored data
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so adapters can be shared across threads.
pub trait DomainPort: Send + Sync + 'static {}
