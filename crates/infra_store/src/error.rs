//! Storage error types
//!
//! Errors raised while reading or writing a snapshot file. They surface to
//! domain code as `PortError`.

use std::path::PathBuf;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON for the catalog schema
    #[error("Malformed snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot holds two records with the same identity
    #[error("Duplicate {entity} {id} in snapshot")]
    DuplicateRecord {
        entity: &'static str,
        id: String,
    },

    /// A previous writer panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Malformed {
            path: path.into(),
            source,
        }
    }
}

impl From<StoreError> for PortError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { path, source } => PortError::io(format!("snapshot {}", path.display()), source),
            StoreError::Malformed { .. } => PortError::serialization(err.to_string()),
            StoreError::DuplicateRecord { .. } => PortError::conflict(err.to_string()),
            StoreError::LockPoisoned => PortError::internal(err.to_string()),
        }
    }
}
