//! JSON snapshot persistence
//!
//! The whole catalog is one JSON document with a collection per entity
//! family. Collections keep store order, which is the order the billing run
//! visits clients in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use tracing::{debug, info};

use domain_billing::Invoice;
use domain_catalog::{Category, Client, Resource};

use crate::error::StoreError;

/// Every persisted collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl CatalogSnapshot {
    /// Rejects collections holding two records with the same identity
    pub fn check_identities(&self) -> Result<(), StoreError> {
        first_duplicate("resource", self.resources.iter().map(|r| r.id))?;
        first_duplicate("category", self.categories.iter().map(|c| c.id))?;
        first_duplicate("client", self.clients.iter().map(|c| c.nit.clone()))?;
        first_duplicate("invoice", self.invoices.iter().map(|i| i.number))?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.categories.is_empty() && self.clients.is_empty() && self.invoices.is_empty()
    }
}

fn first_duplicate<K>(entity: &'static str, keys: impl Iterator<Item = K>) -> Result<(), StoreError>
where
    K: Eq + Hash + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(StoreError::DuplicateRecord {
                entity,
                id: key.to_string(),
            });
        }
        seen.insert(key);
    }
    Ok(())
}

/// Reads a snapshot, returning an empty one when the file doesn't exist
pub fn load_snapshot(path: &Path) -> Result<CatalogSnapshot, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot on disk, starting empty");
        return Ok(CatalogSnapshot::default());
    }

    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let snapshot: CatalogSnapshot = serde_json::from_str(&raw).map_err(|e| StoreError::malformed(path, e))?;
    snapshot.check_identities()?;

    info!(
        path = %path.display(),
        resources = snapshot.resources.len(),
        categories = snapshot.categories.len(),
        clients = snapshot.clients.len(),
        invoices = snapshot.invoices.len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Writes a snapshot as pretty JSON
///
/// The document is written next to the target and renamed over it, so a
/// failed write leaves the previous snapshot intact.
pub fn save_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::malformed(path, e))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|e| StoreError::io(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| StoreError::io(path, e))?;

    info!(path = %path.display(), invoices = snapshot.invoices.len(), "Snapshot saved");
    Ok(())
}
