//! In-memory catalog store
//!
//! Implements every catalog and invoice port over one lock-guarded
//! [`CatalogSnapshot`]. Saves are full-record upserts that keep a record's
//! position; new records are appended. Invoices are create-only.
//!
//! The lock makes individual calls safe to share across threads. It does not
//! make a billing run atomic: callers still run one billing run at a time.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use core_kernel::{CategoryId, DomainPort, InvoiceNumber, Nit, PortError, ResourceId};
use domain_billing::{Invoice, InvoicePort};
use domain_catalog::{Category, CategoryPort, Client, ClientPort, Resource, ResourcePort};

use crate::error::StoreError;
use crate::snapshot::CatalogSnapshot;

/// Catalog store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<CatalogSnapshot>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the snapshot's records
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, StoreError> {
        snapshot.check_identities()?;
        Ok(Self {
            state: RwLock::new(snapshot),
        })
    }

    /// Copies the current contents out
    pub fn snapshot(&self) -> Result<CatalogSnapshot, PortError> {
        Ok(self.read()?.clone())
    }

    /// Drops every record
    pub fn clear(&self) -> Result<(), PortError> {
        *self.write()? = CatalogSnapshot::default();
        debug!("Store cleared");
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogSnapshot>, PortError> {
        self.state.read().map_err(|_| StoreError::LockPoisoned.into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogSnapshot>, PortError> {
        self.state.write().map_err(|_| StoreError::LockPoisoned.into())
    }
}

fn upsert<T: Clone, K: PartialEq>(records: &mut Vec<T>, record: &T, key: impl Fn(&T) -> K) {
    let id = key(record);
    match records.iter_mut().find(|existing| key(existing) == id) {
        Some(slot) => *slot = record.clone(),
        None => records.push(record.clone()),
    }
}

fn remove<T, K: PartialEq>(records: &mut Vec<T>, id: K, key: impl Fn(&T) -> K) -> bool {
    let before = records.len();
    records.retain(|record| key(record) != id);
    records.len() != before
}

impl DomainPort for InMemoryStore {}

impl ResourcePort for InMemoryStore {
    fn load_resources(&self) -> Result<Vec<Resource>, PortError> {
        Ok(self.read()?.resources.clone())
    }

    fn load_resource(&self, id: ResourceId) -> Result<Option<Resource>, PortError> {
        Ok(self.read()?.resources.iter().find(|r| r.id == id).cloned())
    }

    fn save_resource(&self, resource: &Resource) -> Result<(), PortError> {
        upsert(&mut self.write()?.resources, resource, |r| r.id);
        Ok(())
    }

    fn delete_resource(&self, id: ResourceId) -> Result<bool, PortError> {
        Ok(remove(&mut self.write()?.resources, id, |r| r.id))
    }
}

impl CategoryPort for InMemoryStore {
    fn load_categories(&self) -> Result<Vec<Category>, PortError> {
        Ok(self.read()?.categories.clone())
    }

    fn load_category(&self, id: CategoryId) -> Result<Option<Category>, PortError> {
        Ok(self.read()?.categories.iter().find(|c| c.id == id).cloned())
    }

    fn save_category(&self, category: &Category) -> Result<(), PortError> {
        upsert(&mut self.write()?.categories, category, |c| c.id);
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> Result<bool, PortError> {
        Ok(remove(&mut self.write()?.categories, id, |c| c.id))
    }
}

impl ClientPort for InMemoryStore {
    fn load_clients(&self) -> Result<Vec<Client>, PortError> {
        Ok(self.read()?.clients.clone())
    }

    fn load_client(&self, nit: &Nit) -> Result<Option<Client>, PortError> {
        Ok(self.read()?.clients.iter().find(|c| &c.nit == nit).cloned())
    }

    fn save_client(&self, client: &Client) -> Result<(), PortError> {
        upsert(&mut self.write()?.clients, client, |c| c.nit.clone());
        Ok(())
    }

    fn delete_client(&self, nit: &Nit) -> Result<bool, PortError> {
        Ok(remove(&mut self.write()?.clients, nit.clone(), |c| c.nit.clone()))
    }
}

impl InvoicePort for InMemoryStore {
    fn load_invoices(&self) -> Result<Vec<Invoice>, PortError> {
        Ok(self.read()?.invoices.clone())
    }

    fn load_invoice(&self, number: InvoiceNumber) -> Result<Option<Invoice>, PortError> {
        Ok(self.read()?.invoices.iter().find(|i| i.number == number).cloned())
    }

    fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        let mut state = self.write()?;
        if state.invoices.iter().any(|existing| existing.number == invoice.number) {
            return Err(PortError::conflict(format!("invoice {} already exists", invoice.number)));
        }
        state.invoices.push(invoice.clone());
        Ok(())
    }

    fn max_invoice_number(&self) -> Result<Option<InvoiceNumber>, PortError> {
        Ok(self.read()?.invoices.iter().map(|i| i.number).max())
    }
}
