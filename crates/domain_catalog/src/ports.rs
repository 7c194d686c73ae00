//! Catalog Store ports
//!
//! Each entity family gets its own trait with the same shape: load every
//! record in store order, load one by key, upsert a full record, delete by
//! key. Keeping the families separate lets a test double implement only what
//! a service actually reads.
//!
//! ```rust,ignore
//! fn price(store: &impl CatalogPort, id: ConfigurationId) -> Result<Decimal, PortError> {
//!     let resources = store.load_resources()?;
//!     let configuration = store.find_configuration(id)?;
//!     // ...
//! }
//! ```

use core_kernel::{CategoryId, ConfigurationId, DomainPort, Nit, PortError, ResourceId};

use crate::category::{Category, Configuration};
use crate::client::Client;
use crate::resource::Resource;

/// Storage for the resource catalog
pub trait ResourcePort: DomainPort {
    /// Every resource, in store order
    fn load_resources(&self) -> Result<Vec<Resource>, PortError>;

    /// One resource by id
    fn load_resource(&self, id: ResourceId) -> Result<Option<Resource>, PortError>;

    /// Inserts or fully overwrites a resource
    fn save_resource(&self, resource: &Resource) -> Result<(), PortError>;

    /// Removes a resource, returning whether it existed
    fn delete_resource(&self, id: ResourceId) -> Result<bool, PortError>;
}

/// Storage for categories and the configurations they own
pub trait CategoryPort: DomainPort {
    /// Every category, in store order
    fn load_categories(&self) -> Result<Vec<Category>, PortError>;

    /// One category by id
    fn load_category(&self, id: CategoryId) -> Result<Option<Category>, PortError>;

    /// Inserts or fully overwrites a category with its configurations
    fn save_category(&self, category: &Category) -> Result<(), PortError>;

    /// Removes a category, returning whether it existed
    fn delete_category(&self, id: CategoryId) -> Result<bool, PortError>;

    /// Looks a configuration up across every category
    ///
    /// Configuration ids are only unique within a category; the first match
    /// in category order wins.
    fn find_configuration(&self, id: ConfigurationId) -> Result<Option<(CategoryId, Configuration)>, PortError> {
        Ok(self.load_categories()?.into_iter().find_map(|category| {
            category.configuration(id).cloned().map(|configuration| (category.id, configuration))
        }))
    }
}

/// Storage for clients with their instances and consumption
pub trait ClientPort: DomainPort {
    /// Every client, in store order
    fn load_clients(&self) -> Result<Vec<Client>, PortError>;

    /// One client by tax identifier
    fn load_client(&self, nit: &Nit) -> Result<Option<Client>, PortError>;

    /// Inserts or fully overwrites a client aggregate
    fn save_client(&self, client: &Client) -> Result<(), PortError>;

    /// Removes a client, returning whether it existed
    fn delete_client(&self, nit: &Nit) -> Result<bool, PortError>;
}

/// The full catalog: resources, categories and clients
pub trait CatalogPort: ResourcePort + CategoryPort + ClientPort {}

impl<T> CatalogPort for T where T: ResourcePort + CategoryPort + ClientPort {}
