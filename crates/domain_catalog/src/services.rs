//! Catalog domain services
//!
//! The store ports are plain upserts and deletes. `CatalogService` layers the
//! referential-integrity rules of the catalog on top of them: a resource can't
//! be removed while a configuration prices it, a configuration can't be
//! removed while an instance runs it, and new records must point at things
//! that exist.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use core_kernel::{CategoryId, ConfigurationId, InstanceId, Nit, ResourceId};

use crate::category::{Category, Configuration};
use crate::client::{Client, Consumption, Instance};
use crate::error::CatalogError;
use crate::ports::CatalogPort;
use crate::resource::Resource;
use crate::validation::normalize_timestamp;

/// Outcome of checking a configuration against the resource catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationCheck {
    pub configuration_id: ConfigurationId,
    /// True when every referenced resource exists
    pub valid: bool,
    /// Referenced resource ids absent from the catalog, ascending
    pub missing_resources: Vec<ResourceId>,
}

/// Guarded catalog mutations over any [`CatalogPort`]
pub struct CatalogService<'s, S: CatalogPort + ?Sized> {
    store: &'s S,
}

impl<'s, S: CatalogPort + ?Sized> CatalogService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Adds a resource
    ///
    /// # Errors
    ///
    /// `CatalogError::Duplicate` if the id is taken.
    pub fn add_resource(&self, resource: Resource) -> Result<(), CatalogError> {
        if self.store.load_resource(resource.id)?.is_some() {
            return Err(CatalogError::duplicate("resource", resource.id));
        }
        self.store.save_resource(&resource)?;
        info!(resource = %resource.id, name = %resource.name, "Resource added");
        Ok(())
    }

    /// Adds an empty category
    pub fn add_category(&self, category: Category) -> Result<(), CatalogError> {
        if self.store.load_category(category.id)?.is_some() {
            return Err(CatalogError::duplicate("category", category.id));
        }
        self.store.save_category(&category)?;
        info!(category = %category.id, name = %category.name, "Category added");
        Ok(())
    }

    /// Adds a client
    pub fn add_client(&self, client: Client) -> Result<(), CatalogError> {
        if self.store.load_client(&client.nit)?.is_some() {
            return Err(CatalogError::duplicate("client", &client.nit));
        }
        self.store.save_client(&client)?;
        info!(client = %client.nit, "Client added");
        Ok(())
    }

    /// Deletes a resource no configuration references
    ///
    /// # Errors
    ///
    /// - `CatalogError::ResourceInUse` naming the first referencing configuration
    /// - `CatalogError::ResourceNotFound` if the id is unknown
    pub fn delete_resource(&self, id: ResourceId) -> Result<(), CatalogError> {
        for category in self.store.load_categories()? {
            if let Some(configuration) = category.configurations().iter().find(|c| c.uses_resource(id)) {
                return Err(CatalogError::ResourceInUse {
                    resource: id,
                    configuration: configuration.id,
                });
            }
        }

        if !self.store.delete_resource(id)? {
            return Err(CatalogError::ResourceNotFound(id));
        }
        info!(resource = %id, "Resource deleted");
        Ok(())
    }

    /// Deletes a category none of whose configurations are in use
    pub fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        let category = self
            .store
            .load_category(id)?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        let clients = self.store.load_clients()?;
        for configuration in category.configuration_ids() {
            if let Some((client, instance)) = first_user(&clients, configuration) {
                return Err(CatalogError::CategoryInUse {
                    category: id,
                    configuration,
                    client,
                    instance,
                });
            }
        }

        self.store.delete_category(id)?;
        info!(category = %id, "Category deleted");
        Ok(())
    }

    /// Deletes a configuration no instance references
    pub fn delete_configuration(&self, id: ConfigurationId) -> Result<(), CatalogError> {
        let (category_id, _) = self
            .store
            .find_configuration(id)?
            .ok_or(CatalogError::ConfigurationNotFound(id))?;

        if let Some((client, instance)) = first_user(&self.store.load_clients()?, id) {
            return Err(CatalogError::ConfigurationInUse {
                configuration: id,
                client,
                instance,
            });
        }

        let mut category = self
            .store
            .load_category(category_id)?
            .ok_or(CatalogError::CategoryNotFound(category_id))?;
        category.remove_configuration(id);
        self.store.save_category(&category)?;
        info!(configuration = %id, category = %category_id, "Configuration deleted");
        Ok(())
    }

    /// Adds a configuration to a category
    ///
    /// # Errors
    ///
    /// - `CatalogError::CategoryNotFound`
    /// - `CatalogError::ResourceNotFound` for the first resource key missing from the catalog
    /// - `CatalogError::Duplicate` if the category already owns the id
    pub fn add_configuration(&self, category_id: CategoryId, configuration: Configuration) -> Result<(), CatalogError> {
        let mut category = self
            .store
            .load_category(category_id)?
            .ok_or(CatalogError::CategoryNotFound(category_id))?;

        if let Some(missing) = self.missing_resources(&configuration)?.into_iter().next() {
            return Err(CatalogError::ResourceNotFound(missing));
        }

        let configuration_id = configuration.id;
        category.add_configuration(configuration)?;
        self.store.save_category(&category)?;
        info!(configuration = %configuration_id, category = %category_id, "Configuration added");
        Ok(())
    }

    /// Provisions an instance for a client
    pub fn add_instance(&self, nit: &Nit, instance: Instance) -> Result<(), CatalogError> {
        let mut client = self.client(nit)?;

        if self.store.find_configuration(instance.configuration_id)?.is_none() {
            return Err(CatalogError::ConfigurationNotFound(instance.configuration_id));
        }

        let instance_id = instance.id;
        client.add_instance(instance)?;
        self.store.save_client(&client)?;
        info!(client = %nit, instance = %instance_id, "Instance provisioned");
        Ok(())
    }

    /// Cancels a client's instance as of `end_date`
    pub fn cancel_instance(&self, nit: &Nit, instance_id: InstanceId, end_date: NaiveDate) -> Result<(), CatalogError> {
        let mut client = self.client(nit)?;
        client
            .instance_mut(instance_id)
            .ok_or_else(|| CatalogError::InstanceNotFound {
                client: nit.clone(),
                instance: instance_id,
            })?
            .cancel(end_date)?;
        self.store.save_client(&client)?;
        info!(client = %nit, instance = %instance_id, %end_date, "Instance cancelled");
        Ok(())
    }

    /// Appends an unbilled consumption event to a client's instance
    ///
    /// The timestamp is normalized from free text; text without a
    /// recognizable date is stored as given and never billed.
    pub fn record_consumption(
        &self,
        nit: &Nit,
        instance_id: InstanceId,
        hours: Decimal,
        raw_timestamp: &str,
    ) -> Result<Consumption, CatalogError> {
        let consumption = Consumption::new(hours, normalize_timestamp(raw_timestamp))?;

        let mut client = self.client(nit)?;
        client
            .instance_mut(instance_id)
            .ok_or_else(|| CatalogError::InstanceNotFound {
                client: nit.clone(),
                instance: instance_id,
            })?
            .record(consumption.clone());
        self.store.save_client(&client)?;
        Ok(consumption)
    }

    /// Reports which resources a configuration references but the catalog lacks
    pub fn validate_configuration(&self, id: ConfigurationId) -> Result<ConfigurationCheck, CatalogError> {
        let (_, configuration) = self
            .store
            .find_configuration(id)?
            .ok_or(CatalogError::ConfigurationNotFound(id))?;
        let missing_resources = self.missing_resources(&configuration)?;

        Ok(ConfigurationCheck {
            configuration_id: id,
            valid: missing_resources.is_empty(),
            missing_resources,
        })
    }

    fn client(&self, nit: &Nit) -> Result<Client, CatalogError> {
        self.store
            .load_client(nit)?
            .ok_or_else(|| CatalogError::ClientNotFound(nit.clone()))
    }

    fn missing_resources(&self, configuration: &Configuration) -> Result<Vec<ResourceId>, CatalogError> {
        let known: Vec<ResourceId> = self.store.load_resources()?.iter().map(|r| r.id).collect();
        Ok(configuration.resource_ids().filter(|id| !known.contains(id)).collect())
    }
}

fn first_user(clients: &[Client], configuration: ConfigurationId) -> Option<(Nit, InstanceId)> {
    clients.iter().find_map(|client| {
        client
            .instance_using(configuration)
            .map(|instance| (client.nit.clone(), instance.id))
    })
}
