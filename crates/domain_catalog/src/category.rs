//! Categories and the priced configurations they own

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CategoryId, ConfigurationId, ResourceId};
use crate::error::CatalogError;

/// Units of one resource included in a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantity {
    pub resource_id: ResourceId,
    pub quantity: Decimal,
}

/// A priced bundle of resource quantities sellable to clients
///
/// Resource references are plain ids; they are checked against the catalog
/// when the configuration is added but a later resource deletion can leave
/// them dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigurationRecord")]
pub struct Configuration {
    /// Identifier, unique within the owning category and looked up globally
    pub id: ConfigurationId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Units of each resource, in the order they were added
    resource_quantities: Vec<ResourceQuantity>,
}

impl Configuration {
    /// Creates a configuration with no resources
    pub fn new(id: ConfigurationId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            description: description.into().trim().to_string(),
            resource_quantities: Vec::new(),
        }
    }

    /// Adds the quantity of a resource, or replaces it in place
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a negative quantity.
    pub fn with_resource(mut self, resource: ResourceId, quantity: Decimal) -> Result<Self, CatalogError> {
        if quantity < Decimal::ZERO {
            return Err(CatalogError::invalid(format!(
                "configuration {} quantity for {resource} must be non-negative, got {quantity}",
                self.id
            )));
        }
        match self.resource_quantities.iter_mut().find(|entry| entry.resource_id == resource) {
            Some(entry) => entry.quantity = quantity,
            None => self.resource_quantities.push(ResourceQuantity {
                resource_id: resource,
                quantity,
            }),
        }
        Ok(self)
    }

    /// Resource quantities, in the order they were added
    pub fn resource_quantities(&self) -> &[ResourceQuantity] {
        &self.resource_quantities
    }

    /// Ids of every referenced resource
    pub fn resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resource_quantities.iter().map(|entry| entry.resource_id)
    }

    /// Returns true if the configuration references the resource
    pub fn uses_resource(&self, resource: ResourceId) -> bool {
        self.resource_quantities.iter().any(|entry| entry.resource_id == resource)
    }
}

#[derive(Deserialize)]
struct ConfigurationRecord {
    id: ConfigurationId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    resource_quantities: Vec<ResourceQuantity>,
}

impl TryFrom<ConfigurationRecord> for Configuration {
    type Error = CatalogError;

    fn try_from(record: ConfigurationRecord) -> Result<Self, Self::Error> {
        record
            .resource_quantities
            .into_iter()
            .try_fold(Configuration::new(record.id, record.name, record.description), |configuration, entry| {
                configuration.with_resource(entry.resource_id, entry.quantity)
            })
    }
}

/// A group of configurations serving one kind of workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryRecord")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Kind of workload the category targets
    pub workload_label: String,
    /// Owned configurations, in insertion order
    configurations: Vec<Configuration>,
}

#[derive(Deserialize)]
struct CategoryRecord {
    id: CategoryId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    workload_label: String,
    #[serde(default)]
    configurations: Vec<Configuration>,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = CatalogError;

    fn try_from(record: CategoryRecord) -> Result<Self, Self::Error> {
        let mut category = Category::new(record.id, record.name, record.description, record.workload_label);
        for configuration in record.configurations {
            category.add_configuration(configuration)?;
        }
        Ok(category)
    }
}

impl Category {
    /// Creates an empty category
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
        workload_label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            description: description.into().trim().to_string(),
            workload_label: workload_label.into().trim().to_string(),
            configurations: Vec::new(),
        }
    }

    /// Owned configurations, in insertion order
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Finds an owned configuration
    pub fn configuration(&self, id: ConfigurationId) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.id == id)
    }

    /// Returns true if the category owns the configuration
    pub fn has_configuration(&self, id: ConfigurationId) -> bool {
        self.configuration(id).is_some()
    }

    /// Adds a configuration
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Duplicate` if the id is already owned.
    pub fn add_configuration(&mut self, configuration: Configuration) -> Result<(), CatalogError> {
        if self.has_configuration(configuration.id) {
            return Err(CatalogError::duplicate("configuration", configuration.id));
        }
        self.configurations.push(configuration);
        Ok(())
    }

    /// Replaces an owned configuration in place, keeping its position
    pub fn replace_configuration(&mut self, configuration: Configuration) -> Result<(), CatalogError> {
        let slot = self
            .configurations
            .iter_mut()
            .find(|c| c.id == configuration.id)
            .ok_or(CatalogError::ConfigurationNotFound(configuration.id))?;
        *slot = configuration;
        Ok(())
    }

    /// Removes an owned configuration, returning it if present
    pub fn remove_configuration(&mut self, id: ConfigurationId) -> Option<Configuration> {
        let index = self.configurations.iter().position(|c| c.id == id)?;
        Some(self.configurations.remove(index))
    }

    /// Removes and returns every owned configuration
    pub fn take_configurations(&mut self) -> Vec<Configuration> {
        std::mem::take(&mut self.configurations)
    }

    /// Ids of every owned configuration
    pub fn configuration_ids(&self) -> impl Iterator<Item = ConfigurationId> + '_ {
        self.configurations.iter().map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn small_vm() -> Configuration {
        Configuration::new(ConfigurationId::new(10), "Small VM", "2 vCPU / 4 GB")
            .with_resource(ResourceId::new(1), dec!(2)).unwrap()
            .with_resource(ResourceId::new(2), dec!(4)).unwrap()
    }

    #[test]
    fn test_configuration_resources() {
        let config = small_vm();
        let ids: Vec<_> = config.resource_ids().collect();

        assert_eq!(ids, vec![ResourceId::new(1), ResourceId::new(2)]);
        assert!(config.uses_resource(ResourceId::new(2)));
        assert!(!config.uses_resource(ResourceId::new(3)));
    }

    #[test]
    fn test_resource_quantities_keep_insertion_order() {
        let config = Configuration::new(ConfigurationId::new(11), "Storage", "")
            .with_resource(ResourceId::new(7), dec!(100)).unwrap()
            .with_resource(ResourceId::new(3), dec!(1)).unwrap()
            .with_resource(ResourceId::new(7), dec!(200)).unwrap();

        let entries = config.resource_quantities();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ResourceQuantity { resource_id: ResourceId::new(7), quantity: dec!(200) });
        assert_eq!(entries[1].resource_id, ResourceId::new(3));
    }

    #[test]
    fn test_deserialize_goes_through_constructors() {
        let restored: Category = serde_json::from_str(&serde_json::to_string(&{
            let mut category = Category::new(CategoryId::new(1), "Compute", "", "web");
            category.add_configuration(small_vm()).unwrap();
            category
        }).unwrap()).unwrap();
        assert_eq!(restored.configurations(), &[small_vm()]);

        let negative = serde_json::from_str::<Configuration>(
            r#"{"id":1,"name":"Bad","description":"","resource_quantities":[{"resource_id":1,"quantity":"-1"}]}"#,
        );
        assert!(negative.is_err());

        let duplicated = serde_json::from_str::<Category>(
            r#"{"id":1,"name":"Compute","description":"","workload_label":"web",
                "configurations":[{"id":10,"name":"A","description":""},{"id":10,"name":"B","description":""}]}"#,
        );
        assert!(duplicated.unwrap_err().to_string().contains("configuration"));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let result = Configuration::new(ConfigurationId::new(1), "Bad", "")
            .with_resource(ResourceId::new(1), dec!(-0.5));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_quantity_allowed() {
        let result = Configuration::new(ConfigurationId::new(1), "Idle", "")
            .with_resource(ResourceId::new(1), Decimal::ZERO);
        assert!(result.is_ok());
    }

    #[test]
    fn test_category_rejects_duplicate_configuration() {
        let mut category = Category::new(CategoryId::new(1), "Compute", "General purpose", "web");
        category.add_configuration(small_vm()).unwrap();

        let result = category.add_configuration(small_vm());
        assert!(matches!(result, Err(CatalogError::Duplicate { .. })));
        assert_eq!(category.configurations().len(), 1);
    }

    #[test]
    fn test_category_remove_and_replace() {
        let mut category = Category::new(CategoryId::new(1), "Compute", "General purpose", "web");
        category.add_configuration(small_vm()).unwrap();

        let mut renamed = small_vm();
        renamed.name = "Small VM v2".to_string();
        category.replace_configuration(renamed).unwrap();
        assert_eq!(category.configuration(ConfigurationId::new(10)).unwrap().name, "Small VM v2");

        let removed = category.remove_configuration(ConfigurationId::new(10));
        assert!(removed.is_some());
        assert!(category.configurations().is_empty());
        assert!(category.remove_configuration(ConfigurationId::new(10)).is_none());
    }
}
