//! Catalog domain errors
//!
//! This module defines the errors raised when catalog entities are built
//! from operator input and when referential-integrity rules block a change.

use thiserror::Error;

use core_kernel::{CategoryId, ConfigurationId, CoreError, InstanceId, Nit, PortError, ResourceId};

/// Errors that can occur in the catalog domain
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed entity data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tax identifier does not match `digits-[0-9K]`
    #[error("Invalid NIT: {0}")]
    InvalidNit(String),

    /// Instance state outside {Active, Cancelled}
    #[error("Invalid instance state: {0}")]
    InvalidInstanceState(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Configuration not found in any category
    #[error("Configuration not found: {0}")]
    ConfigurationNotFound(ConfigurationId),

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(Nit),

    /// Instance not found for the given client
    #[error("Instance {instance} not found for client {client}")]
    InstanceNotFound {
        client: Nit,
        instance: InstanceId,
    },

    /// Resource still referenced by a configuration
    #[error("Resource {resource} is used by configuration {configuration}")]
    ResourceInUse {
        resource: ResourceId,
        configuration: ConfigurationId,
    },

    /// Configuration still referenced by an instance
    #[error("Configuration {configuration} is used by instance {instance} of client {client}")]
    ConfigurationInUse {
        configuration: ConfigurationId,
        client: Nit,
        instance: InstanceId,
    },

    /// Category owns a configuration that an instance still uses
    #[error("Category {category} cannot be deleted: configuration {configuration} is used by instance {instance} of client {client}")]
    CategoryInUse {
        category: CategoryId,
        configuration: ConfigurationId,
        client: Nit,
        instance: InstanceId,
    },

    /// Identity already taken
    #[error("Duplicate {entity}: {id}")]
    Duplicate {
        entity: &'static str,
        id: String,
    },

    /// Storage failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl CatalogError {
    /// Creates a Validation error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    /// Creates a Duplicate error
    pub fn duplicate(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CatalogError::Duplicate {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for CatalogError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => CatalogError::Validation(message),
        }
    }
}
