//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{ConfigurationId, InstanceId, Nit, ResourceId};
use domain_catalog::{Category, CategoryPort, Client, ClientPort, Configuration, Consumption, Instance, Resource, ResourcePort};
use infra_store::InMemoryStore;

use crate::fixtures::{CatalogFixtures, IdFixtures, TemporalFixtures};

/// Builder for configurations
pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    pub fn new(id: ConfigurationId) -> Self {
        Self {
            configuration: Configuration::new(id, format!("Configuration {}", id.value()), ""),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.configuration.name = name.into();
        self
    }

    /// Adds a resource; panics on a negative quantity
    pub fn with_resource(mut self, resource: ResourceId, quantity: Decimal) -> Self {
        self.configuration = self
            .configuration
            .with_resource(resource, quantity)
            .expect("builder quantity must be non-negative");
        self
    }

    pub fn build(self) -> Configuration {
        self.configuration
    }
}

/// Builder for instances and their consumption
pub struct InstanceBuilder {
    id: InstanceId,
    configuration_id: ConfigurationId,
    name: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    consumptions: Vec<(Consumption, bool)>,
}

impl InstanceBuilder {
    /// Creates an active instance of the configuration, provisioned on 01/01/2024
    pub fn new(id: u32, configuration_id: ConfigurationId) -> Self {
        Self {
            id: InstanceId::new(id),
            configuration_id,
            name: format!("instance-{id}"),
            start_date: TemporalFixtures::provisioned(),
            end_date: None,
            consumptions: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn cancelled(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Adds an unbilled consumption event; the timestamp is stored verbatim
    pub fn consumption(mut self, hours: Decimal, timestamp: &str) -> Self {
        let consumption = Consumption::new(hours, timestamp).expect("builder hours must be non-negative");
        self.consumptions.push((consumption, false));
        self
    }

    /// Adds a consumption event already flagged as billed
    pub fn billed_consumption(mut self, hours: Decimal, timestamp: &str) -> Self {
        let consumption = Consumption::new(hours, timestamp).expect("builder hours must be non-negative");
        self.consumptions.push((consumption, true));
        self
    }

    pub fn build(self) -> Instance {
        let mut instance = Instance::new(self.id, self.configuration_id, self.name, self.start_date);
        if let Some(end_date) = self.end_date {
            instance.cancel(end_date).expect("builder end date must follow start date");
        }

        let mut billed = Vec::new();
        for (position, (consumption, is_billed)) in self.consumptions.into_iter().enumerate() {
            instance.record(consumption);
            if is_billed {
                billed.push(position);
            }
        }
        instance.mark_billed(&billed);
        instance
    }
}

/// Builder for clients
pub struct ClientBuilder {
    nit: Nit,
    name: String,
    instances: Vec<Instance>,
}

impl ClientBuilder {
    pub fn new(nit: Nit) -> Self {
        let name = format!("Client {nit}");
        Self {
            nit,
            name,
            instances: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn instance(mut self, instance: impl Into<Instance>) -> Self {
        self.instances.push(instance.into());
        self
    }

    pub fn build(self) -> Client {
        let username = self.nit.as_str().replace('-', "");
        let mut client = Client::new(self.nit, self.name, username, "Zone 10", "billing@client.test")
            .expect("builder client profile is valid");
        for instance in self.instances {
            client.add_instance(instance).expect("builder instance ids must be unique");
        }
        client
    }
}

impl From<InstanceBuilder> for Instance {
    fn from(builder: InstanceBuilder) -> Self {
        builder.build()
    }
}

/// Builder for a populated in-memory store
#[derive(Default)]
pub struct StoreBuilder {
    resources: Vec<Resource>,
    categories: Vec<Category>,
    clients: Vec<Client>,
}

impl StoreBuilder {
    /// Starts from the canonical catalog and no clients
    pub fn canonical() -> Self {
        Self {
            resources: CatalogFixtures::resources(),
            categories: vec![CatalogFixtures::compute()],
            clients: Vec::new(),
        }
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn client(mut self, client: Client) -> Self {
        self.clients.push(client);
        self
    }

    pub fn build(self) -> InMemoryStore {
        let store = InMemoryStore::new();
        for resource in &self.resources {
            store.save_resource(resource).expect("in-memory save");
        }
        for category in &self.categories {
            store.save_category(category).expect("in-memory save");
        }
        for client in &self.clients {
            store.save_client(client).expect("in-memory save");
        }
        store
    }
}

/// The canonical catalog with the given clients
pub fn seeded_store(clients: impl IntoIterator<Item = Client>) -> InMemoryStore {
    clients
        .into_iter()
        .fold(StoreBuilder::canonical(), StoreBuilder::client)
        .build()
}

/// A client of the canonical catalog running one Small VM
pub fn small_vm_client(nit: Nit, consumptions: &[(Decimal, &str)]) -> Client {
    let instance = consumptions
        .iter()
        .fold(InstanceBuilder::new(1, IdFixtures::SMALL_VM), |builder, (hours, ts)| {
            builder.consumption(*hours, ts)
        });
    ClientBuilder::new(nit).instance(instance).build()
}
