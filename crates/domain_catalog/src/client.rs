//! Clients, their provisioned instances, and metered consumption
//!
//! A `Client` owns its `Instance`s and every instance owns its
//! `Consumption` events. The aggregate is stored and loaded as one record,
//! so flipping a consumption's billed flag means saving the whole client.
//! Stored records are read back through the same constructors that build
//! new ones.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use core_kernel::{checked_sum, parse_timestamp, temporal::dmy, AmountOverflow, ConfigurationId, InstanceId, Nit};
use crate::error::CatalogError;

/// Lifecycle state of an instance
///
/// Only these two values exist. Text from legacy Spanish-language feeds
/// (`Vigente`, `Cancelada`) is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceState {
    #[serde(alias = "Vigente")]
    Active,
    #[serde(alias = "Cancelada")]
    Cancelled,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceState::Active => f.write_str("Active"),
            InstanceState::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl FromStr for InstanceState {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Active" | "Vigente" => Ok(InstanceState::Active),
            "Cancelled" | "Cancelada" => Ok(InstanceState::Cancelled),
            other => Err(CatalogError::InvalidInstanceState(other.to_string())),
        }
    }
}

/// A metered usage event
///
/// The billed flag only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConsumptionRecord")]
pub struct Consumption {
    duration_hours: Decimal,
    timestamp: String,
    billed: bool,
}

impl Consumption {
    /// Creates an unbilled consumption
    ///
    /// The timestamp is kept verbatim; events whose timestamp cannot be
    /// parsed are never selected for billing.
    pub fn new(duration_hours: Decimal, timestamp: impl Into<String>) -> Result<Self, CatalogError> {
        if duration_hours < Decimal::ZERO {
            return Err(CatalogError::invalid(format!(
                "consumption duration must be non-negative, got {duration_hours}"
            )));
        }
        Ok(Self {
            duration_hours,
            timestamp: timestamp.into(),
            billed: false,
        })
    }

    pub fn duration_hours(&self) -> Decimal {
        self.duration_hours
    }

    /// Raw `dd/mm/yyyy hh:mm` text as recorded
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Parsed timestamp, if the stored text is readable
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    pub fn is_billed(&self) -> bool {
        self.billed
    }

    /// Marks the event as billed
    pub fn mark_billed(&mut self) {
        self.billed = true;
    }
}

#[derive(Deserialize)]
struct ConsumptionRecord {
    duration_hours: Decimal,
    timestamp: String,
    #[serde(default)]
    billed: bool,
}

impl TryFrom<ConsumptionRecord> for Consumption {
    type Error = CatalogError;

    fn try_from(record: ConsumptionRecord) -> Result<Self, Self::Error> {
        let mut consumption = Consumption::new(record.duration_hours, record.timestamp)?;
        if record.billed {
            consumption.mark_billed();
        }
        Ok(consumption)
    }
}

/// A client's provisioned occurrence of a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceRecord")]
pub struct Instance {
    /// Identifier, unique within the owning client
    pub id: InstanceId,
    /// Configuration this instance was provisioned from
    pub configuration_id: ConfigurationId,
    /// Display name
    pub name: String,
    /// Provisioning date
    #[serde(with = "dmy")]
    pub start_date: NaiveDate,
    state: InstanceState,
    #[serde(with = "dmy::option")]
    end_date: Option<NaiveDate>,
    consumptions: Vec<Consumption>,
}

#[derive(Deserialize)]
struct InstanceRecord {
    id: InstanceId,
    configuration_id: ConfigurationId,
    name: String,
    #[serde(with = "dmy")]
    start_date: NaiveDate,
    state: InstanceState,
    #[serde(with = "dmy::option", default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    consumptions: Vec<Consumption>,
}

impl TryFrom<InstanceRecord> for Instance {
    type Error = CatalogError;

    fn try_from(record: InstanceRecord) -> Result<Self, Self::Error> {
        let mut instance = Instance::new(record.id, record.configuration_id, record.name, record.start_date)
            .with_state(&record.state.to_string(), record.end_date)?;
        instance.consumptions = record.consumptions;
        Ok(instance)
    }
}

impl Instance {
    /// Creates an active instance with no consumption
    pub fn new(
        id: InstanceId,
        configuration_id: ConfigurationId,
        name: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            configuration_id,
            name: name.into().trim().to_string(),
            start_date,
            state: InstanceState::Active,
            end_date: None,
            consumptions: Vec::new(),
        }
    }

    /// Sets the state from operator text
    ///
    /// # Errors
    ///
    /// - `CatalogError::InvalidInstanceState` for anything but Active/Cancelled
    /// - `CatalogError::Validation` when cancelling without an end date, or
    ///   with an end date before the start date
    pub fn with_state(mut self, state: &str, end_date: Option<NaiveDate>) -> Result<Self, CatalogError> {
        match state.parse::<InstanceState>()? {
            InstanceState::Active => {
                self.state = InstanceState::Active;
                self.end_date = end_date;
            }
            InstanceState::Cancelled => {
                let end_date = end_date.ok_or_else(|| {
                    CatalogError::invalid(format!("instance {} cannot be cancelled without an end date", self.id))
                })?;
                self.cancel(end_date)?;
            }
        }
        Ok(self)
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.state == InstanceState::Active
    }

    /// Cancels the instance as of `end_date`
    pub fn cancel(&mut self, end_date: NaiveDate) -> Result<(), CatalogError> {
        if end_date < self.start_date {
            return Err(CatalogError::invalid(format!(
                "instance {} end date {} precedes start date {}",
                self.id, end_date, self.start_date
            )));
        }
        self.state = InstanceState::Cancelled;
        self.end_date = Some(end_date);
        Ok(())
    }

    /// Consumption events, in recording order
    pub fn consumptions(&self) -> &[Consumption] {
        &self.consumptions
    }

    /// Appends a consumption event
    pub fn record(&mut self, consumption: Consumption) {
        self.consumptions.push(consumption);
    }

    /// Consumption events not yet billed
    pub fn unbilled(&self) -> impl Iterator<Item = &Consumption> + '_ {
        self.consumptions.iter().filter(|c| !c.is_billed())
    }

    /// Total hours of every unbilled event, regardless of timestamp
    pub fn pending_hours(&self) -> Result<Decimal, AmountOverflow> {
        checked_sum(self.unbilled().map(Consumption::duration_hours))
    }

    /// Marks the consumption events at the given positions as billed
    ///
    /// Positions outside the collection are ignored.
    pub fn mark_billed(&mut self, positions: &[usize]) {
        for &position in positions {
            if let Some(consumption) = self.consumptions.get_mut(position) {
                consumption.mark_billed();
            }
        }
    }
}

/// A client of the provisioning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(try_from = "ClientRecord")]
pub struct Client {
    /// Tax identifier, the client's identity
    pub nit: Nit,
    /// Legal or display name
    #[validate(length(min = 1))]
    pub name: String,
    /// Login name on the client portal
    #[validate(length(min = 1))]
    pub username: String,
    /// Postal address
    pub address: String,
    /// Contact email
    #[validate(email)]
    pub email: String,
    instances: Vec<Instance>,
}

#[derive(Deserialize)]
struct ClientRecord {
    nit: Nit,
    name: String,
    username: String,
    #[serde(default)]
    address: String,
    email: String,
    #[serde(default)]
    instances: Vec<Instance>,
}

impl TryFrom<ClientRecord> for Client {
    type Error = CatalogError;

    fn try_from(record: ClientRecord) -> Result<Self, Self::Error> {
        let mut client = Client::new(record.nit, record.name, record.username, record.address, record.email)?;
        for instance in record.instances {
            client.add_instance(instance)?;
        }
        Ok(client)
    }
}

impl Client {
    /// Creates a client with no instances
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name or username is blank or
    /// the email is malformed.
    pub fn new(
        nit: Nit,
        name: impl Into<String>,
        username: impl Into<String>,
        address: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let client = Self {
            nit,
            name: name.into().trim().to_string(),
            username: username.into().trim().to_string(),
            address: address.into().trim().to_string(),
            email: email.into().trim().to_string(),
            instances: Vec::new(),
        };
        client
            .validate()
            .map_err(|errors| CatalogError::invalid(format!("client {}: {}", client.nit, errors)))?;
        Ok(client)
    }

    /// Owned instances, in provisioning order
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Mutable access for billing and consumption recording
    pub fn instances_mut(&mut self) -> &mut [Instance] {
        &mut self.instances
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    /// Adds an instance
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Duplicate` if the id is already used by this client.
    pub fn add_instance(&mut self, instance: Instance) -> Result<(), CatalogError> {
        if self.instance(instance.id).is_some() {
            return Err(CatalogError::duplicate("instance", instance.id));
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Removes and returns every owned instance
    pub fn take_instances(&mut self) -> Vec<Instance> {
        std::mem::take(&mut self.instances)
    }

    /// First instance provisioned from the configuration, if any
    pub fn instance_using(&self, configuration: ConfigurationId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.configuration_id == configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn instance() -> Instance {
        Instance::new(InstanceId::new(1), ConfigurationId::new(10), "web-01", start())
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!("Active".parse::<InstanceState>().unwrap(), InstanceState::Active);
        assert_eq!("Vigente".parse::<InstanceState>().unwrap(), InstanceState::Active);
        assert_eq!("Cancelada".parse::<InstanceState>().unwrap(), InstanceState::Cancelled);
        assert!(matches!(
            "Suspended".parse::<InstanceState>(),
            Err(CatalogError::InvalidInstanceState(s)) if s == "Suspended"
        ));
    }

    #[test]
    fn test_cancel_requires_end_date() {
        let result = instance().with_state("Cancelled", None);
        assert!(matches!(result, Err(CatalogError::Validation(_))));

        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let cancelled = instance().with_state("Cancelled", Some(end)).unwrap();
        assert_eq!(cancelled.state(), InstanceState::Cancelled);
        assert_eq!(cancelled.end_date(), Some(end));
    }

    #[test]
    fn test_cancel_before_start_rejected() {
        let mut inst = instance();
        let before = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert!(inst.cancel(before).is_err());
        assert!(inst.is_active());
    }

    #[test]
    fn test_invalid_state_rejected_at_construction() {
        let result = instance().with_state("Paused", None);
        assert!(matches!(result, Err(CatalogError::InvalidInstanceState(_))));
    }

    #[test]
    fn test_mark_billed_is_positional() {
        let mut inst = instance();
        inst.record(Consumption::new(dec!(2), "05/01/2024 10:00").unwrap());
        inst.record(Consumption::new(dec!(3), "06/01/2024 10:00").unwrap());
        inst.record(Consumption::new(dec!(1), "07/01/2024 10:00").unwrap());

        inst.mark_billed(&[0, 2, 99]);

        let flags: Vec<_> = inst.consumptions().iter().map(Consumption::is_billed).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(inst.pending_hours(), Ok(dec!(3)));
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(Consumption::new(dec!(-1), "05/01/2024 10:00").is_err());
    }

    #[test]
    fn test_client_validation() {
        let nit = Nit::parse("12345-6").unwrap();
        assert!(Client::new(nit.clone(), "Acme", "acme", "Zone 1", "ops@acme.test").is_ok());
        assert!(Client::new(nit.clone(), "", "acme", "Zone 1", "ops@acme.test").is_err());
        assert!(Client::new(nit, "Acme", "acme", "Zone 1", "not-an-email").is_err());
    }

    #[test]
    fn test_client_rejects_duplicate_instance() {
        let mut client = Client::new(Nit::parse("12345-6").unwrap(), "Acme", "acme", "", "ops@acme.test").unwrap();
        client.add_instance(instance()).unwrap();
        assert!(client.add_instance(instance()).is_err());
        assert!(client.instance_using(ConfigurationId::new(10)).is_some());
    }

    #[test]
    fn test_instance_deserialization_checks_state() {
        let cancelled: Instance = serde_json::from_str(
            r#"{"id":1,"configuration_id":10,"name":"web-01","start_date":"01/01/2024",
                "state":"Cancelada","end_date":"01/03/2024",
                "consumptions":[{"duration_hours":"2","timestamp":"05/01/2024 10:00","billed":true}]}"#,
        )
        .unwrap();
        assert_eq!(cancelled.state(), InstanceState::Cancelled);
        assert!(cancelled.consumptions()[0].is_billed());

        let missing_end = serde_json::from_str::<Instance>(
            r#"{"id":1,"configuration_id":10,"name":"web-01","start_date":"01/01/2024","state":"Cancelled"}"#,
        );
        assert!(missing_end.unwrap_err().to_string().contains("without an end date"));

        let negative = serde_json::from_str::<Consumption>(r#"{"duration_hours":"-4","timestamp":"05/01/2024 10:00"}"#);
        assert!(negative.is_err());
    }

    #[test]
    fn test_state_deserialization_rejects_unknown_values() {
        let ok: InstanceState = serde_json::from_str("\"Cancelada\"").unwrap();
        assert_eq!(ok, InstanceState::Cancelled);

        let bad: Result<InstanceState, _> = serde_json::from_str("\"Suspended\"");
        assert!(bad.is_err());
    }
}
