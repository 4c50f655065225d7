//! Service catalogue and the business-wide pricing constants.

use std::{collections::HashSet, sync::OnceLock};

use thiserror::Error;

use super::entities::{RateType, ServiceDefinition, ServiceFamily};

pub const DEFAULT_MINIMUM_CHARGE: f64 = 150.0;
pub const ANODE_INSTALLATION_RATE: f64 = 15.0;

#[derive(Debug, Error, PartialEq)]
pub enum RateTableError {
    #[error("rate table has no services")]
    Empty,
    #[error("service id must not be empty")]
    MissingId,
    #[error("duplicate service id: {0}")]
    DuplicateId(String),
    #[error("service {id} has invalid base rate {rate}")]
    InvalidRate { id: String, rate: f64 },
}

/// Immutable service lookup, kept in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    services: Vec<ServiceDefinition>,
}

impl RateTable {
    pub fn new(services: Vec<ServiceDefinition>) -> Result<Self, RateTableError> {
        if services.is_empty() {
            return Err(RateTableError::Empty);
        }

        let mut seen = HashSet::new();
        for service in &services {
            if service.id.trim().is_empty() {
                return Err(RateTableError::MissingId);
            }
            if !seen.insert(service.id.as_str()) {
                return Err(RateTableError::DuplicateId(service.id.clone()));
            }
            if !service.base_rate.is_finite() || service.base_rate <= 0.0 {
                return Err(RateTableError::InvalidRate {
                    id: service.id.clone(),
                    rate: service.base_rate,
                });
            }
        }

        Ok(Self { services })
    }

    /// Built-in table, created on first use.
    pub fn builtin() -> &'static RateTable {
        static TABLE: OnceLock<RateTable> = OnceLock::new();
        TABLE.get_or_init(|| RateTable {
            services: default_services(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|service| service.id == id)
    }

    /// Looks a service up by id, falling back to its display name.
    pub fn find(&self, key: &str) -> Option<&ServiceDefinition> {
        self.get(key).or_else(|| {
            self.services
                .iter()
                .find(|service| service.name.eq_ignore_ascii_case(key))
        })
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn service(
    id: &str,
    name: &str,
    rate_type: RateType,
    base_rate: f64,
    family: ServiceFamily,
    description: &str,
) -> ServiceDefinition {
    ServiceDefinition {
        id: id.to_string(),
        name: name.to_string(),
        rate_type,
        base_rate,
        family,
        fouling_exempt: false,
        description: description.to_string(),
    }
}

fn default_services() -> Vec<ServiceDefinition> {
    vec![
        service(
            "recurring_cleaning",
            "Recurring Cleaning & Anodes",
            RateType::PerFoot,
            4.50,
            ServiceFamily::Cleaning,
            "Regular hull cleaning with zinc anode inspection at 1, 2, 3, or 6-month intervals.",
        ),
        service(
            "onetime_cleaning",
            "One-time Cleaning & Anodes",
            RateType::PerFoot,
            6.00,
            ServiceFamily::Cleaning,
            "Complete hull cleaning and zinc anode inspection. Good before a haul-out or survey.",
        ),
        service(
            "anodes_only",
            "Anodes Only",
            RateType::Flat,
            150.0,
            ServiceFamily::Anodes,
            "Zinc anode inspection and replacement without hull cleaning.",
        ),
        service(
            "underwater_inspection",
            "Underwater Inspection",
            RateType::PerFoot,
            4.00,
            ServiceFamily::Inspection,
            "Underwater inspection with photo and video documentation.",
        ),
        service(
            "item_recovery",
            "Item Recovery",
            RateType::Flat,
            199.0,
            ServiceFamily::Recovery,
            "Recovery of dropped items such as phones, keys, tools, or dinghies. Up to 45 minutes of search time.",
        ),
        service(
            "propeller_service",
            "Propeller Removal/Installation",
            RateType::Flat,
            349.0,
            ServiceFamily::Propeller,
            "Propeller removal or installation, per propeller.",
        ),
    ]
}
