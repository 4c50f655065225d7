//! Price envelope check run before a card is charged.
//!
//! This is a bound check, not a re-computation: it rejects totals no client
//! could have produced, while tolerating surcharge combinations it does not
//! re-derive. A client total inside the ×4 (per-foot) or ×5 (flat) envelope,
//! plus the declared anode labor, is accepted even if it disagrees with the
//! canonical surcharge tables. That gap is accepted risk.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::entities::RateType;
use super::rates::{RateTable, ANODE_INSTALLATION_RATE};

pub const MIN_BOAT_LENGTH_FEET: f64 = 10.0;
pub const MAX_BOAT_LENGTH_FEET: f64 = 300.0;
pub const FLAT_CEILING_MULTIPLIER: f64 = 5.0;
pub const PER_FOOT_CEILING_MULTIPLIER: f64 = 4.0;
/// Half a cent of slack for float sums that land exactly on a bound.
const BOUND_TOLERANCE: f64 = 0.005;

/// Message shown to callers for every rejection; the envelope is never revealed.
pub const GENERIC_REJECTION: &str = "invalid price calculation";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheckDetails {
    #[serde(default, alias = "boatLength")]
    pub boat_length_feet: Option<f64>,
    #[serde(default, alias = "anodes")]
    pub anodes_to_install: u32,
}

impl PriceCheckDetails {
    pub fn with_length(feet: f64) -> Self {
        Self {
            boat_length_feet: Some(feet),
            ..Self::default()
        }
    }

    pub fn with_anodes(mut self, count: u32) -> Self {
        self.anodes_to_install = count;
        self
    }
}

/// Why a claimed total was rejected. For logs only.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceRejection {
    #[error("unknown service `{0}`")]
    UnknownService(String),
    #[error("claimed total is not a finite number")]
    NotFinite,
    #[error("boat length {0:?} outside accepted range")]
    BoatLength(Option<f64>),
    #[error("claimed total {claimed} outside [{low}, {high}]")]
    OutOfRange { claimed: f64, low: f64, high: f64 },
}

#[derive(Clone, Debug)]
pub struct PriceValidator<'a> {
    rates: &'a RateTable,
    minimum_charge: f64,
    anode_rate: f64,
}

impl<'a> PriceValidator<'a> {
    pub fn new(rates: &'a RateTable, minimum_charge: f64) -> Self {
        Self {
            rates,
            minimum_charge,
            anode_rate: ANODE_INSTALLATION_RATE,
        }
    }

    /// Per-anode labor allowed on top of the service envelope.
    pub fn with_anode_rate(mut self, anode_rate: f64) -> Self {
        if anode_rate.is_finite() && anode_rate >= 0.0 {
            self.anode_rate = anode_rate;
        }
        self
    }

    pub fn validate(&self, service: &str, claimed_total: f64, details: &PriceCheckDetails) -> bool {
        match self.check(service, claimed_total, details) {
            Ok(()) => true,
            Err(reason) => {
                warn!(service, %reason, "rejected client price");
                false
            }
        }
    }

    /// Accepts the service id or its display name, as older clients send the latter.
    pub fn check(
        &self,
        service: &str,
        claimed_total: f64,
        details: &PriceCheckDetails,
    ) -> Result<(), PriceRejection> {
        let definition = self
            .rates
            .find(service)
            .ok_or_else(|| PriceRejection::UnknownService(service.to_string()))?;

        if !claimed_total.is_finite() {
            return Err(PriceRejection::NotFinite);
        }

        let anode_labor = f64::from(details.anodes_to_install) * self.anode_rate;
        let (low, high) = match definition.rate_type {
            RateType::Flat => (
                definition.base_rate,
                definition.base_rate * FLAT_CEILING_MULTIPLIER + anode_labor,
            ),
            RateType::PerFoot => {
                let feet = details
                    .boat_length_feet
                    .filter(|feet| (MIN_BOAT_LENGTH_FEET..=MAX_BOAT_LENGTH_FEET).contains(feet))
                    .ok_or(PriceRejection::BoatLength(details.boat_length_feet))?;
                let base = (feet * definition.base_rate).max(self.minimum_charge);
                (
                    self.minimum_charge,
                    base * PER_FOOT_CEILING_MULTIPLIER + anode_labor,
                )
            }
        };

        if claimed_total < low - BOUND_TOLERANCE || claimed_total > high + BOUND_TOLERANCE {
            return Err(PriceRejection::OutOfRange {
                claimed: claimed_total,
                low,
                high,
            });
        }

        Ok(())
    }
}
