//! Numbered, dated quotes issued from an estimate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{macros::format_description, Duration, OffsetDateTime};

use super::entities::{EstimateRequest, EstimateResult, FoulingLevel, PaintCondition, RateType};

pub const DEFAULT_VALID_DAYS: u16 = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Viewed => "Viewed",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Expired => "Expired",
        }
    }

    fn is_open(&self) -> bool {
        matches!(self, Self::Sent | Self::Viewed)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum QuoteError {
    #[error("quote {number} is {status:?} and cannot move to {target:?}")]
    InvalidTransition {
        number: String,
        status: QuoteStatus,
        target: QuoteStatus,
    },
    #[error("quote {0} has expired")]
    Expired(String),
    #[error("cannot quote an empty estimate")]
    EmptyEstimate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub boat_name: String,
    #[serde(default)]
    pub boat_make: String,
    #[serde(default)]
    pub marina: String,
    #[serde(default)]
    pub slip: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotePricing {
    pub base_amount: f64,
    pub rate_per_foot: Option<f64>,
    pub surcharge_total: f64,
    pub anode_count: u32,
    pub anode_labor: f64,
    pub total: f64,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub number: String,
    /// Unix seconds.
    pub issued_at: i64,
    pub expires_at: i64,
    pub valid_days: u16,
    pub customer: QuoteCustomer,
    pub service_id: String,
    pub service_name: String,
    pub boat_length_feet: Option<f64>,
    pub paint: Option<PaintCondition>,
    pub fouling: Option<FoulingLevel>,
    pub twin_engines: bool,
    pub additional_hulls: u8,
    pub pricing: QuotePricing,
    pub status: QuoteStatus,
    #[serde(default)]
    pub viewed_at: Option<i64>,
    #[serde(default)]
    pub decided_at: Option<i64>,
}

impl Quote {
    pub fn issue(
        request: &EstimateRequest,
        result: &EstimateResult,
        customer: QuoteCustomer,
        valid_days: u16,
        now: OffsetDateTime,
        random: u16,
    ) -> Result<Self, QuoteError> {
        if result.is_empty() {
            return Err(QuoteError::EmptyEstimate);
        }

        let expires = now + Duration::days(i64::from(valid_days));
        Ok(Self {
            number: quote_number(now, random),
            issued_at: now.unix_timestamp(),
            expires_at: expires.unix_timestamp(),
            valid_days,
            customer,
            service_id: result.service_id.clone(),
            service_name: result.service_name.clone(),
            boat_length_feet: result.boat_length_feet,
            paint: result.paint,
            fouling: result.fouling,
            twin_engines: request.twin_engines,
            additional_hulls: request.hull_type.additional_hulls(),
            pricing: QuotePricing {
                base_amount: result.base_amount,
                rate_per_foot: (result.rate_type == RateType::PerFoot).then_some(result.base_rate),
                surcharge_total: result.surcharge_total(),
                anode_count: result.anode_count,
                anode_labor: result.anode_installation_amount,
                total: result.final_amount,
                currency: "USD".to_string(),
            },
            status: QuoteStatus::Sent,
            viewed_at: None,
            decided_at: None,
        })
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() > self.expires_at
    }

    /// Status as seen at `now`; open quotes past their expiry read as expired.
    pub fn effective_status(&self, now: OffsetDateTime) -> QuoteStatus {
        if self.status.is_open() && self.is_expired(now) {
            QuoteStatus::Expired
        } else {
            self.status
        }
    }

    pub fn mark(&mut self, target: QuoteStatus, now: OffsetDateTime) -> Result<(), QuoteError> {
        if self.effective_status(now) == QuoteStatus::Expired {
            return Err(QuoteError::Expired(self.number.clone()));
        }

        let allowed = match (self.status, target) {
            (QuoteStatus::Sent, QuoteStatus::Viewed) => true,
            (QuoteStatus::Sent | QuoteStatus::Viewed, QuoteStatus::Accepted)
            | (QuoteStatus::Sent | QuoteStatus::Viewed, QuoteStatus::Rejected) => true,
            _ => false,
        };
        if !allowed {
            return Err(QuoteError::InvalidTransition {
                number: self.number.clone(),
                status: self.status,
                target,
            });
        }

        match target {
            QuoteStatus::Viewed => self.viewed_at = Some(now.unix_timestamp()),
            _ => self.decided_at = Some(now.unix_timestamp()),
        }
        self.status = target;
        Ok(())
    }

    pub fn issued_label(&self) -> String {
        date_label(self.issued_at)
    }

    pub fn expires_label(&self) -> String {
        date_label(self.expires_at)
    }
}

/// `QT-YYYYMMDD-NNNN`.
pub fn quote_number(now: OffsetDateTime, random: u16) -> String {
    format!(
        "QT-{:04}{:02}{:02}-{:04}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        random % 10_000
    )
}

fn date_label(unix_seconds: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::from_unix_timestamp(unix_seconds)
        .ok()
        .and_then(|moment| moment.format(&format).ok())
        .unwrap_or_else(|| "unknown".to_string())
}
