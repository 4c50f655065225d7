use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entities::{
    BoatType, CleaningAge, ConditionInput, EstimateRequest, EstimateResult, EstimateVariant,
    FoulingLevel, HullType, PaintAge, PaintCondition, ServiceId, ServiceInterval,
};
use super::estimator::{estimate, EstimateError};
use super::quote::{Quote, QuoteCustomer, DEFAULT_VALID_DAYS};
use super::rates::{RateTable, ANODE_INSTALLATION_RATE, DEFAULT_MINIMUM_CHARGE};
use super::surcharges::SurchargeRules;

/// Which side of the counter is using the app.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    #[default]
    Customer,
    Admin,
}

impl Audience {
    pub fn name(&self) -> &'static str {
        match self {
            Audience::Customer => "Customer",
            Audience::Admin => "Admin",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Audience::Customer => "⛵",
            Audience::Admin => "🤿",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    Off,
    NearestFive,
    #[default]
    NearestTen,
}

impl RoundingRule {
    pub const ALL: [RoundingRule; 3] = [Self::Off, Self::NearestFive, Self::NearestTen];

    pub fn step(&self) -> f64 {
        match self {
            Self::Off => 0.0,
            Self::NearestFive => 5.0,
            Self::NearestTen => 10.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "No rounding",
            Self::NearestFive => "Nearest $5",
            Self::NearestTen => "Nearest $10",
        }
    }
}

/// Business knobs editable from the settings page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub minimum_charge: f64,
    pub anode_rate: f64,
    pub rounding: RoundingRule,
    /// Payment-intent endpoint; checkout is disabled while unset.
    pub checkout_endpoint: Option<String>,
    pub quote_valid_days: u16,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            minimum_charge: DEFAULT_MINIMUM_CHARGE,
            anode_rate: ANODE_INSTALLATION_RATE,
            rounding: RoundingRule::default(),
            checkout_endpoint: None,
            quote_valid_days: DEFAULT_VALID_DAYS,
        }
    }
}

impl PricingSettings {
    pub fn rules(&self) -> SurchargeRules {
        SurchargeRules {
            anode_rate: self.anode_rate,
            rounding_step: self.rounding.step(),
            ..SurchargeRules::builtin().clone()
        }
    }

    pub fn checkout_enabled(&self) -> bool {
        self.checkout_endpoint
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Raw inputs of the customer calculator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDraft {
    pub service_id: ServiceId,
    pub length_input: String,
    pub boat_type: BoatType,
    pub hull_type: HullType,
    pub twin_engines: bool,
    pub paint_age: PaintAge,
    pub cleaning_age: CleaningAge,
    pub anodes: u32,
    pub customer: QuoteCustomer,
}

impl CustomerDraft {
    pub fn request(&self, settings: &PricingSettings) -> Result<EstimateRequest, EstimateError> {
        let mut request = EstimateRequest::new(self.service_id.clone(), settings.minimum_charge)
            .with_boat(self.boat_type, self.hull_type, self.twin_engines)
            .with_conditions(ConditionInput::Estimated {
                paint_age: self.paint_age,
                cleaning_age: self.cleaning_age,
            })
            .with_anodes(self.anodes);
        request.boat_length_feet = parse_length(&self.length_input)?;
        Ok(request)
    }
}

/// Growth input on the admin screen: level buttons or the slider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthInput {
    Level(FoulingLevel),
    Slider(u8),
}

impl Default for GrowthInput {
    fn default() -> Self {
        Self::Level(FoulingLevel::Minimal)
    }
}

/// Raw inputs of the admin charge screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminDraft {
    pub service_id: ServiceId,
    pub length_input: String,
    pub boat_type: BoatType,
    pub hull_type: HullType,
    pub twin_engines: bool,
    pub paint: PaintCondition,
    pub growth: GrowthInput,
    pub anodes: u32,
    pub interval: ServiceInterval,
    pub customer: QuoteCustomer,
}

impl AdminDraft {
    pub fn request(&self, settings: &PricingSettings) -> Result<EstimateRequest, EstimateError> {
        let conditions = match self.growth {
            GrowthInput::Level(fouling) => ConditionInput::Observed {
                paint: self.paint,
                fouling,
            },
            GrowthInput::Slider(position) => ConditionInput::GrowthSlider {
                paint: self.paint,
                position,
            },
        };
        let mut request = EstimateRequest::new(self.service_id.clone(), settings.minimum_charge)
            .with_boat(self.boat_type, self.hull_type, self.twin_engines)
            .with_conditions(conditions)
            .with_anodes(self.anodes)
            .with_variant(EstimateVariant::Exact);
        request.boat_length_feet = parse_length(&self.length_input)?;
        Ok(request)
    }
}

/// Empty input means "not entered yet"; anything else must be a number.
pub fn parse_length(input: &str) -> Result<Option<f64>, EstimateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| EstimateError::InvalidInput {
            field: "boat_length_feet",
            message: format!("`{trimmed}` is not a boat length in feet"),
        })
}

/// Per-session state; one instance per window.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub audience: Audience,
    pub customer: CustomerDraft,
    pub admin: AdminDraft,
    pub settings: PricingSettings,
    pub rates: Arc<RateTable>,
    /// Quotes issued this session and loaded from the quote log.
    pub quotes: Vec<Quote>,
}

impl AppState {
    pub fn with_rates(rates: RateTable) -> Self {
        Self {
            rates: Arc::new(rates),
            ..Self::default()
        }
    }

    pub fn rules(&self) -> SurchargeRules {
        self.settings.rules()
    }

    pub fn customer_estimate(&self) -> Result<(EstimateRequest, EstimateResult), EstimateError> {
        let request = self.customer.request(&self.settings)?;
        let result = estimate(&request, &self.rates, &self.rules())?;
        Ok((request, result))
    }

    pub fn admin_estimate(&self) -> Result<(EstimateRequest, EstimateResult), EstimateError> {
        let request = self.admin.request(&self.settings)?;
        let result = estimate(&request, &self.rates, &self.rules())?;
        Ok((request, result))
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.audience = persisted.audience;
        self.settings = persisted.settings;
        self.customer = persisted.customer;
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            audience: self.audience,
            settings: self.settings.clone(),
            customer: self.customer.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub settings: PricingSettings,
    #[serde(default)]
    pub customer: CustomerDraft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_draft_builds_estimated_request() {
        let draft = CustomerDraft {
            service_id: "recurring_cleaning".to_string(),
            length_input: " 40 ".to_string(),
            paint_age: PaintAge::SevenToTwelveMonths,
            ..CustomerDraft::default()
        };
        let request = draft.request(&PricingSettings::default()).unwrap();
        assert_eq!(request.boat_length_feet, Some(40.0));
        assert_eq!(request.variant, EstimateVariant::ClientQuote);
        assert_eq!(request.minimum_charge, 150.0);
    }

    #[test]
    fn bad_length_is_a_field_error() {
        let draft = CustomerDraft {
            length_input: "forty".to_string(),
            ..CustomerDraft::default()
        };
        assert!(matches!(
            draft.request(&PricingSettings::default()),
            Err(EstimateError::InvalidInput {
                field: "boat_length_feet",
                ..
            })
        ));
        assert_eq!(parse_length("").unwrap(), None);
    }

    #[test]
    fn admin_draft_is_exact_and_observed() {
        let draft = AdminDraft {
            service_id: "onetime_cleaning".to_string(),
            length_input: "35".to_string(),
            paint: PaintCondition::Fair,
            growth: GrowthInput::Slider(60),
            ..AdminDraft::default()
        };
        let state = AppState {
            admin: draft,
            ..AppState::default()
        };
        let (request, result) = state.admin_estimate().unwrap();
        assert_eq!(request.variant, EstimateVariant::Exact);
        // 210 base, 7.5% paint, 50% growth
        assert!((result.final_amount - 330.75).abs() < 1e-9);
    }

    #[test]
    fn settings_feed_the_rules() {
        let settings = PricingSettings {
            anode_rate: 20.0,
            rounding: RoundingRule::Off,
            ..PricingSettings::default()
        };
        let rules = settings.rules();
        assert_eq!(rules.anode_rate, 20.0);
        assert_eq!(rules.rounding_step, 0.0);
        assert_eq!(rules.powerboat, SurchargeRules::builtin().powerboat);
        assert!(!settings.checkout_enabled());
    }

    #[test]
    fn persisted_state_tolerates_missing_fields() {
        let persisted: PersistedState = serde_json::from_str(r#"{"audience":"Admin"}"#).unwrap();
        assert_eq!(persisted.audience, Audience::Admin);
        assert_eq!(persisted.settings, PricingSettings::default());

        let mut state = AppState::default();
        state.apply_persisted(persisted.clone());
        assert_eq!(state.to_persisted(), persisted);
    }
}
