use serde::{Deserialize, Serialize};

/// Identifier for services in the rate table (e.g. `recurring_cleaning`).
pub type ServiceId = String;

/// How a service's base rate is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Flat,
    PerFoot,
}

impl RateType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat => "flat rate",
            Self::PerFoot => "per foot",
        }
    }
}

/// Service family; gates which surcharges apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFamily {
    Cleaning,
    Inspection,
    Recovery,
    Propeller,
    Anodes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    pub name: String,
    pub rate_type: RateType,
    pub base_rate: f64,
    pub family: ServiceFamily,
    /// Fouling surcharge never applies (e.g. haul-out prep).
    #[serde(default)]
    pub fouling_exempt: bool,
    #[serde(default)]
    pub description: String,
}

impl ServiceDefinition {
    pub fn is_per_foot(&self) -> bool {
        self.rate_type == RateType::PerFoot
    }

    pub fn is_cleaning(&self) -> bool {
        self.family == ServiceFamily::Cleaning
    }

    pub fn price_label(&self) -> String {
        match self.rate_type {
            RateType::PerFoot => format!("${:.2} per foot", self.base_rate),
            RateType::Flat => format!("${:.0} flat rate", self.base_rate),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoatType {
    #[default]
    Sailboat,
    Powerboat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HullType {
    #[default]
    Monohull,
    Catamaran,
    Trimaran,
}

impl HullType {
    /// Hulls beyond the first.
    pub fn additional_hulls(&self) -> u8 {
        match self {
            Self::Monohull => 0,
            Self::Catamaran => 1,
            Self::Trimaran => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintCondition {
    #[default]
    Excellent,
    Good,
    Fair,
    Poor,
    Missing,
}

impl PaintCondition {
    pub const ALL: [PaintCondition; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Poor,
        Self::Missing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Missing => "Missing",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulingLevel {
    #[default]
    Minimal,
    Moderate,
    Heavy,
    Severe,
}

impl FoulingLevel {
    pub const ALL: [FoulingLevel; 4] = [Self::Minimal, Self::Moderate, Self::Heavy, Self::Severe];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Moderate => "Moderate",
            Self::Heavy => "Heavy",
            Self::Severe => "Severe",
        }
    }
}

/// Months since the bottom was last painted, as offered by the calculator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaintAge {
    #[default]
    #[serde(rename = "0-6_months")]
    UpToSixMonths,
    #[serde(rename = "7-12_months")]
    SevenToTwelveMonths,
    #[serde(rename = "13-21_months")]
    ThirteenToTwentyOneMonths,
    #[serde(rename = "22-24_months")]
    TwentyTwoToTwentyFourMonths,
    #[serde(rename = "over_24_months")]
    OverTwentyFourMonths,
    #[serde(rename = "unsure_paint")]
    Unsure,
}

impl PaintAge {
    pub const ALL: [PaintAge; 6] = [
        Self::UpToSixMonths,
        Self::SevenToTwelveMonths,
        Self::ThirteenToTwentyOneMonths,
        Self::TwentyTwoToTwentyFourMonths,
        Self::OverTwentyFourMonths,
        Self::Unsure,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::UpToSixMonths => "0-6_months",
            Self::SevenToTwelveMonths => "7-12_months",
            Self::ThirteenToTwentyOneMonths => "13-21_months",
            Self::TwentyTwoToTwentyFourMonths => "22-24_months",
            Self::OverTwentyFourMonths => "over_24_months",
            Self::Unsure => "unsure_paint",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpToSixMonths => "0-6 months",
            Self::SevenToTwelveMonths => "7-12 months",
            Self::ThirteenToTwentyOneMonths => "13-21 months",
            Self::TwentyTwoToTwentyFourMonths => "22-24 months",
            Self::OverTwentyFourMonths => "Over 24 months",
            Self::Unsure => "Not sure",
        }
    }
}

/// Months since the hull was last cleaned. Ordinal order is the fouling grid's column order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CleaningAge {
    #[default]
    #[serde(rename = "0-2_months")]
    UpToTwoMonths,
    #[serde(rename = "3-4_months")]
    ThreeToFourMonths,
    #[serde(rename = "5-6_months")]
    FiveToSixMonths,
    #[serde(rename = "7-8_months")]
    SevenToEightMonths,
    #[serde(rename = "9-12_months")]
    NineToTwelveMonths,
    #[serde(rename = "13-24_months")]
    ThirteenToTwentyFourMonths,
    #[serde(rename = "over_24_months_unsure")]
    OverTwentyFourOrUnsure,
}

impl CleaningAge {
    pub const ALL: [CleaningAge; 7] = [
        Self::UpToTwoMonths,
        Self::ThreeToFourMonths,
        Self::FiveToSixMonths,
        Self::SevenToEightMonths,
        Self::NineToTwelveMonths,
        Self::ThirteenToTwentyFourMonths,
        Self::OverTwentyFourOrUnsure,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::UpToTwoMonths => "0-2_months",
            Self::ThreeToFourMonths => "3-4_months",
            Self::FiveToSixMonths => "5-6_months",
            Self::SevenToEightMonths => "7-8_months",
            Self::NineToTwelveMonths => "9-12_months",
            Self::ThirteenToTwentyFourMonths => "13-24_months",
            Self::OverTwentyFourOrUnsure => "over_24_months_unsure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpToTwoMonths => "0-2 months",
            Self::ThreeToFourMonths => "3-4 months",
            Self::FiveToSixMonths => "5-6 months",
            Self::SevenToEightMonths => "7-8 months",
            Self::NineToTwelveMonths => "9-12 months",
            Self::ThirteenToTwentyFourMonths => "13-24 months",
            Self::OverTwentyFourOrUnsure => "Over 24 months / not sure",
        }
    }
}

/// Hull condition inputs, in the shape each screen collects them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConditionInput {
    /// Customer calculator: conditions derived from elapsed time.
    Estimated {
        paint_age: PaintAge,
        cleaning_age: CleaningAge,
    },
    /// Diver-observed conditions picked from buttons.
    Observed {
        paint: PaintCondition,
        fouling: FoulingLevel,
    },
    /// Admin growth slider (0-100) with an observed paint condition.
    GrowthSlider { paint: PaintCondition, position: u8 },
}

impl Default for ConditionInput {
    fn default() -> Self {
        Self::Estimated {
            paint_age: PaintAge::default(),
            cleaning_age: CleaningAge::default(),
        }
    }
}

/// Whether the result is shown to a customer (rounded) or used as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateVariant {
    #[default]
    ClientQuote,
    Exact,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub service_id: ServiceId,
    pub boat_length_feet: Option<f64>,
    pub boat_type: BoatType,
    pub hull_type: HullType,
    pub twin_engines: bool,
    pub conditions: ConditionInput,
    pub anodes_to_install: u32,
    pub minimum_charge: f64,
    pub variant: EstimateVariant,
}

impl EstimateRequest {
    pub fn new(service_id: impl Into<ServiceId>, minimum_charge: f64) -> Self {
        Self {
            service_id: service_id.into(),
            boat_length_feet: None,
            boat_type: BoatType::default(),
            hull_type: HullType::default(),
            twin_engines: false,
            conditions: ConditionInput::default(),
            anodes_to_install: 0,
            minimum_charge,
            variant: EstimateVariant::default(),
        }
    }

    pub fn with_length(mut self, feet: f64) -> Self {
        self.boat_length_feet = Some(feet);
        self
    }

    pub fn with_boat(mut self, boat_type: BoatType, hull_type: HullType, twin_engines: bool) -> Self {
        self.boat_type = boat_type;
        self.hull_type = hull_type;
        self.twin_engines = twin_engines;
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionInput) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_anodes(mut self, count: u32) -> Self {
        self.anodes_to_install = count;
        self
    }

    pub fn with_variant(mut self, variant: EstimateVariant) -> Self {
        self.variant = variant;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    BoatType,
    HullType,
    TwinEngines,
    Paint,
    Fouling,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurchargeLineItem {
    pub kind: SurchargeKind,
    pub label: String,
    /// Fraction of the post-floor base (0.25 = 25%).
    pub percent: f64,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "note", rename_all = "snake_case")]
pub enum EstimateNote {
    BaseFloored { raw: f64, floored: f64 },
    FoulingNotApplicable,
    MinimumApplied { minimum: f64 },
    NothingSelected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub service_id: ServiceId,
    pub service_name: String,
    pub rate_type: RateType,
    pub base_rate: f64,
    pub boat_length_feet: Option<f64>,
    pub variant: EstimateVariant,
    pub raw_base_amount: f64,
    pub base_amount: f64,
    pub surcharges: Vec<SurchargeLineItem>,
    pub subtotal: f64,
    pub anode_count: u32,
    pub anode_installation_amount: f64,
    pub total_before_minimum: f64,
    pub minimum_applied: bool,
    pub final_amount: f64,
    /// Client rounding changed the amount.
    pub rounded: bool,
    pub paint: Option<PaintCondition>,
    pub fouling: Option<FoulingLevel>,
    pub notes: Vec<EstimateNote>,
}

impl EstimateResult {
    pub fn surcharge_total(&self) -> f64 {
        self.surcharges.iter().map(|item| item.amount).sum()
    }

    pub fn surcharge(&self, kind: SurchargeKind) -> Option<&SurchargeLineItem> {
        self.surcharges.iter().find(|item| item.kind == kind)
    }

    pub fn has_note(&self, predicate: impl Fn(&EstimateNote) -> bool) -> bool {
        self.notes.iter().any(predicate)
    }

    pub fn is_empty(&self) -> bool {
        self.has_note(|note| matches!(note, EstimateNote::NothingSelected))
    }
}

/// Billing cadence chosen at checkout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceInterval {
    #[default]
    #[serde(rename = "one-time")]
    OneTime,
    #[serde(rename = "1")]
    Monthly,
    #[serde(rename = "2")]
    EveryTwoMonths,
    #[serde(rename = "3")]
    Quarterly,
    #[serde(rename = "6")]
    TwiceYearly,
}

impl ServiceInterval {
    pub const ALL: [ServiceInterval; 5] = [
        Self::OneTime,
        Self::Monthly,
        Self::EveryTwoMonths,
        Self::Quarterly,
        Self::TwiceYearly,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Monthly => "1",
            Self::EveryTwoMonths => "2",
            Self::Quarterly => "3",
            Self::TwiceYearly => "6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneTime => "One-time",
            Self::Monthly => "Monthly",
            Self::EveryTwoMonths => "Every 2 months",
            Self::Quarterly => "Quarterly",
            Self::TwiceYearly => "Every 6 months",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::OneTime)
    }
}
