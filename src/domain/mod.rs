//! Pricing domain: rate table, surcharge rules, estimator and the checks around it.

pub mod app_state;
pub mod breakdown;
pub mod entities;
pub mod estimator;
pub mod quote;
pub mod rates;
pub mod surcharges;
pub mod validator;

pub use app_state::{
    AdminDraft, AppState, Audience, CustomerDraft, GrowthInput, PersistedState, PricingSettings,
    RoundingRule,
};
pub use breakdown::{breakdown_lines, format_percent, format_usd, render_text, BreakdownLine, LineKind};
pub use entities::{
    BoatType, CleaningAge, ConditionInput, EstimateNote, EstimateRequest, EstimateResult,
    EstimateVariant, FoulingLevel, HullType, PaintAge, PaintCondition, RateType, ServiceDefinition,
    ServiceFamily, ServiceId, ServiceInterval, SurchargeKind, SurchargeLineItem,
};
pub use estimator::{estimate, round_to_step, EstimateError};
pub use quote::{Quote, QuoteCustomer, QuoteError, QuoteStatus};
pub use rates::{RateTable, RateTableError};
pub use surcharges::{growth_slider, parse_lenient, SurchargeRules};
pub use validator::{PriceCheckDetails, PriceRejection, PriceValidator, GENERIC_REJECTION};
