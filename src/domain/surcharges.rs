//! Surcharge tables and hull-condition derivation.
//!
//! Two input styles feed the same tables:
//! - *estimated* conditions come from elapsed-time buckets chosen by the customer,
//!   and use the fine paint table plus the paint × cleaning-age fouling grid;
//! - *observed* conditions are picked by the diver and use the coarse 5-band paint
//!   table plus the simplified fouling table.

use std::{fmt::Debug, sync::OnceLock};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use super::entities::{
    BoatType, CleaningAge, ConditionInput, FoulingLevel, HullType, PaintAge, PaintCondition,
};
use super::rates::ANODE_INSTALLATION_RATE;

/// Percentages are fractions of the post-floor base (0.25 = 25%).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRules {
    pub powerboat: f64,
    pub catamaran: f64,
    pub trimaran: f64,
    pub twin_engines: f64,
    /// Poor paint 22-24 months old.
    pub paint_poor_low: f64,
    /// Poor paint older than 24 months, or unknown age.
    pub paint_poor_high: f64,
    /// Excellent, good, fair, poor, missing.
    pub observed_paint: [f64; 5],
    /// Rows: excellent, good, fair, poor. Columns follow `CleaningAge`.
    pub fouling_grid: [[f64; 7]; 4],
    /// Minimal, moderate, heavy, severe.
    pub observed_fouling: [f64; 4],
    pub anode_rate: f64,
    pub rounding_step: f64,
}

impl Default for SurchargeRules {
    fn default() -> Self {
        Self {
            powerboat: 0.25,
            catamaran: 0.25,
            trimaran: 0.50,
            twin_engines: 0.10,
            paint_poor_low: 0.05,
            paint_poor_high: 0.15,
            observed_paint: [0.0, 0.0375, 0.075, 0.10, 0.15],
            fouling_grid: [
                [0.0, 0.0, 0.25, 0.40, 0.70, 0.85, 1.00],
                [0.0, 0.0, 0.25, 0.40, 0.75, 0.90, 1.00],
                [0.0, 0.25, 0.40, 0.70, 0.85, 0.95, 1.00],
                [0.30, 0.50, 0.80, 0.90, 0.95, 1.00, 1.00],
            ],
            observed_fouling: [0.0, 0.25, 0.50, 2.00],
            anode_rate: ANODE_INSTALLATION_RATE,
            rounding_step: 10.0,
        }
    }
}

/// Paint/fouling outcome of a `ConditionInput`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedConditions {
    pub paint: PaintCondition,
    pub fouling: FoulingLevel,
    pub paint_percent: f64,
    pub fouling_percent: f64,
    pub estimated: bool,
}

impl SurchargeRules {
    pub fn builtin() -> &'static SurchargeRules {
        static RULES: OnceLock<SurchargeRules> = OnceLock::new();
        RULES.get_or_init(SurchargeRules::default)
    }

    pub fn boat_type(&self, boat_type: BoatType) -> f64 {
        match boat_type {
            BoatType::Sailboat => 0.0,
            BoatType::Powerboat => self.powerboat,
        }
    }

    pub fn hull_type(&self, hull_type: HullType) -> f64 {
        match hull_type {
            HullType::Monohull => 0.0,
            HullType::Catamaran => self.catamaran,
            HullType::Trimaran => self.trimaran,
        }
    }

    pub fn twin_engines(&self, twin_engines: bool) -> f64 {
        if twin_engines {
            self.twin_engines
        } else {
            0.0
        }
    }

    /// Fine paint table: only poor paint carries a surcharge, banded by age.
    pub fn estimated_paint(&self, age: PaintAge) -> f64 {
        match age {
            PaintAge::TwentyTwoToTwentyFourMonths => self.paint_poor_low,
            PaintAge::OverTwentyFourMonths | PaintAge::Unsure => self.paint_poor_high,
            _ => 0.0,
        }
    }

    pub fn observed_paint(&self, paint: PaintCondition) -> f64 {
        self.observed_paint[paint as usize]
    }

    pub fn estimated_fouling(&self, paint: PaintCondition, cleaning: CleaningAge) -> f64 {
        let row = match paint {
            PaintCondition::Excellent => 0,
            PaintCondition::Good => 1,
            PaintCondition::Fair => 2,
            PaintCondition::Poor | PaintCondition::Missing => 3,
        };
        self.fouling_grid[row][cleaning.index()]
    }

    pub fn observed_fouling(&self, fouling: FoulingLevel) -> f64 {
        self.observed_fouling[fouling as usize]
    }

    pub fn resolve(&self, conditions: &ConditionInput) -> ResolvedConditions {
        match *conditions {
            ConditionInput::Estimated {
                paint_age,
                cleaning_age,
            } => {
                let paint = paint_condition_for(paint_age);
                ResolvedConditions {
                    paint,
                    fouling: fouling_level_for(paint, cleaning_age),
                    paint_percent: self.estimated_paint(paint_age),
                    fouling_percent: self.estimated_fouling(paint, cleaning_age),
                    estimated: true,
                }
            }
            ConditionInput::Observed { paint, fouling } => ResolvedConditions {
                paint,
                fouling,
                paint_percent: self.observed_paint(paint),
                fouling_percent: self.observed_fouling(fouling),
                estimated: false,
            },
            ConditionInput::GrowthSlider { paint, position } => {
                let (fouling, fouling_percent) = growth_slider(position);
                ResolvedConditions {
                    paint,
                    fouling,
                    paint_percent: self.observed_paint(paint),
                    fouling_percent,
                    estimated: false,
                }
            }
        }
    }
}

pub fn paint_condition_for(age: PaintAge) -> PaintCondition {
    match age {
        PaintAge::UpToSixMonths => PaintCondition::Excellent,
        PaintAge::SevenToTwelveMonths => PaintCondition::Good,
        PaintAge::ThirteenToTwentyOneMonths => PaintCondition::Fair,
        PaintAge::TwentyTwoToTwentyFourMonths
        | PaintAge::OverTwentyFourMonths
        | PaintAge::Unsure => PaintCondition::Poor,
    }
}

pub fn fouling_level_for(paint: PaintCondition, cleaning: CleaningAge) -> FoulingLevel {
    use CleaningAge::*;

    match paint {
        PaintCondition::Excellent | PaintCondition::Good => match cleaning {
            UpToTwoMonths => FoulingLevel::Minimal,
            ThreeToFourMonths => FoulingLevel::Moderate,
            FiveToSixMonths | SevenToEightMonths => FoulingLevel::Heavy,
            _ => FoulingLevel::Severe,
        },
        PaintCondition::Fair => match cleaning {
            UpToTwoMonths => FoulingLevel::Moderate,
            ThreeToFourMonths | FiveToSixMonths => FoulingLevel::Heavy,
            _ => FoulingLevel::Severe,
        },
        PaintCondition::Poor | PaintCondition::Missing => match cleaning {
            UpToTwoMonths | ThreeToFourMonths => FoulingLevel::Heavy,
            _ => FoulingLevel::Severe,
        },
    }
}

/// Admin growth slider (0-100) to a fouling level and surcharge fraction.
pub fn growth_slider(position: u8) -> (FoulingLevel, f64) {
    let p = f64::from(position.min(100));
    if p <= 20.0 {
        (FoulingLevel::Minimal, 0.0)
    } else if p <= 35.0 {
        (FoulingLevel::Moderate, (p - 20.0) * 25.0 / 15.0 / 100.0)
    } else if p <= 60.0 {
        (FoulingLevel::Heavy, (25.0 + (p - 35.0)) / 100.0)
    } else {
        (FoulingLevel::Severe, (50.0 + (p - 60.0) * 150.0 / 40.0) / 100.0)
    }
}

/// Parses a form value, falling back to the baseline variant when unrecognised.
///
/// Condition inputs come from fixed controls, so an unknown value is a caller bug;
/// it is logged rather than surfaced to the customer.
pub fn parse_lenient<T>(field: &str, raw: &str) -> T
where
    T: DeserializeOwned + Default + Debug,
{
    match serde_json::from_value::<T>(serde_json::Value::String(raw.trim().to_string())) {
        Ok(value) => value,
        Err(_) => {
            let fallback = T::default();
            warn!(field, raw, ?fallback, "unrecognised value, using baseline");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_age_maps_to_condition() {
        assert_eq!(paint_condition_for(PaintAge::UpToSixMonths), PaintCondition::Excellent);
        assert_eq!(paint_condition_for(PaintAge::SevenToTwelveMonths), PaintCondition::Good);
        assert_eq!(
            paint_condition_for(PaintAge::ThirteenToTwentyOneMonths),
            PaintCondition::Fair
        );
        assert_eq!(paint_condition_for(PaintAge::Unsure), PaintCondition::Poor);
    }

    #[test]
    fn fine_paint_table_only_charges_poor_paint() {
        let rules = SurchargeRules::default();
        assert_eq!(rules.estimated_paint(PaintAge::ThirteenToTwentyOneMonths), 0.0);
        assert_eq!(rules.estimated_paint(PaintAge::TwentyTwoToTwentyFourMonths), 0.05);
        assert_eq!(rules.estimated_paint(PaintAge::OverTwentyFourMonths), 0.15);
        assert_eq!(rules.estimated_paint(PaintAge::Unsure), 0.15);
    }

    #[test]
    fn fouling_grid_is_monotonic_in_both_axes() {
        let rules = SurchargeRules::default();
        for row in &rules.fouling_grid {
            assert!(row.windows(2).all(|pair| pair[0] <= pair[1]));
        }
        for column in 0..7 {
            assert!(rules
                .fouling_grid
                .windows(2)
                .all(|rows| rows[0][column] <= rows[1][column]));
        }
        assert_eq!(rules.fouling_grid[0][0], 0.0);
        assert_eq!(rules.fouling_grid[3][6], 1.0);
    }

    #[test]
    fn missing_paint_uses_poor_row() {
        let rules = SurchargeRules::default();
        for age in CleaningAge::ALL {
            assert_eq!(
                rules.estimated_fouling(PaintCondition::Missing, age),
                rules.estimated_fouling(PaintCondition::Poor, age)
            );
        }
    }

    #[test]
    fn fouling_level_follows_paint_quality() {
        assert_eq!(
            fouling_level_for(PaintCondition::Good, CleaningAge::UpToTwoMonths),
            FoulingLevel::Minimal
        );
        assert_eq!(
            fouling_level_for(PaintCondition::Fair, CleaningAge::UpToTwoMonths),
            FoulingLevel::Moderate
        );
        assert_eq!(
            fouling_level_for(PaintCondition::Poor, CleaningAge::ThreeToFourMonths),
            FoulingLevel::Heavy
        );
        assert_eq!(
            fouling_level_for(PaintCondition::Excellent, CleaningAge::NineToTwelveMonths),
            FoulingLevel::Severe
        );
    }

    #[test]
    fn growth_slider_bands() {
        assert_eq!(growth_slider(0), (FoulingLevel::Minimal, 0.0));
        assert_eq!(growth_slider(20), (FoulingLevel::Minimal, 0.0));
        assert_eq!(growth_slider(35), (FoulingLevel::Moderate, 0.25));
        assert_eq!(growth_slider(60), (FoulingLevel::Heavy, 0.50));
        assert_eq!(growth_slider(100), (FoulingLevel::Severe, 2.0));
        assert_eq!(growth_slider(255), growth_slider(100));
    }

    #[test]
    fn lenient_parsing_falls_back_to_baseline() {
        assert_eq!(parse_lenient::<BoatType>("boat_type", "powerboat"), BoatType::Powerboat);
        assert_eq!(parse_lenient::<BoatType>("boat_type", "hovercraft"), BoatType::Sailboat);
        assert_eq!(parse_lenient::<HullType>("hull_type", " trimaran "), HullType::Trimaran);
        assert_eq!(
            parse_lenient::<CleaningAge>("last_cleaned", "9-12_months"),
            CleaningAge::NineToTwelveMonths
        );
        assert_eq!(
            parse_lenient::<PaintCondition>("paint", "sparkly"),
            PaintCondition::Excellent
        );
    }

    #[test]
    fn observed_inputs_use_coarse_tables() {
        let rules = SurchargeRules::default();
        let resolved = rules.resolve(&ConditionInput::Observed {
            paint: PaintCondition::Missing,
            fouling: FoulingLevel::Severe,
        });
        assert_eq!(resolved.paint_percent, 0.15);
        assert_eq!(resolved.fouling_percent, 2.0);
        assert!(!resolved.estimated);
    }
}
