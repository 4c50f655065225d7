//! Service price estimation.
//!
//! One implementation serves the customer calculator, the admin charge screen and
//! the checkout gate, so every screen agrees on the same total for the same input.

use thiserror::Error;
use tracing::debug;

use super::entities::{
    EstimateNote, EstimateRequest, EstimateResult, EstimateVariant, RateType, ServiceDefinition,
    SurchargeKind, SurchargeLineItem,
};
use super::rates::RateTable;
use super::surcharges::SurchargeRules;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimateError {
    #[error("please select a valid service (unknown service `{0}`)")]
    UnknownService(String),
    #[error("{field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
}

pub fn estimate(
    request: &EstimateRequest,
    rates: &RateTable,
    rules: &SurchargeRules,
) -> Result<EstimateResult, EstimateError> {
    let minimum = sanitize_minimum(request.minimum_charge);

    // An empty service id means only anodes (if any) were picked.
    let service = if request.service_id.trim().is_empty() {
        None
    } else {
        Some(
            rates
                .get(&request.service_id)
                .ok_or_else(|| EstimateError::UnknownService(request.service_id.clone()))?,
        )
    };

    let raw_base_amount = match service {
        Some(service) => base_amount(service, request.boat_length_feet)?,
        None => 0.0,
    };

    let mut notes = Vec::new();
    let base_amount = if raw_base_amount > 0.0 && raw_base_amount < minimum {
        notes.push(EstimateNote::BaseFloored {
            raw: raw_base_amount,
            floored: minimum,
        });
        minimum
    } else {
        raw_base_amount
    };

    let mut surcharges = SurchargeList::new(base_amount);
    let mut paint = None;
    let mut fouling = None;

    if let Some(service) = service {
        if service.is_per_foot() && service.is_cleaning() {
            surcharges.push(
                SurchargeKind::BoatType,
                "Powerboat",
                rules.boat_type(request.boat_type),
            );
            let hull_label = match request.hull_type.additional_hulls() {
                1 => "Catamaran",
                _ => "Trimaran",
            };
            surcharges.push(
                SurchargeKind::HullType,
                hull_label,
                rules.hull_type(request.hull_type),
            );
            surcharges.push(
                SurchargeKind::TwinEngines,
                "Twin engines",
                rules.twin_engines(request.twin_engines),
            );
        }

        if service.is_cleaning() {
            let resolved = rules.resolve(&request.conditions);
            let prefix = if resolved.estimated { "Est. " } else { "" };
            surcharges.push(
                SurchargeKind::Paint,
                &format!("{prefix}paint ({})", resolved.paint.label()),
                resolved.paint_percent,
            );
            if service.fouling_exempt {
                notes.push(EstimateNote::FoulingNotApplicable);
            } else {
                surcharges.push(
                    SurchargeKind::Fouling,
                    &format!("{prefix}growth ({})", resolved.fouling.label()),
                    resolved.fouling_percent,
                );
            }
            paint = Some(resolved.paint);
            fouling = Some(resolved.fouling);
        }
    }

    let surcharges = surcharges.into_items();
    let subtotal = base_amount + surcharges.iter().map(|item| item.amount).sum::<f64>();
    let anode_installation_amount = f64::from(request.anodes_to_install) * rules.anode_rate;
    let total_before_minimum = subtotal + anode_installation_amount;

    let (service_name, rate_type, base_rate) = match service {
        Some(service) => (service.name.clone(), service.rate_type, service.base_rate),
        None => ("No service selected".to_string(), RateType::Flat, 0.0),
    };

    let mut result = EstimateResult {
        service_id: request.service_id.clone(),
        service_name,
        rate_type,
        base_rate,
        boat_length_feet: request.boat_length_feet,
        variant: request.variant,
        raw_base_amount,
        base_amount,
        surcharges,
        subtotal,
        anode_count: request.anodes_to_install,
        anode_installation_amount,
        total_before_minimum,
        minimum_applied: false,
        final_amount: total_before_minimum,
        rounded: false,
        paint,
        fouling,
        notes,
    };

    if total_before_minimum <= 0.0 {
        result.final_amount = 0.0;
        result.notes.push(EstimateNote::NothingSelected);
        return Ok(result);
    }

    if total_before_minimum < minimum {
        result.final_amount = minimum;
        result.minimum_applied = true;
        result.notes.push(EstimateNote::MinimumApplied { minimum });
    } else if request.variant == EstimateVariant::ClientQuote && rate_type == RateType::PerFoot {
        // Flat totals are quoted to the cent on purpose; only per-foot quotes round.
        let rounded = round_to_step(total_before_minimum, rules.rounding_step).max(minimum);
        result.rounded = rounded != total_before_minimum;
        result.final_amount = rounded;
    }

    debug!(
        service = %result.service_id,
        base = result.base_amount,
        surcharges = result.surcharges.len(),
        total = result.final_amount,
        "estimate computed"
    );

    Ok(result)
}

fn base_amount(service: &ServiceDefinition, length: Option<f64>) -> Result<f64, EstimateError> {
    match service.rate_type {
        RateType::Flat => Ok(service.base_rate),
        RateType::PerFoot => {
            let feet = length
                .filter(|feet| feet.is_finite() && *feet > 0.0)
                .ok_or_else(|| EstimateError::InvalidInput {
                    field: "boat_length_feet",
                    message: format!(
                        "boat length must be a positive number of feet for {}",
                        service.name
                    ),
                })?;
            Ok(service.base_rate * feet)
        }
    }
}

fn sanitize_minimum(minimum: f64) -> f64 {
    if minimum.is_finite() && minimum > 0.0 {
        minimum
    } else {
        0.0
    }
}

/// `round(x / step) * step`; a non-positive step leaves the amount untouched.
pub fn round_to_step(amount: f64, step: f64) -> f64 {
    if step > 0.0 && step.is_finite() {
        (amount / step).round() * step
    } else {
        amount
    }
}

struct SurchargeList {
    base: f64,
    items: Vec<SurchargeLineItem>,
}

impl SurchargeList {
    fn new(base: f64) -> Self {
        Self {
            base,
            items: Vec::with_capacity(5),
        }
    }

    fn push(&mut self, kind: SurchargeKind, label: &str, percent: f64) {
        if percent > 0.0 {
            self.items.push(SurchargeLineItem {
                kind,
                label: label.to_string(),
                percent,
                amount: percent * self.base,
            });
        }
    }

    fn into_items(self) -> Vec<SurchargeLineItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        BoatType, CleaningAge, ConditionInput, FoulingLevel, HullType, PaintAge, PaintCondition,
        ServiceFamily,
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn run(request: &EstimateRequest) -> EstimateResult {
        estimate(request, RateTable::builtin(), SurchargeRules::builtin()).unwrap()
    }

    fn clean_hull() -> ConditionInput {
        ConditionInput::Estimated {
            paint_age: PaintAge::SevenToTwelveMonths,
            cleaning_age: CleaningAge::UpToTwoMonths,
        }
    }

    #[test]
    fn recurring_cleaning_without_surcharges() {
        let request = EstimateRequest::new("recurring_cleaning", 150.0)
            .with_length(40.0)
            .with_conditions(clean_hull());
        let result = run(&request);

        assert_close(result.base_amount, 180.0);
        assert!(result.surcharges.is_empty());
        assert_eq!(result.paint, Some(PaintCondition::Good));
        assert_eq!(result.fouling, Some(FoulingLevel::Minimal));
        assert_close(result.final_amount, 180.0);
        assert!(!result.rounded);
    }

    #[test]
    fn short_boat_base_is_floored_before_surcharges() {
        let request = EstimateRequest::new("recurring_cleaning", 150.0)
            .with_length(10.0)
            .with_boat(BoatType::Powerboat, HullType::Monohull, false)
            .with_conditions(clean_hull());
        let result = run(&request);

        assert_close(result.raw_base_amount, 45.0);
        assert_close(result.base_amount, 150.0);
        assert!(result.has_note(|n| matches!(n, EstimateNote::BaseFloored { .. })));
        let powerboat = result.surcharge(SurchargeKind::BoatType).unwrap();
        assert_close(powerboat.amount, 37.5);
        assert_close(result.final_amount, 190.0);
    }

    #[test]
    fn short_boat_without_surcharges_lands_on_minimum() {
        let request = EstimateRequest::new("recurring_cleaning", 150.0)
            .with_length(10.0)
            .with_conditions(clean_hull());
        let result = run(&request);
        assert_close(result.final_amount, 150.0);
        assert!(!result.minimum_applied);
    }

    #[test]
    fn flat_services_are_not_rounded() {
        let recovery = run(&EstimateRequest::new("item_recovery", 150.0));
        assert_close(recovery.final_amount, 199.0);
        assert!(recovery.surcharges.is_empty());

        let anodes = run(&EstimateRequest::new("anodes_only", 150.0).with_anodes(3));
        assert_close(anodes.base_amount, 150.0);
        assert_close(anodes.anode_installation_amount, 45.0);
        assert_close(anodes.final_amount, 195.0);

        let single = run(&EstimateRequest::new("anodes_only", 150.0).with_anodes(1));
        assert_close(single.final_amount, 165.0);
        assert!(!single.rounded);
    }

    #[test]
    fn every_surcharge_fires_in_order() {
        let request = EstimateRequest::new("onetime_cleaning", 150.0)
            .with_length(35.0)
            .with_boat(BoatType::Powerboat, HullType::Catamaran, true)
            .with_conditions(ConditionInput::Estimated {
                paint_age: PaintAge::OverTwentyFourMonths,
                cleaning_age: CleaningAge::ThirteenToTwentyFourMonths,
            });
        let result = run(&request);

        let kinds: Vec<_> = result.surcharges.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SurchargeKind::BoatType,
                SurchargeKind::HullType,
                SurchargeKind::TwinEngines,
                SurchargeKind::Paint,
                SurchargeKind::Fouling,
            ]
        );
        let amounts: Vec<_> = result.surcharges.iter().map(|s| s.amount).collect();
        for (actual, expected) in amounts.iter().zip([52.5, 52.5, 21.0, 31.5, 210.0]) {
            assert_close(*actual, expected);
        }
        assert_close(result.subtotal, 577.5);
        assert_close(result.final_amount, 580.0);
        assert!(result.rounded);
    }

    #[test]
    fn exact_variant_skips_rounding() {
        let request = EstimateRequest::new("onetime_cleaning", 150.0)
            .with_length(35.0)
            .with_boat(BoatType::Powerboat, HullType::Catamaran, true)
            .with_conditions(ConditionInput::Estimated {
                paint_age: PaintAge::OverTwentyFourMonths,
                cleaning_age: CleaningAge::ThirteenToTwentyFourMonths,
            })
            .with_variant(EstimateVariant::Exact);
        assert_close(run(&request).final_amount, 577.5);
    }

    #[test]
    fn inspection_skips_boat_and_condition_surcharges() {
        let request = EstimateRequest::new("underwater_inspection", 150.0)
            .with_length(50.0)
            .with_boat(BoatType::Powerboat, HullType::Trimaran, true)
            .with_conditions(ConditionInput::Observed {
                paint: PaintCondition::Missing,
                fouling: FoulingLevel::Severe,
            });
        let result = run(&request);
        assert!(result.surcharges.is_empty());
        assert_eq!(result.paint, None);
        assert_close(result.final_amount, 200.0);
    }

    #[test]
    fn trimaran_is_charged_double_hull_rate() {
        let request = EstimateRequest::new("recurring_cleaning", 150.0)
            .with_length(40.0)
            .with_boat(BoatType::Sailboat, HullType::Trimaran, false)
            .with_conditions(clean_hull())
            .with_variant(EstimateVariant::Exact);
        let result = run(&request);
        let hull = result.surcharge(SurchargeKind::HullType).unwrap();
        assert_eq!(hull.label, "Trimaran");
        assert_close(hull.amount, 90.0);
    }

    #[test]
    fn fouling_exempt_service_records_note() {
        let mut services = RateTable::builtin().services().to_vec();
        services.push(ServiceDefinition {
            id: "haul_out_prep".to_string(),
            name: "Haul-out Prep".to_string(),
            rate_type: RateType::PerFoot,
            base_rate: 5.0,
            family: ServiceFamily::Cleaning,
            fouling_exempt: true,
            description: String::new(),
        });
        let rates = RateTable::new(services).unwrap();
        let request = EstimateRequest::new("haul_out_prep", 150.0)
            .with_length(40.0)
            .with_conditions(ConditionInput::Observed {
                paint: PaintCondition::Poor,
                fouling: FoulingLevel::Severe,
            })
            .with_variant(EstimateVariant::Exact);
        let result = estimate(&request, &rates, SurchargeRules::builtin()).unwrap();

        assert!(result.surcharge(SurchargeKind::Fouling).is_none());
        assert!(result.has_note(|n| matches!(n, EstimateNote::FoulingNotApplicable)));
        assert_close(result.final_amount, 220.0);
    }

    #[test]
    fn anodes_alone_are_subject_to_minimum() {
        let result = run(&EstimateRequest::new("", 150.0).with_anodes(2));
        assert_close(result.total_before_minimum, 30.0);
        assert_close(result.final_amount, 150.0);
        assert!(result.minimum_applied);
    }

    #[test]
    fn nothing_selected_is_zero_not_minimum() {
        let result = run(&EstimateRequest::new("", 150.0));
        assert_close(result.final_amount, 0.0);
        assert!(result.is_empty());
        assert!(!result.minimum_applied);
    }

    #[test]
    fn unknown_service_and_bad_length_are_rejected() {
        let unknown = estimate(
            &EstimateRequest::new("teak_oiling", 150.0),
            RateTable::builtin(),
            SurchargeRules::builtin(),
        );
        assert_eq!(
            unknown,
            Err(EstimateError::UnknownService("teak_oiling".to_string()))
        );

        for length in [None, Some(0.0), Some(-12.0), Some(f64::NAN)] {
            let mut request = EstimateRequest::new("onetime_cleaning", 150.0);
            request.boat_length_feet = length;
            let result = estimate(&request, RateTable::builtin(), SurchargeRules::builtin());
            assert!(matches!(result, Err(EstimateError::InvalidInput { .. })));
        }
    }

    #[test]
    fn rounding_never_drops_below_minimum() {
        let rules = SurchargeRules::default();
        let request = EstimateRequest::new("recurring_cleaning", 152.0)
            .with_length(34.0)
            .with_conditions(clean_hull());
        let result = estimate(&request, RateTable::builtin(), &rules).unwrap();
        assert_close(result.total_before_minimum, 153.0);
        assert_close(result.final_amount, 152.0);
        assert!(!result.minimum_applied);

        assert_close(round_to_step(152.0, 10.0), 150.0);
        assert_close(round_to_step(152.0, 0.0), 152.0);
    }
}
