use dive_estimator::domain::{
    estimate, BoatType, CleaningAge, ConditionInput, EstimateRequest, EstimateVariant,
    FoulingLevel, HullType, PaintAge, PaintCondition, PriceCheckDetails, PriceValidator,
    RateTable, SurchargeRules,
};
use proptest::prelude::*;

const MINIMUM: f64 = 150.0;

fn flat_service() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["anodes_only", "item_recovery", "propeller_service"])
}

fn per_foot_service() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "recurring_cleaning",
        "onetime_cleaning",
        "underwater_inspection",
    ])
}

fn any_service() -> impl Strategy<Value = &'static str> {
    prop_oneof![flat_service(), per_foot_service()]
}

fn estimated_conditions() -> impl Strategy<Value = ConditionInput> {
    (
        prop::sample::select(PaintAge::ALL.to_vec()),
        prop::sample::select(CleaningAge::ALL.to_vec()),
    )
        .prop_map(|(paint_age, cleaning_age)| ConditionInput::Estimated {
            paint_age,
            cleaning_age,
        })
}

/// Conditions paired with the variant the screen collecting them prices with.
fn screen_conditions() -> impl Strategy<Value = (ConditionInput, EstimateVariant)> {
    let observed = (
        prop::sample::select(PaintCondition::ALL.to_vec()),
        prop::sample::select(FoulingLevel::ALL.to_vec()),
    )
        .prop_map(|(paint, fouling)| ConditionInput::Observed { paint, fouling });
    let slider = (prop::sample::select(PaintCondition::ALL.to_vec()), 0u8..=100)
        .prop_map(|(paint, position)| ConditionInput::GrowthSlider { paint, position });

    prop_oneof![
        estimated_conditions().prop_map(|c| (c, EstimateVariant::ClientQuote)),
        observed.prop_map(|c| (c, EstimateVariant::Exact)),
        slider.prop_map(|c| (c, EstimateVariant::Exact)),
    ]
}

fn boat() -> impl Strategy<Value = (BoatType, HullType, bool)> {
    (
        prop::sample::select(vec![BoatType::Sailboat, BoatType::Powerboat]),
        prop::sample::select(vec![HullType::Monohull, HullType::Catamaran, HullType::Trimaran]),
        any::<bool>(),
    )
}

fn request_for(
    service: &str,
    feet: f64,
    (boat_type, hull_type, twin): (BoatType, HullType, bool),
    conditions: ConditionInput,
    anodes: u32,
) -> EstimateRequest {
    EstimateRequest::new(service, MINIMUM)
        .with_length(feet)
        .with_boat(boat_type, hull_type, twin)
        .with_conditions(conditions)
        .with_anodes(anodes)
}

proptest! {
    #[test]
    fn flat_services_charge_rate_or_minimum(service in flat_service(), minimum in 0.0f64..500.0) {
        let request = EstimateRequest::new(service, minimum);
        let result = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();
        let rate = RateTable::builtin().get(service).unwrap().base_rate;
        prop_assert!((result.final_amount - rate.max(minimum)).abs() < 1e-9);
    }

    #[test]
    fn per_foot_total_never_drops_below_minimum(
        service in per_foot_service(),
        feet in 1.0f64..400.0,
        boat in boat(),
        conditions in estimated_conditions(),
        anodes in 0u32..6,
        exact in any::<bool>(),
    ) {
        let variant = if exact { EstimateVariant::Exact } else { EstimateVariant::ClientQuote };
        let request = request_for(service, feet, boat, conditions, anodes).with_variant(variant);
        let result = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();
        prop_assert!(result.total_before_minimum > 0.0);
        prop_assert!(result.final_amount >= MINIMUM);
    }

    #[test]
    fn surcharges_are_fractions_of_the_floored_base(
        service in any_service(),
        feet in 1.0f64..300.0,
        boat in boat(),
        conditions in estimated_conditions(),
    ) {
        let request = request_for(service, feet, boat, conditions, 0);
        let result = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();

        let mut sum = 0.0;
        for item in &result.surcharges {
            prop_assert!((item.amount - item.percent * result.base_amount).abs() < 1e-9);
            sum += item.amount;
        }
        prop_assert!((result.subtotal - (result.base_amount + sum)).abs() < 1e-9);
    }

    #[test]
    fn estimate_is_idempotent(
        service in any_service(),
        feet in 1.0f64..300.0,
        boat in boat(),
        conditions in estimated_conditions(),
        anodes in 0u32..10,
    ) {
        let request = request_for(service, feet, boat, conditions, anodes);
        let first = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();
        let second = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validator_accepts_estimates_and_rejects_gross_tampering(
        service in any_service(),
        feet in 10.0f64..=300.0,
        boat in boat(),
        (conditions, variant) in screen_conditions(),
        anodes in 0u32..=200,
    ) {
        let request = request_for(service, feet, boat, conditions, anodes).with_variant(variant);
        let result = estimate(&request, RateTable::builtin(), SurchargeRules::builtin()).unwrap();
        let validator = PriceValidator::new(RateTable::builtin(), MINIMUM);
        let details = PriceCheckDetails::with_length(feet).with_anodes(anodes);

        prop_assert!(validator.validate(service, result.final_amount, &details));
        prop_assert!(!validator.validate(service, result.final_amount * 100.0, &details));
    }
}
