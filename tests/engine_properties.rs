use proptest::prelude::*;
use reimburse::application::estimation::ReimbursementEngine;
use reimburse::domain::config::EngineConfig;
use reimburse::domain::errors::PredictionError;
use reimburse::domain::prediction::PredictionPath;
use reimburse::domain::rules::RuleCategory;
use reimburse::domain::trip::{LabeledExample, ReferenceSet, TripInput};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

const CASES: i64 = 60;

fn observed_cents(i: i64) -> i64 {
    10_000 + (i * 3_731) % 150_000
}

/// Distinct inputs spread over every edge region, amounts at cents.
fn reference() -> ReferenceSet {
    let examples = (0..CASES)
        .map(|i| {
            let input = TripInput::new(
                1 + i % 14,
                ((i * 97) % 1500) as f64 + 0.5,
                ((i * 263) % 2500) as f64 + 0.25,
            )
            .unwrap();
            LabeledExample::new(input, observed_cents(i) as f64 / 100.0).unwrap()
        })
        .collect();
    ReferenceSet::new(examples)
}

fn engine() -> ReimbursementEngine {
    ReimbursementEngine::new(&EngineConfig::default(), reference()).unwrap()
}

#[test]
fn test_reference_examples_in_edge_regions_are_reproduced() {
    let engine = engine();
    let mut routed = 0;
    for (i, example) in engine.examples().iter().enumerate() {
        let trace = engine.explain(&example.input).unwrap();
        if trace.path == PredictionPath::Similarity {
            routed += 1;
            assert_eq!(
                trace.result.amount,
                Decimal::new(observed_cents(i as i64), 2),
                "case {}",
                i
            );
        }
    }
    assert!(routed > 0, "no reference case fell in an edge region");
}

proptest! {
    #[test]
    fn predictions_are_deterministic(
        days in 1i64..30,
        miles in 0.0f64..3000.0,
        receipts in 0.0f64..3000.0,
    ) {
        let engine = engine();
        let input = TripInput::new(days, miles, receipts).unwrap();
        prop_assert_eq!(engine.predict(&input).unwrap(), engine.predict(&input).unwrap());
    }

    #[test]
    fn predictions_stay_within_bounds(
        days in 1i64..400,
        miles in 0.0f64..100_000.0,
        receipts in 0.0f64..100_000.0,
    ) {
        let amount = engine().predict_raw(days, miles, receipts).unwrap().amount;
        prop_assert!(amount >= dec!(0.01));
        prop_assert!(amount <= dec!(9999.99));
        prop_assert_eq!(amount.scale(), 2);
    }

    #[test]
    fn at_most_one_rule_per_category(
        days in 1i64..20,
        miles in 0.0f64..2500.0,
        receipts in 0.0f64..2500.0,
    ) {
        let trace = engine()
            .explain(&TripInput::new(days, miles, receipts).unwrap())
            .unwrap();
        let combination = trace.rules.fired_in(RuleCategory::Combination).count();
        let duration = trace.rules.fired_in(RuleCategory::Duration).count();
        let efficiency = trace.rules.fired_in(RuleCategory::Efficiency).count();

        prop_assert!(combination <= 1);
        prop_assert!(duration <= 1);
        prop_assert!(efficiency <= 1);
        if combination == 1 {
            prop_assert_eq!(duration + efficiency, 0);
        }
    }

    #[test]
    fn fallback_is_a_convex_combination(
        days in 1i64..3,
        miles in 801.0f64..2000.0,
        receipts in 0.0f64..500.0,
    ) {
        let trace = engine()
            .explain(&TripInput::new(days, miles, receipts).unwrap())
            .unwrap();
        prop_assert_eq!(trace.path, PredictionPath::Similarity);

        let low = trace.neighbors.iter().map(|n| n.observed).fold(f64::INFINITY, f64::min);
        let high = trace.neighbors.iter().map(|n| n.observed).fold(f64::NEG_INFINITY, f64::max);
        let amount = trace.result.amount.to_f64().unwrap();
        prop_assert!(amount >= low - 0.005 && amount <= high + 0.005);
    }

    #[test]
    fn fallback_stays_convex_at_extreme_magnitudes(
        days in 1i64..3,
        miles in 801.0f64..1e12,
        receipts in 0.0f64..f64::MAX,
    ) {
        let trace = engine()
            .explain(&TripInput::new(days, miles, receipts).unwrap())
            .unwrap();
        prop_assert_eq!(trace.path, PredictionPath::Similarity);

        let low = trace.neighbors.iter().map(|n| n.observed).fold(f64::INFINITY, f64::min);
        let high = trace.neighbors.iter().map(|n| n.observed).fold(f64::NEG_INFINITY, f64::max);
        let amount = trace.result.amount.to_f64().unwrap();
        prop_assert!(
            amount >= low - 0.005 && amount <= high + 0.005,
            "{} outside [{}, {}]",
            amount,
            low,
            high
        );
    }

    #[test]
    fn non_positive_days_are_rejected(
        days in -1000i64..=0,
        miles in 0.0f64..5000.0,
        receipts in 0.0f64..5000.0,
    ) {
        let result = engine().predict_raw(days, miles, receipts);
        prop_assert!(
            matches!(result, Err(PredictionError::InvalidInput { .. })),
            "expected InvalidInput, got {:?}",
            result
        );
    }
}
