use reimburse::application::estimation::{ReimbursementEngine, ReimbursementPredictor};
use reimburse::domain::config::EngineConfig;
use reimburse::domain::errors::PredictionError;
use reimburse::domain::prediction::PredictionPath;
use reimburse::domain::rules::{Criteria, EdgeRegion, Range, RuleCategory};
use reimburse::domain::trip::{LabeledExample, ReferenceSet, TripInput};
use reimburse::infrastructure::parse_reference_set;
use rust_decimal_macros::dec;
use std::sync::Arc;

const CASES: &str = r#"[
    { "input": { "trip_duration_days": 3, "miles_traveled": 200, "total_receipts_amount": 150 }, "expected_output": 450.00 },
    { "input": { "trip_duration_days": 1, "miles_traveled": 1100, "total_receipts_amount": 50 }, "expected_output": 900.00 },
    { "input": { "trip_duration_days": 1, "miles_traveled": 1300, "total_receipts_amount": 50 }, "expected_output": 1000.00 }
]"#;

fn trip(days: i64, miles: f64, receipts: f64) -> TripInput {
    TripInput::new(days, miles, receipts).unwrap()
}

fn engine_with(config: &EngineConfig) -> ReimbursementEngine {
    ReimbursementEngine::new(config, parse_reference_set(CASES).unwrap()).unwrap()
}

#[test]
fn test_single_day_no_travel_uses_intercept() {
    let engine = engine_with(&EngineConfig::default());
    let trace = engine.explain(&trip(1, 0.0, 0.0)).unwrap();

    // C_days + C_intercept
    assert_eq!(trace.result.amount, dec!(320.00));
    assert_eq!(trace.path, PredictionPath::Rules);
    assert!(trace.rules.edge_region.is_none());
}

#[test]
fn test_sweet_spot_trip_gets_one_combination_bonus() {
    let engine = engine_with(&EngineConfig::default());
    let trace = engine.explain(&trip(5, 900.0, 400.0)).unwrap();

    assert_eq!(trace.features.miles_per_day, 180.0);
    assert_eq!(trace.features.receipts_per_day, 80.0);
    assert_eq!(trace.rules.fired_in(RuleCategory::Combination).count(), 1);
    assert_eq!(trace.rules.fired_in(RuleCategory::Duration).count(), 0);
    assert_eq!(trace.rules.fired_in(RuleCategory::Efficiency).count(), 0);
    assert_eq!(trace.result.amount, dec!(1238.55));
}

#[test]
fn test_short_high_mileage_trip_uses_fallback() {
    let engine = engine_with(&EngineConfig::default());
    let trace = engine.explain(&trip(1, 1200.0, 50.0)).unwrap();

    assert_eq!(trace.path, PredictionPath::Similarity);
    assert_eq!(
        trace.rules.edge_region.as_deref(),
        Some("short_trip_very_high_mileage")
    );
    // Both one-day neighbors sit 80 units away, the 3-day one much further.
    assert_eq!(trace.neighbors.len(), 3);
    assert_eq!(trace.neighbors[0].index, 1);
    assert_eq!(trace.neighbors[1].index, 2);
    assert!(trace.result.amount > dec!(900.00) && trace.result.amount < dec!(1000.00));
    assert_ne!(trace.result.amount, trace.base_amount);
}

#[test]
fn test_reference_example_in_edge_region_is_reproduced() {
    let mut config = EngineConfig::default();
    config.edge_cases.push(EdgeRegion::new(
        "three_day_short_haul",
        Criteria::default()
            .days(Range::exactly(3.0))
            .miles(Range::between(150.0, 250.0)),
    ));
    let engine = engine_with(&config);

    let trace = engine.explain(&trip(3, 200.0, 150.0)).unwrap();
    assert_eq!(trace.path, PredictionPath::Similarity);
    assert_eq!(trace.result.amount, dec!(450.00));
    assert_eq!(trace.result.to_string(), "450.00");
}

#[test]
fn test_negative_days_is_invalid_input() {
    let engine = engine_with(&EngineConfig::default());
    for (miles, receipts) in [(0.0, 0.0), (100.0, 50.0), (5000.0, 2500.0)] {
        assert!(matches!(
            engine.predict_raw(-1, miles, receipts),
            Err(PredictionError::InvalidInput { .. })
        ));
    }
}

#[test]
fn test_engine_shared_across_threads() {
    let engine: Arc<dyn ReimbursementPredictor> = Arc::new(engine_with(&EngineConfig::default()));
    let expected = engine.predict(&trip(4, 320.0, 610.5)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.predict(&trip(4, 320.0, 610.5)).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_empty_reference_set_is_never_replaced_by_rule_estimate() {
    let empty = ReferenceSet::new(Vec::<LabeledExample>::new());
    let engine = ReimbursementEngine::new(&EngineConfig::default(), empty).unwrap();
    assert_eq!(
        engine.predict(&trip(2, 900.0, 10.0)),
        Err(PredictionError::NoReferenceData)
    );
}
