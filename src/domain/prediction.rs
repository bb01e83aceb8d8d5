use crate::domain::rules::{Adjustment, RuleCategory};
use crate::domain::trip::{DerivedFeatures, TripInput};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Final output of the engine: cents, clamped to the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub amount: Decimal,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}

/// Which estimator produced the returned amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionPath {
    Rules,
    Similarity,
}

impl fmt::Display for PredictionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionPath::Rules => f.write_str("rules"),
            PredictionPath::Similarity => f.write_str("similarity"),
        }
    }
}

/// A rule that fired during the adjustment pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredRule {
    pub name: String,
    pub category: RuleCategory,
    pub adjustment: Option<Adjustment>,
}

/// A reference example consulted by the similarity fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Position in the reference set.
    pub index: usize,
    pub distance: f64,
    pub observed: f64,
}

/// Rule-path bookkeeping produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTrace {
    pub formula: &'static str,
    pub formula_rule: Option<String>,
    pub fired: Vec<FiredRule>,
    /// Amount before clamping and rounding.
    pub raw_amount: f64,
    pub edge_region: Option<String>,
}

impl RuleTrace {
    pub fn fired_in(&self, category: RuleCategory) -> impl Iterator<Item = &FiredRule> {
        self.fired.iter().filter(move |r| r.category == category)
    }
}

/// Full explanation of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionTrace {
    pub input: TripInput,
    pub features: DerivedFeatures,
    pub rules: RuleTrace,
    pub base_amount: Decimal,
    pub neighbors: Vec<Neighbor>,
    pub path: PredictionPath,
    pub result: PredictionResult,
}
