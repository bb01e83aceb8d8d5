use super::engine::ReimbursementEngine;
use crate::domain::config::{BaseCoefficients, Bounds};
use crate::domain::errors::PredictionError;
use crate::domain::prediction::{PredictionPath, PredictionResult};
use crate::domain::trip::TripInput;

/// Interface for reimbursement models
pub trait ReimbursementPredictor: Send + Sync {
    fn predict(&self, input: &TripInput) -> Result<PredictionResult, PredictionError>;

    /// Predict and report which estimator produced the amount.
    fn predict_routed(
        &self,
        input: &TripInput,
    ) -> Result<(PredictionResult, PredictionPath), PredictionError> {
        self.predict(input).map(|result| (result, PredictionPath::Rules))
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}

impl ReimbursementPredictor for ReimbursementEngine {
    fn predict(&self, input: &TripInput) -> Result<PredictionResult, PredictionError> {
        ReimbursementEngine::predict(self, input)
    }

    fn predict_routed(
        &self,
        input: &TripInput,
    ) -> Result<(PredictionResult, PredictionPath), PredictionError> {
        self.explain(input).map(|trace| (trace.result, trace.path))
    }

    fn name(&self) -> &str {
        "Rules + Similarity Fallback"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}

/// The bare linear formula with no rules and no fallback. Used as the
/// comparison baseline during evaluation.
#[derive(Debug, Clone, Copy)]
pub struct LinearBaseline {
    coefficients: BaseCoefficients,
    bounds: Bounds,
}

impl LinearBaseline {
    pub fn new(coefficients: BaseCoefficients, bounds: Bounds) -> Self {
        Self {
            coefficients,
            bounds,
        }
    }
}

impl ReimbursementPredictor for LinearBaseline {
    fn predict(&self, input: &TripInput) -> Result<PredictionResult, PredictionError> {
        Ok(PredictionResult {
            amount: self.bounds.apply_f64(self.coefficients.linear(input)),
        })
    }

    fn name(&self) -> &str {
        "Linear Baseline"
    }

    fn version(&self) -> &str {
        "v1"
    }
}
