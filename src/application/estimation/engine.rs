use super::rule_classifier::RuleClassifier;
use super::similarity::SimilarityEstimator;
use crate::domain::config::EngineConfig;
use crate::domain::errors::{ConfigurationError, PredictionError};
use crate::domain::prediction::{PredictionPath, PredictionResult, PredictionTrace};
use crate::domain::trip::{ReferenceSet, TripInput};
use tracing::{debug, info, warn};

/// Prediction orchestrator.
///
/// Validates the trip, runs the rule classifier and, for trips inside an
/// edge region, replaces the rule estimate with the similarity fallback.
/// Every returned amount passes through the same clamp and rounding.
///
/// The engine is immutable once built and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ReimbursementEngine {
    classifier: RuleClassifier,
    similarity: SimilarityEstimator,
    examples: ReferenceSet,
}

impl ReimbursementEngine {
    pub fn new(config: &EngineConfig, examples: ReferenceSet) -> Result<Self, ConfigurationError> {
        let classifier = RuleClassifier::from_config(config)?;

        if examples.is_empty() {
            warn!("Reference set is empty: edge-case trips will fail with NoReferenceData");
        } else if config.similarity.k > examples.len() {
            warn!(
                "Similarity k = {} exceeds reference set size {}; using all examples",
                config.similarity.k,
                examples.len()
            );
        }

        info!(
            "Reimbursement engine ready: {} rules, {} edge regions, {} reference examples",
            config.rules.len(),
            config.edge_cases.len(),
            examples.len()
        );

        Ok(Self {
            classifier,
            similarity: SimilarityEstimator::new(config.similarity),
            examples,
        })
    }

    pub fn classifier(&self) -> &RuleClassifier {
        &self.classifier
    }

    pub fn examples(&self) -> &ReferenceSet {
        &self.examples
    }

    pub fn predict(&self, input: &TripInput) -> Result<PredictionResult, PredictionError> {
        self.explain(input).map(|trace| trace.result)
    }

    /// Validates raw values before predicting.
    pub fn predict_raw(
        &self,
        days: i64,
        miles: f64,
        receipts: f64,
    ) -> Result<PredictionResult, PredictionError> {
        let input = TripInput::new(days, miles, receipts)?;
        self.predict(&input)
    }

    /// Runs the full pipeline and keeps every intermediate decision.
    pub fn explain(&self, input: &TripInput) -> Result<PredictionTrace, PredictionError> {
        let features = input.derive();
        let base = self.classifier.estimate_base(input, &features);

        let (amount, neighbors, path) = if base.is_edge_case {
            let fallback = self.similarity.estimate(input, &self.examples)?;
            debug!(
                "Edge case routed to similarity fallback: rules {} -> knn {:.2}",
                base.amount, fallback.amount
            );
            (
                self.classifier.bounds().apply_f64(fallback.amount),
                fallback.neighbors,
                PredictionPath::Similarity,
            )
        } else {
            (
                self.classifier.bounds().apply(base.amount),
                Vec::new(),
                PredictionPath::Rules,
            )
        };

        Ok(PredictionTrace {
            input: *input,
            features,
            rules: base.trace,
            base_amount: base.amount,
            neighbors,
            path,
            result: PredictionResult { amount },
        })
    }
}
