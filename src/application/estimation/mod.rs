pub mod engine;
pub mod predictor;
pub mod rule_classifier;
pub mod similarity;

pub use engine::ReimbursementEngine;
pub use predictor::{LinearBaseline, ReimbursementPredictor};
pub use rule_classifier::{BaseEstimate, RuleClassifier};
pub use similarity::{SimilarityEstimate, SimilarityEstimator};
