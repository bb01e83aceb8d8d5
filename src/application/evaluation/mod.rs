pub mod evaluator;
pub mod reporting;

pub use evaluator::{CaseResult, EvaluationReport, Evaluator, challenge_score};
pub use reporting::EvaluationReporter;
