// Rule classifier, similarity fallback and the prediction orchestrator
pub mod estimation;

// Offline least-squares fit of the base formula
pub mod calibration;

// Batch scoring against the reference set
pub mod evaluation;
