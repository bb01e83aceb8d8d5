use thiserror::Error;

/// Errors raised while producing a single prediction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("No reference data: similarity fallback requires at least one labeled example")]
    NoReferenceData,
}

impl PredictionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PredictionError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading or validating the engine configuration.
///
/// Every variant is fatal: an engine is never built from a configuration
/// that produced one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unsupported configuration version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid coefficient: {field} = {value}. Must be finite")]
    InvalidCoefficient { field: String, value: f64 },

    #[error("Invalid bounds: min {min} must be non-negative, finite, at most two decimals and below max {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Invalid similarity setting: {field} = {value}. {reason}")]
    InvalidSimilarity {
        field: String,
        value: f64,
        reason: String,
    },

    #[error("Invalid range in {rule}.{field}: {reason}")]
    InvalidRange {
        rule: String,
        field: String,
        reason: String,
    },

    #[error("Invalid adjustment in {rule}: {reason}")]
    InvalidAdjustment { rule: String, reason: String },

    #[error("Invalid formula variant in {rule}: {reason}")]
    InvalidVariant { rule: String, reason: String },

    #[error("Rule names must be non-empty")]
    EmptyRuleName,

    #[error("Duplicate rule name: {name}")]
    DuplicateRuleName { name: String },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}
