// Engine configuration value objects
pub mod config;

// Domain-specific error types
pub mod errors;

// Prediction outputs and explanations
pub mod prediction;

// Tagged rule table
pub mod rules;

// Trip inputs and labeled examples
pub mod trip;
