use crate::domain::errors::ConfigurationError;
use crate::domain::trip::TripInput;
use serde::{Deserialize, Serialize};

/// Coefficients of the linear base formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseCoefficients {
    pub days: f64,
    pub miles: f64,
    pub receipts: f64,
    pub intercept: f64,
}

impl Default for BaseCoefficients {
    fn default() -> Self {
        Self {
            days: 50.0,
            miles: 0.45,
            receipts: 0.38,
            intercept: 270.0,
        }
    }
}

impl BaseCoefficients {
    pub fn linear(&self, input: &TripInput) -> f64 {
        self.days * f64::from(input.days())
            + self.miles * input.miles()
            + self.receipts * input.receipts()
            + self.intercept
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("days", self.days),
            ("miles", self.miles),
            ("receipts", self.receipts),
            ("intercept", self.intercept),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::InvalidCoefficient {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Settings of the nearest-neighbor fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub k: usize,
    pub days_scale: f64,
    pub miles_scale: f64,
    pub receipts_scale: f64,
    pub epsilon: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            k: 5,
            days_scale: 15.0,
            miles_scale: 0.8,
            receipts_scale: 1.2,
            epsilon: 0.001,
        }
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.k == 0 {
            return Err(ConfigurationError::InvalidSimilarity {
                field: "k".to_string(),
                value: 0.0,
                reason: "Must be >= 1".to_string(),
            });
        }

        for (field, value) in [
            ("days_scale", self.days_scale),
            ("miles_scale", self.miles_scale),
            ("receipts_scale", self.receipts_scale),
            ("epsilon", self.epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::InvalidSimilarity {
                    field: field.to_string(),
                    value,
                    reason: "Must be finite and positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_formula() {
        let coefficients = BaseCoefficients::default();
        let trip = TripInput::new(5, 900.0, 400.0).unwrap();
        // 250 + 405 + 152 + 270
        assert!((coefficients.linear(&trip) - 1077.0).abs() < 1e-9);
    }

    #[test]
    fn test_coefficients_reject_non_finite() {
        let coefficients = BaseCoefficients {
            miles: f64::NAN,
            ..BaseCoefficients::default()
        };
        let err = coefficients.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidCoefficient { ref field, .. } if field == "miles"
        ));
    }

    #[test]
    fn test_similarity_validation() {
        assert!(SimilarityConfig::default().validate().is_ok());

        let zero_k = SimilarityConfig {
            k: 0,
            ..SimilarityConfig::default()
        };
        assert!(zero_k.validate().is_err());

        let zero_epsilon = SimilarityConfig {
            epsilon: 0.0,
            ..SimilarityConfig::default()
        };
        assert!(zero_epsilon.validate().is_err());
    }
}
