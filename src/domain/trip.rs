//! Trip value objects: the raw inputs of a reimbursement claim, the per-day
//! ratios derived from them, and the labeled historical examples.

use crate::domain::errors::PredictionError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single reimbursement claim.
///
/// # Invariants
///
/// - `days >= 1`
/// - `miles` and `receipts` are finite and `>= 0.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripInput {
    days: u32,
    miles: f64,
    receipts: f64,
}

impl TripInput {
    pub fn new(days: i64, miles: f64, receipts: f64) -> Result<Self, PredictionError> {
        if days < 1 {
            return Err(PredictionError::invalid(format!(
                "trip duration must be at least 1 day, got {}",
                days
            )));
        }
        let days = u32::try_from(days).map_err(|_| {
            PredictionError::invalid(format!("trip duration {} days is out of range", days))
        })?;
        Self::check_amount("miles", miles)?;
        Self::check_amount("receipts", receipts)?;

        Ok(Self {
            days,
            miles,
            receipts,
        })
    }

    fn check_amount(field: &str, value: f64) -> Result<(), PredictionError> {
        if !value.is_finite() {
            return Err(PredictionError::invalid(format!(
                "{} must be a finite number, got {}",
                field, value
            )));
        }
        if value < 0.0 {
            return Err(PredictionError::invalid(format!(
                "{} must be non-negative, got {}",
                field, value
            )));
        }
        Ok(())
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn miles(&self) -> f64 {
        self.miles
    }

    pub fn receipts(&self) -> f64 {
        self.receipts
    }

    /// Computes the per-day ratios. `days >= 1` holds by construction, so the
    /// divisions are always defined.
    pub fn derive(&self) -> DerivedFeatures {
        let days = f64::from(self.days);
        DerivedFeatures {
            miles_per_day: self.miles / days,
            receipts_per_day: self.receipts / days,
        }
    }
}

/// Per-day ratios, exact divisions with no rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub miles_per_day: f64,
    pub receipts_per_day: f64,
}

/// A historical claim with the amount the legacy system actually paid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabeledExample {
    pub input: TripInput,
    pub observed: f64,
}

impl LabeledExample {
    pub fn new(input: TripInput, observed: f64) -> Result<Self, PredictionError> {
        if !observed.is_finite() {
            return Err(PredictionError::invalid(format!(
                "observed amount must be finite, got {}",
                observed
            )));
        }
        Ok(Self { input, observed })
    }
}

/// The read-only labeled example set, in the order it was loaded.
///
/// Cloning is cheap: the examples live behind an `Arc` and are never mutated.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    examples: Arc<[LabeledExample]>,
}

impl ReferenceSet {
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Self {
            examples: examples.into(),
        }
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledExample> {
        self.examples.iter()
    }
}

impl From<Vec<LabeledExample>> for ReferenceSet {
    fn from(examples: Vec<LabeledExample>) -> Self {
        Self::new(examples)
    }
}

/// Raw trip fields exactly as they appear in the reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_duration_days: i64,
    pub miles_traveled: f64,
    pub total_receipts_amount: f64,
}

impl TryFrom<TripRecord> for TripInput {
    type Error = PredictionError;

    fn try_from(record: TripRecord) -> Result<Self, Self::Error> {
        TripInput::new(
            record.trip_duration_days,
            record.miles_traveled,
            record.total_receipts_amount,
        )
    }
}

impl From<&TripInput> for TripRecord {
    fn from(input: &TripInput) -> Self {
        Self {
            trip_duration_days: i64::from(input.days),
            miles_traveled: input.miles,
            total_receipts_amount: input.receipts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_exact_ratios() {
        let trip = TripInput::new(5, 900.0, 400.0).unwrap();
        let features = trip.derive();
        assert_eq!(features.miles_per_day, 180.0);
        assert_eq!(features.receipts_per_day, 80.0);
    }

    #[test]
    fn test_derive_does_not_round() {
        let trip = TripInput::new(3, 100.0, 10.0).unwrap();
        let features = trip.derive();
        assert_eq!(features.miles_per_day, 100.0 / 3.0);
        assert_eq!(features.receipts_per_day, 10.0 / 3.0);
    }

    #[test]
    fn test_rejects_zero_and_negative_days() {
        for days in [0, -1, -30] {
            let err = TripInput::new(days, 10.0, 10.0).unwrap_err();
            assert!(matches!(err, PredictionError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_rejects_negative_and_non_finite_amounts() {
        assert!(TripInput::new(1, -0.5, 0.0).is_err());
        assert!(TripInput::new(1, 0.0, -12.0).is_err());
        assert!(TripInput::new(1, f64::NAN, 0.0).is_err());
        assert!(TripInput::new(1, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_days_beyond_u32() {
        assert!(TripInput::new(i64::from(u32::MAX) + 1, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_record_conversion_validates() {
        let record = TripRecord {
            trip_duration_days: 0,
            miles_traveled: 10.0,
            total_receipts_amount: 5.0,
        };
        assert!(TripInput::try_from(record).is_err());

        let record = TripRecord {
            trip_duration_days: 3,
            miles_traveled: 93.0,
            total_receipts_amount: 1.42,
        };
        let trip = TripInput::try_from(record).unwrap();
        assert_eq!(trip.days(), 3);
        assert_eq!(TripRecord::from(&trip), record);
    }

    #[test]
    fn test_reference_set_keeps_order() {
        let examples = vec![
            LabeledExample::new(TripInput::new(2, 10.0, 1.0).unwrap(), 100.0).unwrap(),
            LabeledExample::new(TripInput::new(1, 20.0, 2.0).unwrap(), 200.0).unwrap(),
        ];
        let set = ReferenceSet::new(examples);
        let observed: Vec<f64> = set.iter().map(|e| e.observed).collect();
        assert_eq!(observed, vec![100.0, 200.0]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }
}
