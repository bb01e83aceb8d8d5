//! Numeric brackets and the conjunctive predicates built from them.

use crate::domain::errors::ConfigurationError;
use crate::domain::trip::{DerivedFeatures, TripInput};
use serde::{Deserialize, Serialize};

/// A bracket over one numeric dimension.
///
/// Each side is optional and may be strict (`above` / `below`) or inclusive
/// (`at_least` / `at_most`), which lets the configuration say `days >= 7`
/// and `receipts_per_day > 150` in the same vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_least: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_most: Option<f64>,
}

impl Range {
    pub fn above(value: f64) -> Self {
        Self {
            above: Some(value),
            ..Self::default()
        }
    }

    pub fn at_least(value: f64) -> Self {
        Self {
            at_least: Some(value),
            ..Self::default()
        }
    }

    pub fn below(value: f64) -> Self {
        Self {
            below: Some(value),
            ..Self::default()
        }
    }

    pub fn at_most(value: f64) -> Self {
        Self {
            at_most: Some(value),
            ..Self::default()
        }
    }

    /// Inclusive on both ends.
    pub fn between(low: f64, high: f64) -> Self {
        Self {
            at_least: Some(low),
            at_most: Some(high),
            ..Self::default()
        }
    }

    pub fn exactly(value: f64) -> Self {
        Self::between(value, value)
    }

    /// Inclusive lower bound, exclusive upper bound.
    pub fn half_open(low: f64, high: f64) -> Self {
        Self {
            at_least: Some(low),
            below: Some(high),
            ..Self::default()
        }
    }

    pub fn with_below(mut self, value: f64) -> Self {
        self.below = Some(value);
        self
    }

    pub fn with_at_most(mut self, value: f64) -> Self {
        self.at_most = Some(value);
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        self.above.is_none_or(|b| value > b)
            && self.at_least.is_none_or(|b| value >= b)
            && self.below.is_none_or(|b| value < b)
            && self.at_most.is_none_or(|b| value <= b)
    }

    pub fn is_unbounded(&self) -> bool {
        self.above.is_none()
            && self.at_least.is_none()
            && self.below.is_none()
            && self.at_most.is_none()
    }

    pub fn validate(&self, rule: &str, field: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidRange {
            rule: rule.to_string(),
            field: field.to_string(),
            reason,
        };

        for (side, bound) in [
            ("above", self.above),
            ("at_least", self.at_least),
            ("below", self.below),
            ("at_most", self.at_most),
        ] {
            if let Some(value) = bound.filter(|v| !v.is_finite()) {
                return Err(invalid(format!("{} bound {} is not finite", side, value)));
            }
        }

        if self.above.is_some() && self.at_least.is_some() {
            return Err(invalid("both 'above' and 'at_least' are set".to_string()));
        }
        if self.below.is_some() && self.at_most.is_some() {
            return Err(invalid("both 'below' and 'at_most' are set".to_string()));
        }
        if self.is_unbounded() {
            return Err(invalid("bracket has no bounds".to_string()));
        }

        let lower = self.above.or(self.at_least);
        let upper = self.below.or(self.at_most);
        if let (Some(low), Some(high)) = (lower, upper) {
            let both_inclusive = self.at_least.is_some() && self.at_most.is_some();
            let empty = if both_inclusive {
                low > high
            } else {
                low >= high
            };
            if empty {
                return Err(invalid(format!(
                    "bracket between {} and {} can never match",
                    low, high
                )));
            }
        }

        Ok(())
    }
}

/// Conjunction of brackets over the raw inputs and the derived ratios.
/// Dimensions left as `None` are unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Criteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles_per_day: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipts_per_day: Option<Range>,
}

impl Criteria {
    pub fn days(mut self, range: Range) -> Self {
        self.days = Some(range);
        self
    }

    pub fn miles(mut self, range: Range) -> Self {
        self.miles = Some(range);
        self
    }

    pub fn receipts(mut self, range: Range) -> Self {
        self.receipts = Some(range);
        self
    }

    pub fn miles_per_day(mut self, range: Range) -> Self {
        self.miles_per_day = Some(range);
        self
    }

    pub fn receipts_per_day(mut self, range: Range) -> Self {
        self.receipts_per_day = Some(range);
        self
    }

    pub fn matches(&self, input: &TripInput, features: &DerivedFeatures) -> bool {
        let check = |range: &Option<Range>, value: f64| range.is_none_or(|r| r.contains(value));

        check(&self.days, f64::from(input.days()))
            && check(&self.miles, input.miles())
            && check(&self.receipts, input.receipts())
            && check(&self.miles_per_day, features.miles_per_day)
            && check(&self.receipts_per_day, features.receipts_per_day)
    }

    pub fn validate(&self, rule: &str) -> Result<(), ConfigurationError> {
        let dimensions = [
            ("days", &self.days),
            ("miles", &self.miles),
            ("receipts", &self.receipts),
            ("miles_per_day", &self.miles_per_day),
            ("receipts_per_day", &self.receipts_per_day),
        ];

        if dimensions.iter().all(|(_, range)| range.is_none()) {
            return Err(ConfigurationError::InvalidRange {
                rule: rule.to_string(),
                field: "when".to_string(),
                reason: "predicate constrains no dimension".to_string(),
            });
        }

        for (field, range) in dimensions {
            if let Some(range) = range {
                range.validate(rule, field)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(days: i64, miles: f64, receipts: f64) -> (TripInput, DerivedFeatures) {
        let input = TripInput::new(days, miles, receipts).unwrap();
        (input, input.derive())
    }

    #[test]
    fn test_range_strict_and_inclusive_edges() {
        assert!(!Range::above(150.0).contains(150.0));
        assert!(Range::above(150.0).contains(150.01));
        assert!(Range::at_least(7.0).contains(7.0));
        assert!(!Range::below(100.0).contains(100.0));
        assert!(Range::at_most(2.0).contains(2.0));
        assert!(Range::exactly(5.0).contains(5.0));
        assert!(!Range::exactly(5.0).contains(6.0));
        assert!(Range::half_open(300.0, 1000.0).contains(300.0));
        assert!(!Range::half_open(300.0, 1000.0).contains(1000.0));
    }

    #[test]
    fn test_range_validation() {
        assert!(Range::between(180.0, 220.0).validate("r", "f").is_ok());
        assert!(Range::exactly(5.0).validate("r", "f").is_ok());
        assert!(Range::default().validate("r", "f").is_err());
        assert!(Range::between(220.0, 180.0).validate("r", "f").is_err());
        assert!(Range::above(5.0).with_below(5.0).validate("r", "f").is_err());
        assert!(Range::above(f64::NAN).validate("r", "f").is_err());

        let conflicting = Range {
            above: Some(1.0),
            at_least: Some(2.0),
            ..Range::default()
        };
        assert!(conflicting.validate("r", "f").is_err());
    }

    #[test]
    fn test_criteria_is_a_conjunction() {
        let sweet_spot = Criteria::default()
            .days(Range::exactly(5.0))
            .miles_per_day(Range::at_least(180.0))
            .receipts_per_day(Range::below(100.0));

        let (input, features) = trip(5, 900.0, 400.0);
        assert!(sweet_spot.matches(&input, &features));

        let (input, features) = trip(5, 900.0, 600.0);
        assert!(!sweet_spot.matches(&input, &features));

        let (input, features) = trip(4, 900.0, 100.0);
        assert!(!sweet_spot.matches(&input, &features));
    }

    #[test]
    fn test_criteria_without_dimensions_is_rejected() {
        let err = Criteria::default().validate("catch_all").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRange { .. }));
    }

    #[test]
    fn test_criteria_toml_shape() {
        let criteria: Criteria = toml::from_str(
            r#"
            days = { at_least = 7 }
            receipts_per_day = { above = 150.0 }
            "#,
        )
        .unwrap();
        assert_eq!(criteria.days, Some(Range::at_least(7.0)));
        assert_eq!(criteria.receipts_per_day, Some(Range::above(150.0)));
        assert!(criteria.miles.is_none());
    }
}
