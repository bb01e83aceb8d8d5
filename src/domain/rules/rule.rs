//! Tagged rule variants.
//!
//! Every rule carries its predicate and its effect as plain data. The rule
//! classifier interprets them; nothing here is evaluated by name.

use super::criteria::{Criteria, Range};
use crate::domain::config::BaseCoefficients;
use crate::domain::errors::ConfigurationError;
use crate::domain::trip::{DerivedFeatures, TripInput};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Effect of an adjustment rule on the running amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Multiply(f64),
    Add(f64),
}

impl Adjustment {
    pub fn apply(&self, amount: f64) -> f64 {
        match self {
            Adjustment::Multiply(factor) => amount * factor,
            Adjustment::Add(offset) => amount + offset,
        }
    }

    fn validate(&self, rule: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidAdjustment {
            rule: rule.to_string(),
            reason,
        };
        match *self {
            Adjustment::Multiply(factor) if !factor.is_finite() || factor <= 0.0 => Err(invalid(
                format!("multiplier must be finite and positive, got {}", factor),
            )),
            Adjustment::Add(offset) if !offset.is_finite() => {
                Err(invalid(format!("offset must be finite, got {}", offset)))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Multiply(factor) => write!(f, "x{}", factor),
            Adjustment::Add(offset) => write!(f, "{:+}", offset),
        }
    }
}

/// Base formula selected before the adjustment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaVariant {
    /// `C_days*days + C_miles*miles + C_receipts*receipts + C_intercept`
    #[default]
    Linear,
    /// Linear formula minus a per-day charge on spending above
    /// `threshold_per_day`, and minus a flat charge for every mile/day under
    /// `mileage_floor`.
    SpendingPenalty {
        threshold_per_day: f64,
        rate: f64,
        mileage_floor: f64,
        mileage_rate: f64,
    },
    /// Linear formula with the mileage term scaled up by `1 + rate`.
    MileageBonus { rate: f64 },
}

impl FormulaVariant {
    pub fn evaluate(
        &self,
        coefficients: &BaseCoefficients,
        input: &TripInput,
        features: &DerivedFeatures,
    ) -> f64 {
        let linear = coefficients.linear(input);
        match *self {
            FormulaVariant::Linear => linear,
            FormulaVariant::SpendingPenalty {
                threshold_per_day,
                rate,
                mileage_floor,
                mileage_rate,
            } => {
                let excess = (features.receipts_per_day - threshold_per_day).max(0.0);
                let spending_penalty = excess * rate * f64::from(input.days());
                let mileage_penalty = if features.miles_per_day < mileage_floor {
                    (mileage_floor - features.miles_per_day) * mileage_rate
                } else {
                    0.0
                };
                linear - spending_penalty - mileage_penalty
            }
            FormulaVariant::MileageBonus { rate } => {
                linear + coefficients.miles * input.miles() * rate
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormulaVariant::Linear => "linear",
            FormulaVariant::SpendingPenalty { .. } => "spending_penalty",
            FormulaVariant::MileageBonus { .. } => "mileage_bonus",
        }
    }

    fn validate(&self, rule: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidVariant {
            rule: rule.to_string(),
            reason,
        };
        let fields: Vec<(&str, f64)> = match self {
            FormulaVariant::Linear => vec![],
            FormulaVariant::SpendingPenalty {
                threshold_per_day,
                rate,
                mileage_floor,
                mileage_rate,
            } => vec![
                ("threshold_per_day", *threshold_per_day),
                ("rate", *rate),
                ("mileage_floor", *mileage_floor),
                ("mileage_rate", *mileage_rate),
            ],
            FormulaVariant::MileageBonus { rate } => vec![("rate", *rate)],
        };

        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{} must be finite and non-negative, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Which side of the efficiency/spending trade-off a bracket describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyClass {
    /// Low miles/day with high receipts/day.
    Inefficient,
    /// High miles/day with low receipts/day.
    Efficient,
}

/// Exclusivity group of a rule. Within a category the first matching rule
/// wins; categories are evaluated in the order of the variants below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Variant,
    Combination,
    Duration,
    Efficiency,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleCategory::Variant => "variant",
            RuleCategory::Combination => "combination",
            RuleCategory::Duration => "duration",
            RuleCategory::Efficiency => "efficiency",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRule {
    pub name: String,
    pub when: Criteria,
    pub formula: FormulaVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRule {
    pub name: String,
    pub when: Criteria,
    pub adjustment: Adjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRule {
    pub name: String,
    pub days: Range,
    pub adjustment: Adjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRule {
    pub name: String,
    pub class: EfficiencyClass,
    pub miles_per_day: Range,
    pub receipts_per_day: Range,
    pub adjustment: Adjustment,
}

/// One entry of the ordered rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    Variant(VariantRule),
    Combination(CombinationRule),
    Duration(DurationRule),
    Efficiency(EfficiencyRule),
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::Variant(rule) => &rule.name,
            Rule::Combination(rule) => &rule.name,
            Rule::Duration(rule) => &rule.name,
            Rule::Efficiency(rule) => &rule.name,
        }
    }

    pub fn category(&self) -> RuleCategory {
        match self {
            Rule::Variant(_) => RuleCategory::Variant,
            Rule::Combination(_) => RuleCategory::Combination,
            Rule::Duration(_) => RuleCategory::Duration,
            Rule::Efficiency(_) => RuleCategory::Efficiency,
        }
    }

    pub fn matches(&self, input: &TripInput, features: &DerivedFeatures) -> bool {
        match self {
            Rule::Variant(rule) => rule.when.matches(input, features),
            Rule::Combination(rule) => rule.when.matches(input, features),
            Rule::Duration(rule) => rule.days.contains(f64::from(input.days())),
            Rule::Efficiency(rule) => {
                rule.miles_per_day.contains(features.miles_per_day)
                    && rule.receipts_per_day.contains(features.receipts_per_day)
            }
        }
    }

    /// The adjustment this rule applies, `None` for variant selectors.
    pub fn adjustment(&self) -> Option<Adjustment> {
        match self {
            Rule::Variant(_) => None,
            Rule::Combination(rule) => Some(rule.adjustment),
            Rule::Duration(rule) => Some(rule.adjustment),
            Rule::Efficiency(rule) => Some(rule.adjustment),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyRuleName);
        }
        match self {
            Rule::Variant(rule) => {
                rule.when.validate(name)?;
                rule.formula.validate(name)
            }
            Rule::Combination(rule) => {
                rule.when.validate(name)?;
                rule.adjustment.validate(name)
            }
            Rule::Duration(rule) => {
                rule.days.validate(name, "days")?;
                rule.adjustment.validate(name)
            }
            Rule::Efficiency(rule) => {
                rule.miles_per_day.validate(name, "miles_per_day")?;
                rule.receipts_per_day.validate(name, "receipts_per_day")?;
                rule.adjustment.validate(name)
            }
        }
    }
}

/// An input region where the rule path is known to be unreliable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRegion {
    pub name: String,
    pub when: Criteria,
}

impl EdgeRegion {
    pub fn new(name: &str, when: Criteria) -> Self {
        Self {
            name: name.to_string(),
            when,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyRuleName);
        }
        self.when.validate(&self.name)
    }
}
