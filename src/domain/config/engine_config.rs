//! Engine Configuration Value Object
//!
//! `EngineConfig` is the versioned configuration artifact of the prediction
//! engine: base coefficients, clamp bounds, fallback settings, the ordered
//! rule table and the edge regions that route to the fallback.

use super::bounds::{AmountBounds, Bounds};
use super::coefficients::{BaseCoefficients, SimilarityConfig};
use crate::domain::errors::ConfigurationError;
use crate::domain::rules::{
    Adjustment, CombinationRule, Criteria, DurationRule, EdgeRegion, EfficiencyClass,
    EfficiencyRule, FormulaVariant, Range, Rule, VariantRule,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version this build understands.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration
///
/// # Invariants (checked by [`EngineConfig::validate`])
///
/// - `version == CONFIG_VERSION`
/// - coefficients finite, bounds non-negative cents with `min < max`
/// - similarity `k >= 1`, scales and epsilon positive
/// - every rule and edge region well-formed, names unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub version: u32,
    pub coefficients: BaseCoefficients,
    pub bounds: AmountBounds,
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub edge_cases: Vec<EdgeRegion>,
}

impl EngineConfig {
    /// Validates every section and returns the checked clamp bounds.
    pub fn validate(&self) -> Result<Bounds, ConfigurationError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigurationError::UnsupportedVersion {
                found: self.version,
                supported: CONFIG_VERSION,
            });
        }

        self.coefficients.validate()?;
        let bounds = Bounds::try_from(self.bounds)?;
        self.similarity.validate()?;

        let mut names = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !names.insert(rule.name()) {
                return Err(ConfigurationError::DuplicateRuleName {
                    name: rule.name().to_string(),
                });
            }
        }

        let mut region_names = HashSet::new();
        for region in &self.edge_cases {
            region.validate()?;
            if !region_names.insert(region.name.as_str()) {
                return Err(ConfigurationError::DuplicateRuleName {
                    name: region.name.clone(),
                });
            }
        }

        Ok(bounds)
    }

    pub fn with_coefficients(mut self, coefficients: BaseCoefficients) -> Self {
        self.coefficients = coefficients;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            coefficients: BaseCoefficients::default(),
            bounds: AmountBounds::default(),
            similarity: SimilarityConfig::default(),
            rules: default_rules(),
            edge_cases: default_edge_cases(),
        }
    }
}

fn variant(name: &str, when: Criteria, formula: FormulaVariant) -> Rule {
    Rule::Variant(VariantRule {
        name: name.to_string(),
        when,
        formula,
    })
}

fn combination(name: &str, when: Criteria, adjustment: Adjustment) -> Rule {
    Rule::Combination(CombinationRule {
        name: name.to_string(),
        when,
        adjustment,
    })
}

fn duration(name: &str, days: Range, adjustment: Adjustment) -> Rule {
    Rule::Duration(DurationRule {
        name: name.to_string(),
        days,
        adjustment,
    })
}

fn efficiency(
    name: &str,
    class: EfficiencyClass,
    miles_per_day: Range,
    receipts_per_day: Range,
    adjustment: Adjustment,
) -> Rule {
    Rule::Efficiency(EfficiencyRule {
        name: name.to_string(),
        class,
        miles_per_day,
        receipts_per_day,
        adjustment,
    })
}

/// Built-in rule table. Mirrors `config/engine.toml`.
pub fn default_rules() -> Vec<Rule> {
    let when = Criteria::default;
    vec![
        variant(
            "inefficient_traveler",
            when()
                .miles_per_day(Range::below(75.0))
                .receipts_per_day(Range::above(220.0)),
            FormulaVariant::SpendingPenalty {
                threshold_per_day: 200.0,
                rate: 1.5,
                mileage_floor: 50.0,
                mileage_rate: 5.0,
            },
        ),
        variant(
            "efficient_traveler",
            when()
                .miles_per_day(Range::above(400.0))
                .receipts_per_day(Range::below(100.0)),
            FormulaVariant::MileageBonus { rate: 0.2 },
        ),
        combination(
            "sweet_spot_combo",
            when()
                .days(Range::exactly(5.0))
                .miles_per_day(Range::at_least(180.0))
                .receipts_per_day(Range::below(100.0)),
            Adjustment::Multiply(1.15),
        ),
        combination(
            "seven_day_high_mileage",
            when().days(Range::exactly(7.0)).miles(Range::above(1000.0)),
            Adjustment::Multiply(1.35),
        ),
        combination(
            "one_day_moderate_overspend",
            when()
                .days(Range::exactly(1.0))
                .receipts(Range::half_open(300.0, 1000.0)),
            Adjustment::Multiply(0.35),
        ),
        combination(
            "one_day_extreme_overspend",
            when()
                .days(Range::exactly(1.0))
                .receipts(Range::at_least(1000.0)),
            Adjustment::Multiply(0.75),
        ),
        combination(
            "one_day_long_haul",
            when()
                .days(Range::exactly(1.0))
                .miles(Range::above(700.0))
                .receipts(Range::below(300.0)),
            Adjustment::Multiply(0.9),
        ),
        combination(
            "long_trip_high_spending",
            when()
                .days(Range::at_least(12.0))
                .receipts_per_day(Range::above(150.0)),
            Adjustment::Multiply(0.5),
        ),
        combination(
            "long_trip_moderate_spending",
            when()
                .days(Range::at_least(12.0))
                .receipts_per_day(Range::between(100.0, 150.0)),
            Adjustment::Multiply(0.75),
        ),
        combination(
            "medium_trip_very_high_spending",
            when()
                .days(Range::between(8.0, 11.0))
                .receipts_per_day(Range::above(170.0)),
            Adjustment::Multiply(0.7),
        ),
        duration(
            "five_day_bonus",
            Range::exactly(5.0),
            Adjustment::Multiply(1.18),
        ),
        duration(
            "six_day_bonus",
            Range::exactly(6.0),
            Adjustment::Multiply(1.17),
        ),
        efficiency(
            "low_mileage_high_spending",
            EfficiencyClass::Inefficient,
            Range::below(75.0),
            Range::above(280.0),
            Adjustment::Multiply(0.8),
        ),
        efficiency(
            "efficiency_sweet_spot",
            EfficiencyClass::Efficient,
            Range::between(180.0, 220.0),
            Range::below(100.0),
            Adjustment::Multiply(1.05),
        ),
    ]
}

/// Built-in edge regions. Mirrors `config/engine.toml`.
pub fn default_edge_cases() -> Vec<EdgeRegion> {
    let when = Criteria::default;
    vec![
        EdgeRegion::new(
            "long_trip_high_spending",
            when()
                .days(Range::at_least(7.0))
                .receipts_per_day(Range::above(150.0)),
        ),
        EdgeRegion::new(
            "short_trip_very_high_mileage",
            when().days(Range::at_most(2.0)).miles(Range::above(800.0)),
        ),
        EdgeRegion::new(
            "high_receipts_short_trip",
            when()
                .days(Range::at_most(5.0))
                .receipts(Range::above(1800.0)),
        ),
        EdgeRegion::new(
            "long_trip_high_mileage",
            when().days(Range::at_least(8.0)).miles(Range::above(700.0)),
        ),
    ]
}
