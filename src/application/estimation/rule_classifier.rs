use crate::domain::config::{BaseCoefficients, Bounds, EngineConfig};
use crate::domain::errors::ConfigurationError;
use crate::domain::prediction::{FiredRule, RuleTrace};
use crate::domain::rules::{EdgeRegion, FormulaVariant, Rule, RuleCategory};
use crate::domain::trip::{DerivedFeatures, TripInput};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Output of the rule path.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEstimate {
    /// Clamped and rounded rule-path amount.
    pub amount: Decimal,
    /// Whether the caller should prefer the similarity fallback.
    pub is_edge_case: bool,
    pub trace: RuleTrace,
}

/// Rule Classifier & Base Estimator
///
/// Interprets the ordered rule table against one trip:
/// - **Variant** rules pick the base formula (first match, default linear)
/// - **Combination** rules are checked next; a match applies its adjustment
///   and suppresses the generic brackets
/// - otherwise one **Duration** bracket, then one **Efficiency** bracket,
///   each applied to the running amount
///
/// Edge regions are evaluated independently and never change the amount.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    coefficients: BaseCoefficients,
    bounds: Bounds,
    rules: Arc<[Rule]>,
    edge_cases: Arc<[EdgeRegion]>,
}

impl RuleClassifier {
    pub fn new(
        coefficients: BaseCoefficients,
        bounds: Bounds,
        rules: Vec<Rule>,
        edge_cases: Vec<EdgeRegion>,
    ) -> Self {
        Self {
            coefficients,
            bounds,
            rules: rules.into(),
            edge_cases: edge_cases.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigurationError> {
        let bounds = config.validate()?;
        Ok(Self::new(
            config.coefficients,
            bounds,
            config.rules.clone(),
            config.edge_cases.clone(),
        ))
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn coefficients(&self) -> &BaseCoefficients {
        &self.coefficients
    }

    pub fn estimate_base(&self, input: &TripInput, features: &DerivedFeatures) -> BaseEstimate {
        let (formula, formula_rule) = match self.first_match(RuleCategory::Variant, input, features)
        {
            Some(Rule::Variant(rule)) => (rule.formula, Some(rule.name.clone())),
            _ => (FormulaVariant::Linear, None),
        };
        let mut amount = formula.evaluate(&self.coefficients, input, features);
        let mut fired = Vec::new();

        if let Some(rule) = self.first_match(RuleCategory::Combination, input, features) {
            amount = Self::interpret(rule, amount, &mut fired);
        } else {
            for category in [RuleCategory::Duration, RuleCategory::Efficiency] {
                if let Some(rule) = self.first_match(category, input, features) {
                    amount = Self::interpret(rule, amount, &mut fired);
                }
            }
        }

        let edge_region = self.edge_region(input, features);
        if let Some(region) = edge_region {
            debug!(
                "Trip ({} d, {} mi, ${}) falls in edge region '{}'",
                input.days(),
                input.miles(),
                input.receipts(),
                region.name
            );
        }

        BaseEstimate {
            amount: self.bounds.apply_f64(amount),
            is_edge_case: edge_region.is_some(),
            trace: RuleTrace {
                formula: formula.label(),
                formula_rule,
                fired,
                raw_amount: amount,
                edge_region: edge_region.map(|r| r.name.clone()),
            },
        }
    }

    /// First rule of `category` whose predicate holds, in table order.
    pub fn first_match(
        &self,
        category: RuleCategory,
        input: &TripInput,
        features: &DerivedFeatures,
    ) -> Option<&Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.category() == category)
            .find(|rule| rule.matches(input, features))
    }

    pub fn edge_region(
        &self,
        input: &TripInput,
        features: &DerivedFeatures,
    ) -> Option<&EdgeRegion> {
        self.edge_cases
            .iter()
            .find(|region| region.when.matches(input, features))
    }

    pub fn is_edge_case(&self, input: &TripInput, features: &DerivedFeatures) -> bool {
        self.edge_region(input, features).is_some()
    }

    /// Applies one rule's effect to the running amount and records it.
    fn interpret(rule: &Rule, amount: f64, fired: &mut Vec<FiredRule>) -> f64 {
        let adjustment = rule.adjustment();
        let adjusted = adjustment.map_or(amount, |adj| adj.apply(amount));
        debug!(
            "Rule '{}' ({}) fired: {:.2} -> {:.2}",
            rule.name(),
            rule.category(),
            amount,
            adjusted
        );
        fired.push(FiredRule {
            name: rule.name().to_string(),
            category: rule.category(),
            adjustment,
        });
        adjusted
    }
}
