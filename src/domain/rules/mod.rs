mod criteria;
mod rule;

pub use criteria::{Criteria, Range};
pub use rule::{
    Adjustment, CombinationRule, DurationRule, EdgeRegion, EfficiencyClass, EfficiencyRule,
    FormulaVariant, Rule, RuleCategory, VariantRule,
};
