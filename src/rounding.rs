//! # Display Rounding Policy
//!
//! Scaled quantities are rounded to a kitchen-friendly precision before they
//! are shown. The table is a named value ([`RoundingPolicy::kitchen`]) that
//! can be replaced at runtime from a JSON file, for example:
//!
//! ```json
//! {
//!   "count":  { "mode": "nearest", "step": "0.5" },
//!   "metric": { "mode": "threshold", "above": "10",
//!               "coarse": { "mode": "decimals", "places": 0 },
//!               "fine":   { "mode": "decimals", "places": 1 } },
//!   "bulk":   { "mode": "decimals", "places": 2 },
//!   "spoon":  { "mode": "nearest", "step": "0.5" },
//!   "other":  { "mode": "decimals", "places": 2 }
//! }
//! ```

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;
use crate::unit_normalizer::{normalize, UnitClass};

/// Precision a positive value falls back to when its rule would round it to zero
const NONZERO_FALLBACK_PLACES: i64 = 2;

/// How to round one class of units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RoundingRule {
    /// Round to the nearest multiple of `step` (e.g. 0.5)
    Nearest { step: BigDecimal },
    /// Keep `places` decimal places
    Decimals { places: i64 },
    /// Use `coarse` when the absolute value is above `above`, `fine` otherwise
    Threshold {
        above: BigDecimal,
        coarse: Box<RoundingRule>,
        fine: Box<RoundingRule>,
    },
}

/// Rounding rules per unit class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// Pieces and dimensionless counts
    pub count: RoundingRule,
    /// Grams and milliliters
    pub metric: RoundingRule,
    /// Kilograms and liters
    pub bulk: RoundingRule,
    /// Teaspoons and tablespoons
    pub spoon: RoundingRule,
    /// Unrecognized units
    pub other: RoundingRule,
}

impl RoundingRule {
    /// Apply this rule (half-up) to a value
    pub fn apply(&self, value: &BigDecimal) -> BigDecimal {
        match self {
            RoundingRule::Nearest { step } => {
                if step <= &BigDecimal::zero() {
                    return value.clone();
                }
                let steps = (value / step).with_scale_round(0, RoundingMode::HalfUp);
                &steps * step
            }
            RoundingRule::Decimals { places } => {
                value.with_scale_round(*places, RoundingMode::HalfUp)
            }
            RoundingRule::Threshold {
                above,
                coarse,
                fine,
            } => {
                if &value.abs() > above {
                    coarse.apply(value)
                } else {
                    fine.apply(value)
                }
            }
        }
    }
}

impl RoundingPolicy {
    /// Default kitchen policy:
    ///
    /// | class | rule |
    /// |---|---|
    /// | count | nearest 0.5 |
    /// | metric (g, ml) | whole above 10, one decimal otherwise |
    /// | bulk (kg, l) | two decimals |
    /// | spoon (tsp, tbsp) | nearest 0.5 |
    /// | other | two decimals |
    pub fn kitchen() -> Self {
        let half = BigDecimal::new(5.into(), 1);
        Self {
            count: RoundingRule::Nearest { step: half.clone() },
            metric: RoundingRule::Threshold {
                above: BigDecimal::from(10),
                coarse: Box::new(RoundingRule::Decimals { places: 0 }),
                fine: Box::new(RoundingRule::Decimals { places: 1 }),
            },
            bulk: RoundingRule::Decimals { places: 2 },
            spoon: RoundingRule::Nearest { step: half },
            other: RoundingRule::Decimals { places: 2 },
        }
    }

    /// Load a policy from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn rule_for(&self, class: UnitClass) -> &RoundingRule {
        match class {
            UnitClass::Count => &self.count,
            UnitClass::Metric => &self.metric,
            UnitClass::Bulk => &self.bulk,
            UnitClass::Spoon => &self.spoon,
            UnitClass::Other => &self.other,
        }
    }

    /// Round a scaled value for display, choosing the rule from the unit
    ///
    /// A positive value never rounds down to zero.
    pub fn round(&self, value: &BigDecimal, unit: &str) -> BigDecimal {
        let rounded = self.rule_for(normalize(unit).class()).apply(value);
        if rounded.is_zero() && !value.is_zero() {
            return value.with_scale_round(NONZERO_FALLBACK_PLACES, RoundingMode::HalfUp);
        }
        rounded
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self::kitchen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn test_nearest_half() {
        let rule = RoundingRule::Nearest { step: dec("0.5") };
        assert_eq!(rule.apply(&dec("1.5")), dec("1.5"));
        assert_eq!(rule.apply(&dec("1.3")), dec("1.5"));
        assert_eq!(rule.apply(&dec("1.2")), dec("1"));
        assert_eq!(rule.apply(&dec("1.75")), dec("2"));
    }

    #[test]
    fn test_metric_threshold() {
        let policy = RoundingPolicy::kitchen();
        assert_eq!(policy.round(&dec("133.333"), "g"), dec("133"));
        assert_eq!(policy.round(&dec("7.45"), "ml"), dec("7.5"));
        assert_eq!(policy.round(&dec("10"), "g"), dec("10"));
        assert_eq!(policy.round(&dec("10.5"), "g"), dec("11"));
    }

    #[test]
    fn test_bulk_and_other_keep_two_decimals() {
        let policy = RoundingPolicy::kitchen();
        assert_eq!(policy.round(&dec("0.3333"), "kg"), dec("0.33"));
        assert_eq!(policy.round(&dec("1.005"), "Prise"), dec("1.01"));
    }

    #[test]
    fn test_positive_value_never_rounds_to_zero() {
        let policy = RoundingPolicy::kitchen();
        assert_eq!(policy.round(&dec("0.125"), "TL"), dec("0.13"));
        assert_eq!(policy.round(&dec("0.2"), ""), dec("0.2"));
    }

    #[test]
    fn test_policy_from_json() {
        let json = r#"{
            "count":  { "mode": "nearest", "step": "1" },
            "metric": { "mode": "decimals", "places": 0 },
            "bulk":   { "mode": "decimals", "places": 1 },
            "spoon":  { "mode": "nearest", "step": "0.25" },
            "other":  { "mode": "decimals", "places": 2 }
        }"#;
        let policy: RoundingPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.round(&dec("1.4"), "Stück"), dec("1"));
        assert_eq!(policy.round(&dec("0.3"), "EL"), dec("0.25"));
    }
}
