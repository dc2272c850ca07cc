//! # Scaling Engine
//!
//! Adjusts ingredient quantities when a recipe is cooked for a different
//! number of servings. Arithmetic is exact decimal (`quantity × target ÷ base`)
//! and only the final value is rounded, using the configured
//! [`RoundingPolicy`]. The engine is a pure function of its inputs: it never
//! touches the database and never writes back to the recipe.
//!
//! ```rust
//! use mealplanner::ingredient_model::{IngredientLine, Quantity};
//! use mealplanner::rounding::RoundingPolicy;
//! use mealplanner::scaling::scale;
//!
//! let lines = vec![IngredientLine::new("Mehl").with_quantity(Quantity::amount(200)).with_unit("g")];
//! let scaled = scale(4, 2, &lines, &RoundingPolicy::kitchen())?;
//! assert_eq!(scaled[0].to_string(), "100 g Mehl");
//! # Ok::<(), mealplanner::errors::ScaleError>(())
//! ```

use bigdecimal::BigDecimal;

use crate::errors::ScaleError;
use crate::ingredient_model::{
    IngredientLine, NewRecipe, Quantity, Recipe, ScaleStatus, ScaledIngredientLine,
};
use crate::rounding::RoundingPolicy;

/// Exact ratio between target and base servings
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactor {
    base: BigDecimal,
    target: BigDecimal,
    identity: bool,
}

impl ScaleFactor {
    /// Build a factor; both serving counts must be positive
    pub fn new(base_servings: u32, target_servings: u32) -> Result<Self, ScaleError> {
        if base_servings == 0 {
            return Err(ScaleError::InvalidRecipeData(
                "base servings must be at least 1".to_string(),
            ));
        }
        if target_servings == 0 {
            return Err(ScaleError::InvalidRecipeData(
                "target servings must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            base: BigDecimal::from(base_servings),
            target: BigDecimal::from(target_servings),
            identity: base_servings == target_servings,
        })
    }

    /// True when target and base servings are equal
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Multiply a value by the factor without rounding
    pub fn apply(&self, value: &BigDecimal) -> BigDecimal {
        (value * &self.target) / &self.base
    }
}

/// Scale ingredient lines from `base_servings` to `target_servings`
///
/// Output has the same length and order as `lines`. Lines without a quantity
/// and lines whose quantity is not a number pass through unchanged with a
/// status telling the caller why. When the serving counts are equal every
/// quantity is returned exactly as given.
pub fn scale(
    base_servings: u32,
    target_servings: u32,
    lines: &[IngredientLine],
    policy: &RoundingPolicy,
) -> Result<Vec<ScaledIngredientLine>, ScaleError> {
    let factor = ScaleFactor::new(base_servings, target_servings)?;
    Ok(lines
        .iter()
        .map(|line| scale_line(line, &factor, policy))
        .collect())
}

fn scale_line(
    line: &IngredientLine,
    factor: &ScaleFactor,
    policy: &RoundingPolicy,
) -> ScaledIngredientLine {
    let quantity = match &line.quantity {
        None => return ScaledIngredientLine::passthrough(line, ScaleStatus::NotScalable),
        Some(Quantity::Unparseable(_)) => {
            return ScaledIngredientLine::passthrough(line, ScaleStatus::UnparseableQuantity)
        }
        Some(quantity) => quantity,
    };

    if factor.is_identity() {
        return ScaledIngredientLine::passthrough(line, ScaleStatus::Scaled);
    }

    let scale_value = |value: &BigDecimal| policy.round(&factor.apply(value), &line.unit);
    let scaled = match quantity {
        Quantity::Amount(value) => Quantity::Amount(scale_value(value)),
        Quantity::Range { min, max } => Quantity::Range {
            min: scale_value(min),
            max: scale_value(max),
        },
        Quantity::Unparseable(text) => Quantity::Unparseable(text.clone()),
    };

    ScaledIngredientLine {
        name: line.name.clone(),
        quantity: Some(scaled),
        unit: line.unit.clone(),
        note: line.note.clone(),
        status: ScaleStatus::Scaled,
    }
}

/// Scaling engine bound to a rounding policy
#[derive(Debug, Clone, Default)]
pub struct ScalingEngine {
    policy: RoundingPolicy,
}

impl ScalingEngine {
    pub fn new(policy: RoundingPolicy) -> Self {
        Self { policy }
    }

    /// See [`scale`]
    pub fn scale(
        &self,
        base_servings: u32,
        target_servings: u32,
        lines: &[IngredientLine],
    ) -> Result<Vec<ScaledIngredientLine>, ScaleError> {
        scale(base_servings, target_servings, lines, &self.policy)
    }

    /// Scale a stored recipe's ingredient lines to `target_servings`
    pub fn scale_recipe(
        &self,
        recipe: &Recipe,
        target_servings: u32,
    ) -> Result<Vec<ScaledIngredientLine>, ScaleError> {
        self.scale(recipe.base_servings, target_servings, &recipe.ingredients)
    }

    /// Rewrite a recipe for `target_servings`
    ///
    /// The scaled (and rounded) quantities become the stored quantities and
    /// `target_servings` the new base servings. Only an explicit user edit
    /// should persist the result.
    pub fn rescale_recipe(
        &self,
        recipe: &Recipe,
        target_servings: u32,
    ) -> Result<NewRecipe, ScaleError> {
        let scaled = self.scale_recipe(recipe, target_servings)?;
        let mut rescaled = recipe.to_new_recipe();
        rescaled.base_servings = target_servings;
        rescaled.ingredients = scaled
            .iter()
            .map(ScaledIngredientLine::to_ingredient_line)
            .collect();
        Ok(rescaled)
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
    fn test_factor_rejects_zero_servings() {
        assert!(matches!(
            ScaleFactor::new(0, 4),
            Err(ScaleError::InvalidRecipeData(_))
        ));
        assert!(matches!(
            ScaleFactor::new(4, 0),
            Err(ScaleError::InvalidRecipeData(_))
        ));
    }

    #[test]
    fn test_factor_is_exact() {
        let factor = ScaleFactor::new(3, 1).unwrap();
        let third = factor.apply(&dec("9"));
        assert_eq!(third, dec("3"));
    }

    #[test]
    fn test_range_scales_both_ends() {
        let lines = vec![IngredientLine::new("Kartoffeln")
            .with_quantity(Quantity::range(2, 3))];
        let scaled = scale(2, 4, &lines, &RoundingPolicy::kitchen()).unwrap();
        assert_eq!(scaled[0].quantity, Some(Quantity::range(4, 6)));
        assert_eq!(scaled[0].status, ScaleStatus::Scaled);
    }

    #[test]
    fn test_unparseable_quantity_is_flagged() {
        let lines = vec![IngredientLine::new("Butter")
            .with_quantity(Quantity::Unparseable("etwas".to_string()))];
        let scaled = scale(2, 6, &lines, &RoundingPolicy::kitchen()).unwrap();
        assert_eq!(
            scaled[0].quantity,
            Some(Quantity::Unparseable("etwas".to_string()))
        );
        assert!(scaled[0].needs_attention());
    }

    #[test]
    fn test_unit_is_not_rewritten() {
        let lines = vec![IngredientLine::new("Zucker")
            .with_quantity(Quantity::amount(3))
            .with_unit("Esslöffel")];
        let scaled = scale(2, 1, &lines, &RoundingPolicy::kitchen()).unwrap();
        assert_eq!(scaled[0].unit, "Esslöffel");
        assert_eq!(scaled[0].quantity, Some(Quantity::decimal("1.5")));
    }
}
