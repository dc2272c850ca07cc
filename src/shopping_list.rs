//! # Shopping List Module
//!
//! Aggregates the scaled ingredient lines of every planned recipe into one
//! list. Lines are grouped by ingredient name (case-insensitive) and unit.
//! Units are compared after normalization, so "Gramm" and "g" land in the
//! same row, but no conversion between magnitudes happens: grams and
//! kilograms stay separate rows. Unrecognized units only merge with the same
//! spelling.

use anyhow::Context;
use bigdecimal::BigDecimal;
use log::{debug, warn};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::db;
use crate::errors::ScaleError;
use crate::ingredient_model::{Quantity, Recipe, ScaledIngredientLine};
use crate::localization::{t_lang, uses_decimal_comma};
use crate::planner::Week;
use crate::scaling::ScalingEngine;
use crate::unit_normalizer::{normalize, CanonicalUnit, NormalizedUnit};

/// Grouping key for the unit column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKey {
    /// Recognized unit
    Canonical(CanonicalUnit),
    /// Unrecognized unit, compared by its trimmed spelling
    Raw(String),
}

impl UnitKey {
    pub fn from_unit(unit: &str) -> Self {
        match normalize(unit) {
            NormalizedUnit::Canonical(canonical) => UnitKey::Canonical(canonical),
            NormalizedUnit::Unrecognized(_) => UnitKey::Raw(unit.trim().to_string()),
        }
    }

    /// Unit label in the given language; unrecognized units keep their spelling
    pub fn label(&self, language_code: Option<&str>) -> String {
        match self {
            UnitKey::Canonical(unit) => t_lang(&format!("unit-{}", unit.key()), language_code),
            UnitKey::Raw(raw) => raw.clone(),
        }
    }
}

/// One row of the shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingItem {
    /// Ingredient name as first seen
    pub name: String,
    pub unit: UnitKey,
    /// Sum of all numeric quantities; `None` when no line had a number
    pub total: Option<Quantity>,
    /// Quantity texts that could not be added up ("etwas", "n. B.")
    pub unscaled: Vec<String>,
    /// Titles of the recipes needing this item
    pub recipes: Vec<String>,
}

impl ShoppingItem {
    fn new(name: &str, unit: UnitKey) -> Self {
        Self {
            name: name.to_string(),
            unit,
            total: None,
            unscaled: Vec::new(),
            recipes: Vec::new(),
        }
    }

    fn absorb(&mut self, line: &ScaledIngredientLine, recipe_title: &str) {
        match &line.quantity {
            Some(Quantity::Unparseable(text)) => {
                if !self.unscaled.contains(text) {
                    self.unscaled.push(text.clone());
                }
            }
            Some(quantity) => {
                self.total = Some(match self.total.take() {
                    Some(total) => add_quantities(&total, quantity),
                    None => quantity.clone(),
                });
            }
            None => {}
        }
        if !self.recipes.iter().any(|title| title == recipe_title) {
            self.recipes.push(recipe_title.to_string());
        }
    }

    /// Render as a single line, e.g. "350 g Mehl" or "Salz (etwas)"
    ///
    /// Piece counts are shown without a unit label ("3 Eier").
    pub fn display(&self, language_code: Option<&str>) -> String {
        let mut parts = Vec::new();
        if let Some(total) = &self.total {
            parts.push(total.to_display_string(uses_decimal_comma(language_code)));
            match &self.unit {
                UnitKey::Canonical(CanonicalUnit::Piece) => {}
                UnitKey::Canonical(_) => parts.push(self.unit.label(language_code)),
                UnitKey::Raw(raw) if !raw.is_empty() => parts.push(raw.clone()),
                UnitKey::Raw(_) => {}
            }
        } else if let UnitKey::Raw(raw) = &self.unit {
            if !raw.is_empty() {
                parts.push(raw.clone());
            }
        }
        parts.push(self.name.clone());
        let mut text = parts.join(" ");
        if !self.unscaled.is_empty() {
            let _ = write!(text, " ({})", self.unscaled.join(", "));
        }
        text
    }
}

/// Sum two numeric quantities; ranges add bound by bound
fn add_quantities(a: &Quantity, b: &Quantity) -> Quantity {
    let bounds = |q: &Quantity| -> Option<(BigDecimal, BigDecimal)> {
        match q {
            Quantity::Amount(value) => Some((value.clone(), value.clone())),
            Quantity::Range { min, max } => Some((min.clone(), max.clone())),
            Quantity::Unparseable(_) => None,
        }
    };
    match (a, b) {
        (Quantity::Amount(x), Quantity::Amount(y)) => Quantity::Amount(x + y),
        _ => match (bounds(a), bounds(b)) {
            (Some((a_min, a_max)), Some((b_min, b_max))) => Quantity::Range {
                min: a_min + b_min,
                max: a_max + b_max,
            },
            (Some(_), None) => a.clone(),
            _ => b.clone(),
        },
    }
}

/// Aggregated shopping list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find an item by name (case-insensitive) and unit label
    pub fn find(&self, name: &str, unit: &str) -> Option<&ShoppingItem> {
        let key = UnitKey::from_unit(unit);
        let name = name.trim().to_lowercase();
        self.items
            .iter()
            .find(|item| item.name.to_lowercase() == name && item.unit == key)
    }

    /// Plain text export, one "- item" per line
    pub fn render_text(&self, heading: &str, language_code: Option<&str>) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "{heading}");
        let _ = writeln!(text);
        for item in &self.items {
            let _ = writeln!(text, "- {}", item.display(language_code));
        }
        text
    }
}

/// Collects recipes and their target servings, then builds the list
pub struct ShoppingListBuilder<'a> {
    engine: &'a ScalingEngine,
    items: BTreeMap<(String, UnitKey), ShoppingItem>,
    recipe_count: usize,
}

impl<'a> ShoppingListBuilder<'a> {
    pub fn new(engine: &'a ScalingEngine) -> Self {
        Self {
            engine,
            items: BTreeMap::new(),
            recipe_count: 0,
        }
    }

    /// Add a recipe scaled to `target_servings`
    pub fn add(&mut self, recipe: &Recipe, target_servings: u32) -> Result<(), ScaleError> {
        let scaled = self.engine.scale_recipe(recipe, target_servings)?;
        for line in &scaled {
            self.add_line(line, &recipe.title);
        }
        self.recipe_count += 1;
        Ok(())
    }

    /// Add an already scaled line
    pub fn add_line(&mut self, line: &ScaledIngredientLine, recipe_title: &str) {
        let name = line.name.trim();
        if name.is_empty() {
            return;
        }
        let unit = UnitKey::from_unit(&line.unit);
        self.items
            .entry((name.to_lowercase(), unit.clone()))
            .or_insert_with(|| ShoppingItem::new(name, unit))
            .absorb(line, recipe_title);
    }

    /// Items sorted by name, then unit
    pub fn build(self) -> ShoppingList {
        debug!(
            "Built shopping list with {} items from {} recipes",
            self.items.len(),
            self.recipe_count
        );
        ShoppingList {
            items: self.items.into_values().collect(),
        }
    }
}

/// Shopping list for every plan slot in `week`
///
/// Slots pointing at a recipe that no longer exists are skipped with a
/// warning. A recipe that cannot be scaled fails the whole list.
pub async fn shopping_list_for_week(
    pool: &SqlitePool,
    week: Week,
    engine: &ScalingEngine,
) -> anyhow::Result<ShoppingList> {
    let slots = db::list_plan_slots(pool, week).await?;
    let mut builder = ShoppingListBuilder::new(engine);
    for slot in slots {
        let Some(recipe) = db::get_recipe(pool, slot.recipe_id).await? else {
            warn!("Plan slot {} points to missing recipe {}", slot.id, slot.recipe_id);
            continue;
        };
        builder
            .add(&recipe, slot.servings)
            .with_context(|| format!("Failed to scale recipe {} for plan slot {}", recipe.id, slot.id))?;
    }
    Ok(builder.build())
}

/// A recipe picked by hand for the shopping list, with optional target servings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipePick {
    pub recipe_id: i64,
    /// `None` uses the recipe's own servings
    pub servings: Option<u32>,
}

impl FromStr for RecipePick {
    type Err = String;

    /// "12" or "12:4" (recipe 12 for 4 servings)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, servings) = match s.split_once(':') {
            Some((id, servings)) => (id, Some(servings)),
            None => (s, None),
        };
        let recipe_id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Invalid recipe id: {id}"))?;
        let servings = match servings {
            Some(text) => match text.trim().parse::<u32>() {
                Ok(n) if n >= 1 => Some(n),
                _ => return Err(format!("Invalid servings: {text}")),
            },
            None => None,
        };
        Ok(Self {
            recipe_id,
            servings,
        })
    }
}

/// Shopping list for hand-picked recipes, independent of the plan
///
/// Unknown recipe ids are an error.
pub async fn shopping_list_for_recipes(
    pool: &SqlitePool,
    picks: &[RecipePick],
    engine: &ScalingEngine,
) -> anyhow::Result<ShoppingList> {
    let mut builder = ShoppingListBuilder::new(engine);
    for pick in picks {
        let recipe = db::get_recipe(pool, pick.recipe_id)
            .await?
            .with_context(|| format!("Recipe {} not found", pick.recipe_id))?;
        let servings = pick.servings.unwrap_or(recipe.base_servings);
        builder
            .add(&recipe, servings)
            .with_context(|| format!("Failed to scale recipe {}", recipe.id))?;
    }
    Ok(builder.build())
}
