//! # Recipe and Ingredient Data Model
//!
//! Strongly typed shapes for recipes and their ingredient lines. Loosely typed
//! records coming out of the importers are converted into these types at the
//! import boundary (see [`crate::ingredient_parser`]), so everything downstream
//! (scaling, shopping list, persistence) works with validated values.
//!
//! ## Core Concepts
//!
//! - **IngredientLine**: a name, an optional [`Quantity`], the unit exactly as
//!   the author wrote it, and an optional preparation note
//! - **Quantity**: an exact decimal amount, a range, or text that looked like a
//!   quantity but could not be read as a number
//! - **ScaledIngredientLine**: the ephemeral result of scaling a line
//!
//! ## Usage
//!
//! ```rust
//! use mealplanner::ingredient_model::{IngredientLine, Quantity};
//!
//! let flour = IngredientLine::new("Mehl")
//!     .with_quantity(Quantity::amount(200))
//!     .with_unit("g")
//!     .with_note("gesiebt");
//!
//! assert_eq!(flour.to_string(), "200 g Mehl (gesiebt)");
//! ```

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single ingredient line as stored with its recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// The ingredient name (e.g., "Mehl", "olive oil")
    pub name: String,

    /// Amount of the ingredient; `None` means "to taste" and is never scaled
    pub quantity: Option<Quantity>,

    /// Unit as entered by the author; empty for dimensionless counts ("2 Eier")
    pub unit: String,

    /// Optional preparation note (e.g., "gewürfelt", "finely chopped")
    pub note: Option<String>,
}

/// Quantity of an ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    /// Exact amount (e.g., "200", "1.5", "½")
    Amount(BigDecimal),

    /// Range of amounts (e.g., "2-3")
    Range {
        /// Lower bound
        min: BigDecimal,
        /// Upper bound
        max: BigDecimal,
    },

    /// Quantity text that is present but not a valid number
    Unparseable(String),
}

/// Result of scaling a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleStatus {
    /// The quantity was multiplied by the scale factor
    Scaled,
    /// The line has no quantity ("to taste") and passes through unchanged
    NotScalable,
    /// The quantity could not be read as a number; passed through unchanged
    UnparseableQuantity,
}

/// Ingredient line after scaling; built per render, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledIngredientLine {
    pub name: String,
    pub quantity: Option<Quantity>,
    pub unit: String,
    pub note: Option<String>,
    pub status: ScaleStatus,
}

/// Where a recipe was imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Url,
    Text,
    Pdf,
    Image,
    Manual,
}

/// A recipe as loaded from the cookbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// Serving count the stored quantities were written for (always >= 1)
    pub base_servings: u32,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
    pub source: RecipeSource,
    pub source_url: Option<String>,
    pub total_time: Option<String>,
    pub image_url: Option<String>,
    pub raw_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated recipe that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub base_servings: u32,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
    pub source: RecipeSource,
    pub source_url: Option<String>,
    pub total_time: Option<String>,
    pub image_url: Option<String>,
    pub raw_text: Option<String>,
}

/// Cookbook listing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub base_servings: u32,
    pub total_time: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IngredientLine {
    /// Create a new ingredient line with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: None,
            unit: String::new(),
            note: None,
        }
    }

    /// Add a quantity to this line
    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the unit as written by the author
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Add a preparation note
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Check if this line carries a numeric quantity that can be scaled
    pub fn is_scalable(&self) -> bool {
        self.quantity.as_ref().is_some_and(Quantity::is_numeric)
    }
}

impl Quantity {
    /// Create an exact amount
    pub fn amount(value: impl Into<BigDecimal>) -> Self {
        Quantity::Amount(value.into())
    }

    /// Create a range
    pub fn range(min: impl Into<BigDecimal>, max: impl Into<BigDecimal>) -> Self {
        Quantity::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Create an exact amount from decimal text such as "1.5"
    ///
    /// Text that is not a plain decimal yields [`Quantity::Unparseable`].
    pub fn decimal(text: &str) -> Self {
        match BigDecimal::from_str(text.trim()) {
            Ok(value) => Quantity::Amount(value),
            Err(_) => Quantity::Unparseable(text.to_string()),
        }
    }

    /// Whether this quantity is a number (amount or range)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Quantity::Unparseable(_))
    }

    /// Check if this quantity represents a range
    pub fn is_range(&self) -> bool {
        matches!(self, Quantity::Range { .. })
    }

    /// Serialized form used by the database; read back with
    /// [`crate::ingredient_parser::parse_quantity`]
    pub fn to_storage(&self) -> String {
        match self {
            Quantity::Amount(value) => format_decimal(value),
            Quantity::Range { min, max } => {
                format!("{}-{}", format_decimal(min), format_decimal(max))
            }
            Quantity::Unparseable(text) => text.clone(),
        }
    }

    /// Render with a decimal comma instead of a point
    pub fn to_display_string(&self, decimal_comma: bool) -> String {
        let text = match self {
            Quantity::Amount(value) => format_decimal(value),
            Quantity::Range { min, max } => {
                format!("{}–{}", format_decimal(min), format_decimal(max))
            }
            Quantity::Unparseable(text) => return text.clone(),
        };
        if decimal_comma {
            text.replace('.', ",")
        } else {
            text
        }
    }
}

/// Format a decimal without trailing zeros ("2.50" -> "2.5", "3.0" -> "3")
pub fn format_decimal(value: &BigDecimal) -> String {
    let whole = value.with_scale(0);
    if &whole == value {
        return whole.to_string();
    }
    let text = value.to_string();
    if text.contains('.') && !text.contains(['e', 'E']) {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

impl ScaledIngredientLine {
    /// Wrap an unscaled line with the given status
    pub fn passthrough(line: &IngredientLine, status: ScaleStatus) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity.clone(),
            unit: line.unit.clone(),
            note: line.note.clone(),
            status,
        }
    }

    /// Plain ingredient line carrying the scaled quantity
    pub fn to_ingredient_line(&self) -> IngredientLine {
        IngredientLine {
            name: self.name.clone(),
            quantity: self.quantity.clone(),
            unit: self.unit.clone(),
            note: self.note.clone(),
        }
    }

    /// Lines the UI should flag as "could not scale automatically"
    pub fn needs_attention(&self) -> bool {
        self.status == ScaleStatus::UnparseableQuantity
    }

    /// Human readable rendering, optionally with a decimal comma
    pub fn display(&self, decimal_comma: bool) -> String {
        render_line(
            self.quantity.as_ref(),
            &self.unit,
            &self.name,
            self.note.as_deref(),
            decimal_comma,
        )
    }
}

impl RecipeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::Url => "url",
            RecipeSource::Text => "text",
            RecipeSource::Pdf => "pdf",
            RecipeSource::Image => "image",
            RecipeSource::Manual => "manual",
        }
    }
}

impl FromStr for RecipeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(RecipeSource::Url),
            "text" => Ok(RecipeSource::Text),
            "pdf" => Ok(RecipeSource::Pdf),
            "image" => Ok(RecipeSource::Image),
            "manual" => Ok(RecipeSource::Manual),
            _ => Err(format!("Unknown recipe source: {s}")),
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Recipe {
    /// Summary row for listings
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title.clone(),
            base_servings: self.base_servings,
            total_time: self.total_time.clone(),
            image_url: self.image_url.clone(),
            created_at: self.created_at,
        }
    }

    /// Editable copy used when saving changes back
    pub fn to_new_recipe(&self) -> NewRecipe {
        NewRecipe {
            title: self.title.clone(),
            base_servings: self.base_servings,
            ingredients: self.ingredients.clone(),
            steps: self.steps.clone(),
            source: self.source,
            source_url: self.source_url.clone(),
            total_time: self.total_time.clone(),
            image_url: self.image_url.clone(),
            raw_text: self.raw_text.clone(),
        }
    }
}

fn render_line(
    quantity: Option<&Quantity>,
    unit: &str,
    name: &str,
    note: Option<&str>,
    decimal_comma: bool,
) -> String {
    let mut parts = Vec::new();
    if let Some(quantity) = quantity {
        parts.push(quantity.to_display_string(decimal_comma));
    }
    if !unit.is_empty() {
        parts.push(unit.to_string());
    }
    if !name.is_empty() {
        parts.push(name.to_string());
    }
    let mut text = parts.join(" ");
    if let Some(note) = note {
        text.push_str(&format!(" ({note})"));
    }
    text
}

impl fmt::Display for IngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_line(
            self.quantity.as_ref(),
            &self.unit,
            &self.name,
            self.note.as_deref(),
            false,
        ))
    }
}

impl fmt::Display for ScaledIngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(false))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string(false))
    }
}
