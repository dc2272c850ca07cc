//! # Weekly Planner Module
//!
//! Week arithmetic, meal slots, the week grid shown by the planner, and the
//! swipe deck used to pick recipes one card at a time.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ingredient_model::RecipeSummary;

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Localization key for the slot label
    pub fn label_key(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "meal-breakfast",
            MealSlot::Lunch => "meal-lunch",
            MealSlot::Dinner => "meal-dinner",
        }
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "frühstück" => Ok(MealSlot::Breakfast),
            "lunch" | "mittag" => Ok(MealSlot::Lunch),
            "dinner" | "abend" | "abendessen" => Ok(MealSlot::Dinner),
            other => Err(format!("Unknown meal slot: {other}")),
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recipe assigned to a day and meal slot with its own serving count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSlot {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_slot: MealSlot,
    pub recipe_id: i64,
    /// Target servings for this slot (always >= 1)
    pub servings: u32,
    pub created_at: DateTime<Utc>,
}

/// Monday-to-Sunday week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Week {
    monday: NaiveDate,
}

impl Week {
    /// The week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self {
            monday: date - Duration::days(offset),
        }
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    pub fn sunday(&self) -> NaiveDate {
        self.monday + Duration::days(6)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        (0..7).map(|i| self.monday + Duration::days(i)).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.monday && date <= self.sunday()
    }

    pub fn previous(&self) -> Self {
        Self {
            monday: self.monday - Duration::days(7),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            monday: self.monday + Duration::days(7),
        }
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} – {}",
            self.monday.format("%d.%m.%Y"),
            self.sunday().format("%d.%m.%Y")
        )
    }
}

/// Grid of plan slots for one week, keyed by day and meal slot
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    pub week: Week,
    cells: BTreeMap<(NaiveDate, MealSlot), Vec<PlanSlot>>,
}

impl WeekPlan {
    /// Arrange slots into the grid; slots outside the week are ignored
    pub fn from_slots(week: Week, slots: Vec<PlanSlot>) -> Self {
        let mut cells: BTreeMap<(NaiveDate, MealSlot), Vec<PlanSlot>> = BTreeMap::new();
        for slot in slots.into_iter().filter(|s| week.contains(s.date)) {
            cells.entry((slot.date, slot.meal_slot)).or_default().push(slot);
        }
        Self { week, cells }
    }

    pub fn slots_for(&self, date: NaiveDate, meal_slot: MealSlot) -> &[PlanSlot] {
        self.cells
            .get(&(date, meal_slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All slots in day and meal order
    pub fn all_slots(&self) -> impl Iterator<Item = &PlanSlot> {
        self.cells.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Servings a recipe is planned for unless the user picks another number
pub fn default_target_servings(recipe: &RecipeSummary) -> u32 {
    recipe.base_servings.max(1)
}

/// Swipe deck over the cookbook: look at one recipe, take it or skip it
#[derive(Debug, Clone)]
pub struct RecipeDeck {
    cards: Vec<RecipeSummary>,
    position: usize,
}

impl RecipeDeck {
    pub fn new(cards: Vec<RecipeSummary>) -> Self {
        Self { cards, position: 0 }
    }

    pub fn current(&self) -> Option<&RecipeSummary> {
        self.cards.get(self.position)
    }

    /// Move to the next card, wrapping around at the end
    pub fn skip(&mut self) -> Option<&RecipeSummary> {
        if self.cards.is_empty() {
            return None;
        }
        self.position = (self.position + 1) % self.cards.len();
        self.current()
    }

    /// Shuffle the deck and start over
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.position = 0;
    }

    /// "3/12" style position label
    pub fn position_label(&self) -> String {
        if self.cards.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.position + 1, self.cards.len())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
