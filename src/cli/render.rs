//! Plain text rendering for the terminal

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::ingredient_model::{Recipe, RecipeSummary, ScaledIngredientLine};
use crate::localization::{t_args_lang, t_lang, uses_decimal_comma};
use crate::planner::{MealSlot, WeekPlan};

/// One ingredient line; lines that could not be scaled are flagged
pub fn render_scaled_line(line: &ScaledIngredientLine, language_code: Option<&str>) -> String {
    let text = line.display(uses_decimal_comma(language_code));
    if line.needs_attention() {
        format!("{text}  [!] {}", t_lang("scale-needs-attention", language_code))
    } else {
        text
    }
}

/// Recipe with ingredients scaled to `target_servings`
pub fn render_recipe(
    recipe: &Recipe,
    scaled: &[ScaledIngredientLine],
    target_servings: u32,
    language_code: Option<&str>,
) -> String {
    let mut out = String::new();
    let servings = target_servings.to_string();
    let base = recipe.base_servings.to_string();
    let _ = writeln!(out, "{} (#{})", recipe.title, recipe.id);
    let _ = writeln!(
        out,
        "{}",
        t_args_lang(
            "recipe-servings",
            &[("servings", servings.as_str()), ("base", base.as_str())],
            language_code,
        )
    );
    if let Some(total_time) = &recipe.total_time {
        let _ = writeln!(out, "{total_time}");
    }
    if let Some(url) = &recipe.source_url {
        let _ = writeln!(out, "{}", t_args_lang("recipe-source", &[("source", url.as_str())], language_code));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", t_lang("recipe-ingredients-heading", language_code));
    for line in scaled {
        let _ = writeln!(out, "- {}", render_scaled_line(line, language_code));
    }

    if !recipe.steps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", t_lang("recipe-steps-heading", language_code));
        for (i, step) in recipe.steps.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, step);
        }
    }
    out
}

/// Cookbook listing, one recipe per line
pub fn render_recipe_list(recipes: &[RecipeSummary], language_code: Option<&str>) -> String {
    if recipes.is_empty() {
        return format!("{}\n", t_lang("recipes-empty", language_code));
    }
    let mut out = String::new();
    for recipe in recipes {
        let _ = write!(out, "#{:<4} {} ({})", recipe.id, recipe.title, recipe.base_servings);
        if let Some(total_time) = &recipe.total_time {
            let _ = write!(out, " · {total_time}");
        }
        let _ = writeln!(out);
    }
    out
}

/// Week grid: one block per day, one line per meal slot
pub fn render_week_plan(
    plan: &WeekPlan,
    titles: &HashMap<i64, String>,
    language_code: Option<&str>,
) -> String {
    let week = plan.week.to_string();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        t_args_lang("plan-week-heading", &[("week", week.as_str())], language_code)
    );

    for day in plan.week.days() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", day.format("%a %d.%m."));
        for meal_slot in MealSlot::ALL {
            let label = t_lang(meal_slot.label_key(), language_code);
            let slots = plan.slots_for(day, meal_slot);
            if slots.is_empty() {
                let _ = writeln!(out, "  {:<12} {}", label, t_lang("plan-empty-slot", language_code));
                continue;
            }
            for slot in slots {
                let title = titles
                    .get(&slot.recipe_id)
                    .map(String::as_str)
                    .unwrap_or("?");
                let _ = writeln!(
                    out,
                    "  {:<12} [{}] {} ×{}",
                    label, slot.id, title, slot.servings
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::{Quantity, ScaleStatus};
    use crate::planner::{PlanSlot, Week};
    use chrono::{NaiveDate, Utc};

    fn scaled(quantity: Quantity, status: ScaleStatus) -> ScaledIngredientLine {
        ScaledIngredientLine {
            name: "Butter".to_string(),
            quantity: Some(quantity),
            unit: "g".to_string(),
            note: None,
            status,
        }
    }

    #[test]
    fn test_unscalable_line_is_flagged() {
        let line = scaled(Quantity::Unparseable("etwas".to_string()), ScaleStatus::UnparseableQuantity);
        let text = render_scaled_line(&line, Some("en"));
        assert!(text.starts_with("etwas g Butter"));
        assert!(text.contains("could not scale automatically"));
    }

    #[test]
    fn test_german_uses_decimal_comma() {
        let line = scaled(Quantity::decimal("12.5"), ScaleStatus::Scaled);
        assert_eq!(render_scaled_line(&line, Some("de")), "12,5 g Butter");
    }

    #[test]
    fn test_week_plan_shows_titles_and_servings() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        let week = Week::containing(day);
        let plan = WeekPlan::from_slots(
            week,
            vec![PlanSlot {
                id: 7,
                date: day,
                meal_slot: MealSlot::Dinner,
                recipe_id: 1,
                servings: 3,
                created_at: Utc::now(),
            }],
        );
        let titles = HashMap::from([(1, "Gulasch".to_string())]);
        let text = render_week_plan(&plan, &titles, Some("de"));
        assert!(text.contains("Abend"));
        assert!(text.contains("[7] Gulasch ×3"));
    }

    #[test]
    fn test_empty_cookbook() {
        assert_eq!(render_recipe_list(&[], Some("en")), "The cookbook is empty.\n");
    }
}
