use bigdecimal::BigDecimal;
use chrono::Utc;
use mealplanner::errors::ScaleError;
use mealplanner::ingredient_model::{IngredientLine, Quantity, Recipe, RecipeSource};
use mealplanner::ingredient_parser::parse_ingredient_lines;
use mealplanner::scaling::ScalingEngine;
use mealplanner::shopping_list::{ShoppingListBuilder, UnitKey};
use mealplanner::unit_normalizer::CanonicalUnit;
use std::str::FromStr;

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i64, title: &str, base_servings: u32, lines: &[&str]) -> Recipe {
        Recipe {
            id,
            title: title.to_string(),
            base_servings,
            ingredients: parse_ingredient_lines(lines),
            steps: Vec::new(),
            source: RecipeSource::Manual,
            source_url: None,
            total_time: None,
            image_url: None,
            raw_text: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_grams_sum_across_recipes() {
        let engine = ScalingEngine::default();
        let pancakes = recipe(1, "Pfannkuchen", 4, &["200 g Mehl", "3 Eier", "1 Prise Salz"]);
        let bread = recipe(2, "Brot", 2, &["500 Gramm mehl", "1 TL Salz"]);

        let mut builder = ShoppingListBuilder::new(&engine);
        builder.add(&pancakes, 2).unwrap();
        builder.add(&bread, 2).unwrap();
        let list = builder.build();

        let flour = list.find("Mehl", "g").expect("flour row");
        assert_eq!(flour.total, Some(Quantity::amount(600)));
        assert_eq!(flour.recipes, vec!["Pfannkuchen".to_string(), "Brot".to_string()]);

        let eggs = list.find("Eier", "").expect("egg row");
        assert_eq!(eggs.total, Some(Quantity::decimal("1.5")));
    }

    #[test]
    fn test_unrecognized_unit_never_merges() {
        let engine = ScalingEngine::default();
        let a = recipe(1, "Suppe", 2, &["1 Prise Salz"]);
        let b = recipe(2, "Brot", 2, &["5 g Salz", "1 prise salz"]);

        let mut builder = ShoppingListBuilder::new(&engine);
        builder.add(&a, 2).unwrap();
        builder.add(&b, 2).unwrap();
        let list = builder.build();

        let grams = list.find("Salz", "g").expect("gram row");
        assert_eq!(grams.total, Some(Quantity::amount(5)));
        assert_eq!(grams.recipes, vec!["Brot".to_string()]);

        // different spelling of the unknown unit stays a separate row
        let pinch = list.find("Salz", "Prise").expect("pinch row");
        assert_eq!(pinch.unit, UnitKey::Raw("Prise".to_string()));
        assert_eq!(pinch.total, Some(Quantity::amount(1)));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_kilograms_and_grams_stay_apart() {
        let engine = ScalingEngine::default();
        let a = recipe(1, "Kuchen", 1, &["1 kg Mehl", "250 g Mehl"]);
        let mut builder = ShoppingListBuilder::new(&engine);
        builder.add(&a, 1).unwrap();
        let list = builder.build();
        assert_eq!(list.len(), 2);
        assert!(list.find("Mehl", "kg").is_some());
        assert!(list.find("Mehl", "g").is_some());
    }

    #[test]
    fn test_ranges_and_vague_amounts() {
        let engine = ScalingEngine::default();
        let a = recipe(1, "Apfelkuchen", 2, &["2-3 Äpfel", "etwas Butter"]);
        let b = recipe(2, "Kompott", 2, &["1 Äpfel", "etwas Butter"]);
        let mut builder = ShoppingListBuilder::new(&engine);
        builder.add(&a, 2).unwrap();
        builder.add(&b, 2).unwrap();
        let list = builder.build();

        let apples = list.find("Äpfel", "").expect("apple row");
        assert_eq!(apples.total, Some(Quantity::range(3, 4)));

        let butter = list.find("Butter", "").expect("butter row");
        assert_eq!(butter.total, None);
        assert_eq!(butter.unscaled, vec!["etwas".to_string()]);
        assert_eq!(butter.display(Some("de")), "Butter (etwas)");
    }

    #[test]
    fn test_render_text_uses_decimal_comma() {
        let engine = ScalingEngine::default();
        let mut builder = ShoppingListBuilder::new(&engine);
        let line = IngredientLine::new("Milch")
            .with_quantity(Quantity::Amount(BigDecimal::from_str("0.75").unwrap()))
            .with_unit("l");
        let milk = Recipe {
            ingredients: vec![line],
            ..recipe(1, "Grießbrei", 2, &[])
        };
        builder.add(&milk, 2).unwrap();
        let text = builder.build().render_text("Einkaufsliste", Some("de"));
        assert_eq!(text, "Einkaufsliste\n\n- 0,75 l Milch\n");
    }

    #[test]
    fn test_empty_builder_gives_empty_list() {
        let engine = ScalingEngine::default();
        let list = ShoppingListBuilder::new(&engine).build();
        assert!(list.is_empty());
    }

    #[test]
    fn test_german_list_uses_german_unit_labels() {
        let engine = ScalingEngine::default();
        let baked_apples = recipe(1, "Bratäpfel", 2, &["2 EL Zucker", "1 TL Zimt", "3 Stück Äpfel"]);
        let mut builder = ShoppingListBuilder::new(&engine);
        builder.add(&baked_apples, 3).unwrap();
        let list = builder.build();

        let sugar = list.find("Zucker", "EL").expect("sugar row");
        assert_eq!(sugar.unit, UnitKey::Canonical(CanonicalUnit::Tablespoon));

        let text = list.render_text("Einkaufsliste", Some("de"));
        assert!(text.contains("- 3 EL Zucker\n"), "{text}");
        assert!(text.contains("- 1,5 TL Zimt\n"), "{text}");
        assert!(text.contains("- 4,5 Äpfel\n"), "{text}");

        let text = list.render_text("Shopping list", Some("en"));
        assert!(text.contains("- 3 tbsp Zucker\n"), "{text}");
        assert!(text.contains("- 1.5 tsp Zimt\n"), "{text}");
    }

    #[test]
    fn test_recipe_with_zero_servings_is_rejected() {
        let engine = ScalingEngine::default();
        let broken = recipe(1, "Kaputt", 0, &["200 g Mehl"]);
        let mut builder = ShoppingListBuilder::new(&engine);
        let result = builder.add(&broken, 2);
        assert!(matches!(result, Err(ScaleError::InvalidRecipeData(_))));
        assert!(builder.build().is_empty());
    }
}
