use mealplanner::localization::{
    get_localization_manager, init_localization, t_args_lang, t_lang,
};
use mealplanner::planner::MealSlot;

#[cfg(test)]
mod tests {
    use super::*;

    fn message_ids(source: &str) -> Vec<String> {
        source
            .lines()
            .filter(|line| !line.starts_with('#') && !line.starts_with(' '))
            .filter_map(|line| line.split_once(" = ").map(|(id, _)| id.trim().to_string()))
            .collect()
    }

    #[test]
    fn test_german_and_english_define_the_same_keys() {
        let mut de = message_ids(include_str!("../locales/de/main.ftl"));
        let mut en = message_ids(include_str!("../locales/en/main.ftl"));
        de.sort();
        en.sort();
        assert!(!en.is_empty());
        assert_eq!(de, en);
    }

    #[test]
    fn test_meal_slot_labels() {
        init_localization().unwrap();
        for slot in MealSlot::ALL {
            let label = t_lang(slot.label_key(), Some("de"));
            assert!(!label.starts_with("Missing translation"), "{slot}");
        }
        assert_eq!(t_lang("meal-dinner", Some("en")), "Dinner");
    }

    #[test]
    fn test_arguments_are_substituted() {
        let text = t_args_lang("recipe-not-found", &[("id", "7")], Some("en"));
        assert_eq!(text, "Recipe 7 not found.");
        let text = t_args_lang("recipe-not-found", &[("id", "7")], Some("de"));
        assert!(text.contains('7'));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(t_lang("recipes-empty", Some("fr")), "The cookbook is empty.");
        assert!(get_localization_manager().is_supported("de-AT"));
        assert!(!get_localization_manager().is_supported("fr"));
    }

    #[test]
    fn test_missing_key_is_visible() {
        assert_eq!(t_lang("no-such-key", Some("en")), "Missing translation: no-such-key");
    }
}
