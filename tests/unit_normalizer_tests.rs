use mealplanner::rounding::RoundingPolicy;
use mealplanner::unit_normalizer::{normalize, CanonicalUnit, NormalizedUnit, UnitClass};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gram_spellings_normalize_together() {
        let expected = NormalizedUnit::Canonical(CanonicalUnit::Gram);
        for unit in ["Gramm", "g", "GR", " g ", "gr.", "grams"] {
            assert_eq!(normalize(unit), expected, "unit {unit:?}");
        }
    }

    #[test]
    fn test_spoons_in_three_languages() {
        for unit in ["EL", "Esslöffel", "tbsp", "cuillère à soupe"] {
            assert_eq!(
                normalize(unit),
                NormalizedUnit::Canonical(CanonicalUnit::Tablespoon),
                "unit {unit:?}"
            );
        }
        for unit in ["TL", "Teelöffel", "tsp", "cac"] {
            assert_eq!(
                normalize(unit),
                NormalizedUnit::Canonical(CanonicalUnit::Teaspoon),
                "unit {unit:?}"
            );
        }
    }

    #[test]
    fn test_unknown_unit_keeps_original_text() {
        assert_eq!(normalize("prise"), NormalizedUnit::Unrecognized("prise".to_string()));
        assert_eq!(normalize("Bund"), NormalizedUnit::Unrecognized("Bund".to_string()));
        assert!(!normalize("Dose").is_recognized());
    }

    #[test]
    fn test_empty_unit_is_a_count() {
        assert_eq!(normalize(""), NormalizedUnit::Canonical(CanonicalUnit::Piece));
        assert_eq!(normalize("Stück").class(), UnitClass::Count);
    }

    #[test]
    fn test_no_magnitude_conversion() {
        assert_ne!(normalize("kg"), normalize("g"));
        assert_ne!(normalize("l"), normalize("ml"));
        assert_eq!(normalize("kg").class(), UnitClass::Bulk);
        assert_eq!(normalize("ml").class(), UnitClass::Metric);
    }

    #[test]
    fn test_policy_picks_rule_by_unit() {
        let policy = RoundingPolicy::kitchen();
        let value: bigdecimal::BigDecimal = "2.345".parse().unwrap();
        assert_eq!(policy.round(&value, "g").to_string(), "2.3");
        assert_eq!(policy.round(&value, "kg").to_string(), "2.35");
        assert_eq!(policy.round(&value, "EL").to_string(), "2.5");
        assert_eq!(policy.round(&value, "Prise").to_string(), "2.35");
    }
}
