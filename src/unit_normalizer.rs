//! # Unit Normalizer
//!
//! Maps free-text unit strings onto a small closed set of canonical units so
//! the shopping list can sum like with like. Lookup is case-insensitive and
//! ignores surrounding whitespace and a trailing abbreviation dot. Anything not
//! in the table comes back as [`NormalizedUnit::Unrecognized`] carrying the
//! original text; that is an expected outcome, not an error.
//!
//! ```rust
//! use mealplanner::unit_normalizer::{normalize, CanonicalUnit, NormalizedUnit};
//!
//! assert_eq!(normalize("Gramm"), NormalizedUnit::Canonical(CanonicalUnit::Gram));
//! assert_eq!(normalize("prise"), NormalizedUnit::Unrecognized("prise".to_string()));
//! ```

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical measurement units used for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalUnit {
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Piece,
    Teaspoon,
    Tablespoon,
}

/// Rounding class a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitClass {
    /// Pieces and dimensionless counts
    Count,
    /// Grams and milliliters
    Metric,
    /// Kilograms and liters
    Bulk,
    /// Teaspoons and tablespoons
    Spoon,
    /// Units outside the canonical set
    Other,
}

/// Outcome of normalizing a unit string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizedUnit {
    Canonical(CanonicalUnit),
    Unrecognized(String),
}

lazy_static! {
    static ref UNIT_TABLE: HashMap<&'static str, CanonicalUnit> = {
        let mut map = HashMap::new();

        for variant in ["g", "gr", "gramm", "gram", "grams", "gramme", "grammes"] {
            map.insert(variant, CanonicalUnit::Gram);
        }
        for variant in [
            "kg", "kilo", "kilos", "kilogramm", "kilogram", "kilograms", "kilogramme",
            "kilogrammes",
        ] {
            map.insert(variant, CanonicalUnit::Kilogram);
        }
        for variant in [
            "ml", "milliliter", "milliliters", "millilitre", "millilitres",
        ] {
            map.insert(variant, CanonicalUnit::Milliliter);
        }
        for variant in ["l", "ltr", "liter", "liters", "litre", "litres"] {
            map.insert(variant, CanonicalUnit::Liter);
        }
        for variant in [
            "stk", "stück", "stueck", "st", "piece", "pieces", "pc", "pcs", "pièce", "pièces",
        ] {
            map.insert(variant, CanonicalUnit::Piece);
        }
        for variant in [
            "tl", "teelöffel", "teeloeffel", "tsp", "teaspoon", "teaspoons", "cac",
            "cuillère à café", "cuillères à café",
        ] {
            map.insert(variant, CanonicalUnit::Teaspoon);
        }
        for variant in [
            "el", "esslöffel", "essloeffel", "tbsp", "tablespoon", "tablespoons", "cas",
            "cuillère à soupe", "cuillères à soupe",
        ] {
            map.insert(variant, CanonicalUnit::Tablespoon);
        }

        map
    };
}

/// Normalize a unit string
///
/// An empty unit is a dimensionless count ("2 Eier") and maps to
/// [`CanonicalUnit::Piece`].
pub fn normalize(unit: &str) -> NormalizedUnit {
    let key = unit.trim().to_lowercase();
    if key.is_empty() {
        return NormalizedUnit::Canonical(CanonicalUnit::Piece);
    }

    let canonical = UNIT_TABLE
        .get(key.as_str())
        .or_else(|| UNIT_TABLE.get(key.trim_end_matches('.')));

    match canonical {
        Some(unit) => NormalizedUnit::Canonical(*unit),
        None => NormalizedUnit::Unrecognized(unit.to_string()),
    }
}

impl CanonicalUnit {
    /// Stable identifier, also used as localization key suffix
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalUnit::Gram => "gram",
            CanonicalUnit::Kilogram => "kilogram",
            CanonicalUnit::Milliliter => "milliliter",
            CanonicalUnit::Liter => "liter",
            CanonicalUnit::Piece => "piece",
            CanonicalUnit::Teaspoon => "teaspoon",
            CanonicalUnit::Tablespoon => "tablespoon",
        }
    }

    /// Short display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            CanonicalUnit::Gram => "g",
            CanonicalUnit::Kilogram => "kg",
            CanonicalUnit::Milliliter => "ml",
            CanonicalUnit::Liter => "l",
            CanonicalUnit::Piece => "pcs",
            CanonicalUnit::Teaspoon => "tsp",
            CanonicalUnit::Tablespoon => "tbsp",
        }
    }

    pub fn class(&self) -> UnitClass {
        match self {
            CanonicalUnit::Piece => UnitClass::Count,
            CanonicalUnit::Gram | CanonicalUnit::Milliliter => UnitClass::Metric,
            CanonicalUnit::Kilogram | CanonicalUnit::Liter => UnitClass::Bulk,
            CanonicalUnit::Teaspoon | CanonicalUnit::Tablespoon => UnitClass::Spoon,
        }
    }
}

impl NormalizedUnit {
    pub fn class(&self) -> UnitClass {
        match self {
            NormalizedUnit::Canonical(unit) => unit.class(),
            NormalizedUnit::Unrecognized(_) => UnitClass::Other,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, NormalizedUnit::Canonical(_))
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_variants_share_canonical_unit() {
        for variant in ["Gramm", "g", "GR", " gr. ", "grams"] {
            assert_eq!(
                normalize(variant),
                NormalizedUnit::Canonical(CanonicalUnit::Gram),
                "variant {variant:?}"
            );
        }
    }

    #[test]
    fn test_spoon_abbreviations() {
        assert_eq!(normalize("EL"), NormalizedUnit::Canonical(CanonicalUnit::Tablespoon));
        assert_eq!(normalize("El."), NormalizedUnit::Canonical(CanonicalUnit::Tablespoon));
        assert_eq!(normalize("TL"), NormalizedUnit::Canonical(CanonicalUnit::Teaspoon));
        assert_eq!(
            normalize("cuillère à café"),
            NormalizedUnit::Canonical(CanonicalUnit::Teaspoon)
        );
    }

    #[test]
    fn test_empty_unit_is_count() {
        assert_eq!(normalize(""), NormalizedUnit::Canonical(CanonicalUnit::Piece));
        assert_eq!(normalize("   "), NormalizedUnit::Canonical(CanonicalUnit::Piece));
    }

    #[test]
    fn test_unrecognized_keeps_original_text() {
        assert_eq!(normalize("prise"), NormalizedUnit::Unrecognized("prise".to_string()));
        assert_eq!(
            normalize("a pinch"),
            NormalizedUnit::Unrecognized("a pinch".to_string())
        );
        assert_eq!(normalize("Gramn"), NormalizedUnit::Unrecognized("Gramn".to_string()));
    }

    #[test]
    fn test_unit_classes() {
        assert_eq!(CanonicalUnit::Piece.class(), UnitClass::Count);
        assert_eq!(CanonicalUnit::Milliliter.class(), UnitClass::Metric);
        assert_eq!(CanonicalUnit::Liter.class(), UnitClass::Bulk);
        assert_eq!(CanonicalUnit::Teaspoon.class(), UnitClass::Spoon);
        assert_eq!(normalize("Bund").class(), UnitClass::Other);
    }
}
