//! # Measurement Patterns Module
//!
//! Regex patterns used to read leading quantities, serving counts and unit
//! tokens from recipe text.

use lazy_static::lazy_static;
use regex::Regex;

/// Vulgar fraction characters and their value as (numerator, denominator)
pub const UNICODE_FRACTIONS: &[(char, u32, u32)] = &[
    ('¼', 1, 4),
    ('½', 1, 2),
    ('¾', 3, 4),
    ('⅓', 1, 3),
    ('⅔', 2, 3),
    ('⅛', 1, 8),
    ('⅜', 3, 8),
    ('⅝', 5, 8),
    ('⅞', 7, 8),
];

lazy_static! {
    /// "2-3", "2 – 3", "1,5 bis 2"
    pub static ref RANGE_REGEX: Regex =
        Regex::new(r"^(\d+(?:[.,]\d+)?)\s*(?:-|–|—|bis\b|to\b)\s*(\d+(?:[.,]\d+)?)")
            .expect("Range pattern should be valid");

    /// "1 1/2"
    pub static ref MIXED_FRACTION_REGEX: Regex =
        Regex::new(r"^(\d+)\s+(\d+)\s*[/⁄]\s*(\d+)")
            .expect("Mixed fraction pattern should be valid");

    /// "1/2"
    pub static ref FRACTION_REGEX: Regex =
        Regex::new(r"^(\d+)\s*[/⁄]\s*(\d+)")
            .expect("Fraction pattern should be valid");

    /// "½", "1½", "1 ½"
    pub static ref UNICODE_FRACTION_REGEX: Regex =
        Regex::new(r"^(\d+)?\s*([¼½¾⅓⅔⅛⅜⅝⅞])")
            .expect("Unicode fraction pattern should be valid");

    /// "200", "0,5", "1.25"
    pub static ref NUMBER_REGEX: Regex =
        Regex::new(r"^(\d+(?:[.,]\d+)?)")
            .expect("Number pattern should be valid");

    /// First number anywhere in a servings description ("für 4 Personen")
    pub static ref SERVINGS_REGEX: Regex =
        Regex::new(r"(\d+(?:[.,]\d+)?)")
            .expect("Servings pattern should be valid");

    /// Unit word directly after a quantity ("g", "EL.", "Stück")
    pub static ref UNIT_TOKEN_REGEX: Regex =
        Regex::new(r"^(\p{L}+\.?)")
            .expect("Unit token pattern should be valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_pattern() {
        let caps = RANGE_REGEX.captures("2–3 Zwiebeln").unwrap();
        assert_eq!(&caps[1], "2");
        assert_eq!(&caps[2], "3");
        assert!(RANGE_REGEX.is_match("1,5 bis 2 l Wasser"));
        assert!(!RANGE_REGEX.is_match("200 g Mehl"));
    }

    #[test]
    fn test_unit_token_pattern() {
        let caps = UNIT_TOKEN_REGEX.captures("EL. Öl").unwrap();
        assert_eq!(&caps[1], "EL.");
        assert!(UNIT_TOKEN_REGEX.is_match("Stück Butter"));
    }
}
