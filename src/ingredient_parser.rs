//! # Ingredient Parser
//!
//! Converts raw ingredient text (from web pages, pasted text, PDFs or OCR)
//! into typed [`IngredientLine`]s. This is the import boundary: whatever
//! shape the importers produce, the rest of the crate only sees validated
//! lines.
//!
//! ## Features
//!
//! - Integers and decimals with point or comma ("0,5")
//! - Fractions ("1/2"), mixed fractions ("1 1/2") and vulgar fractions ("1½")
//! - Ranges ("2-3", "2–3", "1 bis 2")
//! - Unit detection for German, English and French kitchen units
//! - Preparation notes after a comma or in trailing parentheses
//! - Vague leading amounts ("etwas", "a few") kept as unparseable quantities
//!
//! ## Usage
//!
//! ```rust
//! use mealplanner::ingredient_parser::parse_ingredient_line;
//!
//! let line = parse_ingredient_line("200 g Mehl, gesiebt");
//! assert_eq!(line.name, "Mehl");
//! assert_eq!(line.unit, "g");
//! assert_eq!(line.note.as_deref(), Some("gesiebt"));
//! ```

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use lazy_static::lazy_static;
use std::collections::HashSet;
use std::str::FromStr;

use crate::ingredient_model::{IngredientLine, Quantity};
use crate::measurement_patterns::{
    FRACTION_REGEX, MIXED_FRACTION_REGEX, NUMBER_REGEX, RANGE_REGEX, SERVINGS_REGEX,
    UNICODE_FRACTIONS, UNICODE_FRACTION_REGEX, UNIT_TOKEN_REGEX,
};
use crate::unit_normalizer::normalize;

/// Decimal places kept when a fraction does not terminate (1/3)
const FRACTION_PLACES: i64 = 4;

lazy_static! {
    /// Kitchen units outside the canonical set that still count as a unit token
    static ref EXTRA_KITCHEN_UNITS: HashSet<&'static str> = [
        "prise", "prisen", "msp", "messerspitze", "bund", "dose", "dosen", "tasse", "tassen",
        "becher", "pck", "päckchen", "packung", "zehe", "zehen", "scheibe", "scheiben",
        "handvoll", "stange", "stangen", "glas", "würfel",
        "pinch", "pinches", "bunch", "can", "cans", "cup", "cups", "clove", "cloves",
        "slice", "slices", "oz", "lb", "lbs", "pkg", "dash",
        "pincée", "pincées", "gousse", "gousses", "tranche", "tranches", "sachet", "sachets",
        "botte", "boîte", "boîtes",
    ]
    .into_iter()
    .collect();

    /// Multi-word units checked before single tokens
    static ref MULTI_WORD_UNITS: Vec<&'static str> = vec![
        "cuillères à soupe",
        "cuillère à soupe",
        "cuillères à café",
        "cuillère à café",
        "fl oz",
    ];

    /// Leading words that stand in for a quantity but carry no number
    static ref VAGUE_QUANTITIES: Vec<&'static str> = vec![
        "eine handvoll", "ein paar", "ein bisschen", "etwas", "einige",
        "a handful of", "a handful", "a few", "a little", "some",
        "un peu de", "un peu", "quelques",
    ];
}

/// Parse a single ingredient line
///
/// Lines without a leading quantity ("Salz, nach Geschmack") get
/// `quantity: None`.
pub fn parse_ingredient_line(line: &str) -> IngredientLine {
    let line = line.trim();

    if let Some((vague, rest)) = split_vague_quantity(line) {
        let (name, note) = split_note(rest);
        if !name.is_empty() {
            return IngredientLine {
                name,
                quantity: Some(Quantity::Unparseable(vague.to_string())),
                unit: String::new(),
                note,
            };
        }
    }

    let Some((quantity, rest)) = parse_leading_quantity(line) else {
        let (name, note) = split_note(line);
        return IngredientLine {
            name,
            quantity: None,
            unit: String::new(),
            note,
        };
    };

    let (unit, rest) = take_unit(rest.trim_start());
    let (name, note) = split_note(rest);

    if name.is_empty() {
        return IngredientLine::new(line);
    }

    IngredientLine {
        name,
        quantity: Some(quantity),
        unit,
        note,
    }
}

/// Parse every non-empty line of an ingredient block
pub fn parse_ingredient_lines<S: AsRef<str>>(lines: &[S]) -> Vec<IngredientLine> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .map(parse_ingredient_line)
        .collect()
}

/// Parse a stand-alone quantity such as a stored database value
///
/// Anything that is not entirely a number, fraction or range comes back as
/// [`Quantity::Unparseable`].
pub fn parse_quantity(text: &str) -> Quantity {
    let trimmed = text.trim();
    match parse_leading_quantity(trimmed) {
        Some((quantity, rest)) if rest.trim().is_empty() => quantity,
        _ => Quantity::Unparseable(text.to_string()),
    }
}

/// Extract the serving count from text like "4 Portionen" or "Serves 6"
pub fn extract_servings(raw: &str) -> Option<u32> {
    let caps = SERVINGS_REGEX.captures(raw)?;
    let value = parse_decimal(&caps[1])?;
    value
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u32()
        .filter(|servings| *servings > 0)
}

/// Read a quantity at the start of `text`, returning it and the remaining text
fn parse_leading_quantity(text: &str) -> Option<(Quantity, &str)> {
    if let Some(caps) = RANGE_REGEX.captures(text) {
        let end = caps.get(0)?.end();
        let min = parse_decimal(&caps[1])?;
        let max = parse_decimal(&caps[2])?;
        return Some((Quantity::Range { min, max }, &text[end..]));
    }

    if let Some(caps) = MIXED_FRACTION_REGEX.captures(text) {
        let matched = caps.get(0)?;
        let whole: u32 = caps[1].parse().ok()?;
        let numerator: u32 = caps[2].parse().ok()?;
        let denominator: u32 = caps[3].parse().ok()?;
        let quantity = fraction(matched.as_str(), whole, numerator, denominator);
        return Some((quantity, &text[matched.end()..]));
    }

    if let Some(caps) = UNICODE_FRACTION_REGEX.captures(text) {
        let matched = caps.get(0)?;
        let whole: u32 = match caps.get(1) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let symbol = caps[2].chars().next()?;
        let (_, numerator, denominator) = UNICODE_FRACTIONS
            .iter()
            .find(|(c, _, _)| *c == symbol)?;
        let quantity = fraction(matched.as_str(), whole, *numerator, *denominator);
        return Some((quantity, &text[matched.end()..]));
    }

    if let Some(caps) = FRACTION_REGEX.captures(text) {
        let matched = caps.get(0)?;
        let numerator: u32 = caps[1].parse().ok()?;
        let denominator: u32 = caps[2].parse().ok()?;
        let quantity = fraction(matched.as_str(), 0, numerator, denominator);
        return Some((quantity, &text[matched.end()..]));
    }

    if let Some(caps) = NUMBER_REGEX.captures(text) {
        let matched = caps.get(0)?;
        let value = parse_decimal(matched.as_str())?;
        return Some((Quantity::Amount(value), &text[matched.end()..]));
    }

    None
}

fn parse_decimal(text: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(&text.replace(',', ".")).ok()
}

fn fraction(source: &str, whole: u32, numerator: u32, denominator: u32) -> Quantity {
    if denominator == 0 {
        return Quantity::Unparseable(source.trim().to_string());
    }
    let part = BigDecimal::from(numerator) / BigDecimal::from(denominator);
    let value = BigDecimal::from(whole) + part.with_scale_round(FRACTION_PLACES, RoundingMode::HalfUp);
    if value.is_zero() {
        return Quantity::Unparseable(source.trim().to_string());
    }
    Quantity::Amount(value)
}

/// Split off a unit token if the text starts with one
fn take_unit(text: &str) -> (String, &str) {
    for phrase in MULTI_WORD_UNITS.iter() {
        if let Some(head) = text.get(..phrase.len()) {
            let tail = &text[phrase.len()..];
            if head.to_lowercase() == *phrase && starts_at_word_boundary(tail) {
                return (head.to_string(), tail.trim_start());
            }
        }
    }

    if let Some(caps) = UNIT_TOKEN_REGEX.captures(text) {
        if let Some(token) = caps.get(1) {
            if is_known_unit(token.as_str()) {
                return (token.as_str().to_string(), text[token.end()..].trim_start());
            }
        }
    }

    (String::new(), text)
}

fn starts_at_word_boundary(text: &str) -> bool {
    text.chars().next().map_or(true, |c| !c.is_alphanumeric())
}

/// Whether a token is a unit the parser should split from the name
pub fn is_known_unit(token: &str) -> bool {
    let key = token.trim().to_lowercase();
    let key = key.trim_end_matches('.');
    if key.is_empty() {
        return false;
    }
    normalize(key).is_recognized() || EXTRA_KITCHEN_UNITS.contains(key)
}

fn split_vague_quantity(line: &str) -> Option<(&str, &str)> {
    let lower = line.to_lowercase();
    VAGUE_QUANTITIES.iter().find_map(|phrase| {
        if !lower.starts_with(phrase) {
            return None;
        }
        let head = line.get(..phrase.len())?;
        let tail = &line[phrase.len()..];
        if head.to_lowercase() != *phrase || !tail.starts_with(char::is_whitespace) {
            return None;
        }
        Some((head, tail.trim_start()))
    })
}

/// Split "Zwiebel (gewürfelt)" or "Mehl, gesiebt" into name and note
fn split_note(text: &str) -> (String, Option<String>) {
    let text = text.trim();

    if text.ends_with(')') {
        if let Some(open) = text.find('(') {
            let name = text[..open].trim();
            let note = text[open + 1..text.len() - 1].trim();
            if !name.is_empty() {
                return (name.to_string(), non_empty(note));
            }
        }
    }

    if let Some((name, note)) = text.split_once(',') {
        let name = name.trim();
        if !name.is_empty() {
            return (name.to_string(), non_empty(note.trim()));
        }
    }

    (text.to_string(), None)
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
