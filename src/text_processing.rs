//! # Text Processing Module
//!
//! Turns unstructured recipe text (pasted text, PDF text, OCR output, the
//! readable text of a web page) into an ingredient block and a list of
//! preparation steps.
//!
//! ## Features
//!
//! - Whitespace cleanup and blank line removal
//! - Section detection by German, English and French headers
//!   ("Zutaten", "Ingredients", "Ingrédients" / "Zubereitung", "Directions", ...)
//! - Bullet and numbering removal ("-", "•", "*", "1.")
//! - Fallback to the first bulleted block when no headers are present

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

lazy_static! {
    static ref INGREDIENTS_HEADER: Regex =
        Regex::new(r"(?i)^(zutaten|ingredients|ingrédients)\b")
            .expect("Ingredients header pattern should be valid");
    static ref STEPS_HEADER: Regex = Regex::new(
        r"(?i)^(zubereitung|anleitung|directions|instructions|method|préparation)\b"
    )
    .expect("Steps header pattern should be valid");
    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-•*\u{2023}\u{2043}]|\d+\.)\s+")
        .expect("Bullet pattern should be valid");
    static ref STARTS_WITH_QUANTITY: Regex = Regex::new(r"^[\d¼½¾⅓⅔⅛⅜⅝⅞]")
        .expect("Quantity prefix pattern should be valid");
    static ref WHITESPACE: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Lines that look like prose rather than an ingredient end the ingredient block
const PROSE_MIN_WORDS: usize = 4;

/// Maximum title length taken from the first line of free text
pub const MAX_TITLE_CHARS: usize = 120;

/// Ingredient and step sections found in a text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSections {
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Preamble,
    Ingredients,
    Steps,
}

/// Collapse whitespace inside lines and drop empty lines
pub fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| WHITESPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Remove a leading bullet or "1." numbering
pub fn strip_bullet(line: &str) -> String {
    BULLET.replace(line, "").into_owned()
}

/// Title candidate: the first line, truncated on a character boundary
pub fn title_from_lines(lines: &[String]) -> Option<String> {
    lines
        .first()
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
}

/// Split cleaned lines into ingredients and steps
pub fn guess_sections(lines: &[String]) -> RecipeSections {
    let mut sections = RecipeSections::default();
    let mut mode = Mode::Preamble;

    for line in lines {
        if INGREDIENTS_HEADER.is_match(line) {
            trace!("Ingredients header: {}", line);
            mode = Mode::Ingredients;
            continue;
        }
        if STEPS_HEADER.is_match(line) {
            trace!("Steps header: {}", line);
            mode = Mode::Steps;
            continue;
        }

        if mode == Mode::Ingredients {
            if BULLET.is_match(line)
                || STARTS_WITH_QUANTITY.is_match(line)
                || line.split_whitespace().count() < PROSE_MIN_WORDS
            {
                sections.ingredients.push(strip_bullet(line));
                continue;
            }
            mode = Mode::Steps;
        }

        if mode == Mode::Steps {
            sections.steps.push(strip_bullet(line));
        }
    }

    if sections.ingredients.is_empty() {
        sections = first_bullet_block(lines);
    }

    debug!(
        "Guessed {} ingredient lines and {} steps from {} lines",
        sections.ingredients.len(),
        sections.steps.len(),
        lines.len()
    );

    sections
}

/// Without headers, the first run of bulleted lines is the ingredient list and
/// everything after it the steps
fn first_bullet_block(lines: &[String]) -> RecipeSections {
    let start = match lines.iter().position(|line| BULLET.is_match(line)) {
        Some(start) => start,
        None => return RecipeSections::default(),
    };
    let end = lines[start..]
        .iter()
        .position(|line| !BULLET.is_match(line))
        .map_or(lines.len(), |offset| start + offset);

    RecipeSections {
        ingredients: lines[start..end].iter().map(|l| strip_bullet(l)).collect(),
        steps: lines[end..].iter().map(|l| strip_bullet(l)).collect(),
    }
}
