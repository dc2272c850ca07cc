//! # Meal Planner
//!
//! Recipe collection, weekly meal plan and shopping list with a
//! servings-aware scaling engine. Recipes are imported from web pages,
//! text, PDFs and photos (OCR), stored in SQLite, and scaled to any number
//! of servings with kitchen-friendly rounding.

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod import;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod localization;
pub mod measurement_patterns;
pub mod ocr;
pub mod ocr_config;
pub mod planner;
pub mod rounding;
pub mod scaling;
pub mod shopping_list;
pub mod text_processing;
pub mod unit_normalizer;
