//! Recipe import adapters
//!
//! Every adapter produces a loosely typed [`ImportedRecipe`]; conversion into
//! the strict [`NewRecipe`] happens in one place, [`ImportedRecipe::into_new_recipe`].
//!
//! - `url`: web pages, JSON-LD first, page text as fallback
//! - `pdf`: text layer of PDF files
//! - text and images are handled here directly

pub mod pdf;
pub mod url;

use std::future::Future;
use std::path::Path;

use log::{info, warn};

use crate::errors::ImportError;
use crate::ingredient_model::{NewRecipe, RecipeSource};
use crate::ingredient_parser::{extract_servings, parse_ingredient_lines};
use crate::localization::t_lang;
use crate::ocr;
use crate::ocr_config::OcrConfig;
use crate::text_processing::{clean_lines, guess_sections, title_from_lines};

pub use pdf::{from_pdf, from_pdf_bytes};
pub use url::{extract_from_html, from_url};

/// Longest title stored for a recipe
pub const MAX_TITLE_LEN: usize = 255;

/// Recipe as delivered by an importer, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecipe {
    pub source: RecipeSource,
    pub title: Option<String>,
    /// Servings text as found ("4 Portionen", "Serves 6")
    pub servings: Option<String>,
    pub total_time: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub raw_text: Option<String>,
}

impl ImportedRecipe {
    pub fn new(source: RecipeSource) -> Self {
        Self {
            source,
            title: None,
            servings: None,
            total_time: None,
            image_url: None,
            source_url: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            raw_text: None,
        }
    }

    /// Validate and convert into a recipe ready to store
    ///
    /// An empty title becomes the localized fallback for the source, a title
    /// longer than [`MAX_TITLE_LEN`] characters is cut. Servings that cannot
    /// be read fall back to `default_servings`.
    pub fn into_new_recipe(self, default_servings: u32, language_code: Option<&str>) -> NewRecipe {
        let title = self
            .title
            .as_deref()
            .and_then(validate_title)
            .unwrap_or_else(|| t_lang(fallback_title_key(self.source), language_code));

        let base_servings = self
            .servings
            .as_deref()
            .and_then(extract_servings)
            .unwrap_or(default_servings.max(1));

        let ingredients = parse_ingredient_lines(self.ingredients.as_slice());
        if ingredients.is_empty() {
            warn!("Imported recipe '{}' has no ingredient lines", title);
        }

        NewRecipe {
            title,
            base_servings,
            ingredients,
            steps: self
                .steps
                .into_iter()
                .map(|step| step.trim().to_string())
                .filter(|step| !step.is_empty())
                .collect(),
            source: self.source,
            source_url: self.source_url,
            total_time: self.total_time.filter(|t| !t.trim().is_empty()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            raw_text: self.raw_text,
        }
    }
}

/// Trimmed title, cut to [`MAX_TITLE_LEN`] characters; `None` when empty
pub fn validate_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_TITLE_LEN).collect())
}

fn fallback_title_key(source: RecipeSource) -> &'static str {
    match source {
        RecipeSource::Text => "title-text",
        RecipeSource::Pdf => "title-pdf",
        RecipeSource::Image => "title-ocr",
        RecipeSource::Url | RecipeSource::Manual => "title-untitled",
    }
}

/// Build an imported recipe from unstructured text
pub(crate) fn from_plain_text(text: &str, source: RecipeSource) -> Result<ImportedRecipe, ImportError> {
    let lines = clean_lines(text);
    if lines.is_empty() {
        return Err(ImportError::NoContent);
    }
    let sections = guess_sections(&lines);

    let mut recipe = ImportedRecipe::new(source);
    recipe.title = title_from_lines(&lines);
    recipe.ingredients = sections.ingredients;
    recipe.steps = sections.steps;
    recipe.raw_text = Some(text.to_string());
    Ok(recipe)
}

/// Import pasted or piped text
pub fn from_text(text: &str) -> Result<ImportedRecipe, ImportError> {
    info!("Importing recipe from {} characters of text", text.len());
    from_plain_text(text, RecipeSource::Text)
}

/// Import one recipe from one or more photos; texts are combined in order
pub async fn from_images<P: AsRef<Path>>(
    paths: &[P],
    config: &OcrConfig,
) -> Result<ImportedRecipe, ImportError> {
    let mut texts = Vec::with_capacity(paths.len());
    for path in paths {
        let text = ocr::extract_text_from_image(path.as_ref(), config).await?;
        texts.push(text);
    }
    from_plain_text(&texts.join("\n"), RecipeSource::Image)
}

/// Race an import against Ctrl-C
///
/// On Ctrl-C the import future is dropped. Blocking work it already handed to
/// the thread pool (OCR, PDF parsing) runs to completion in the background and
/// its result is discarded.
pub async fn run_cancellable<F, T>(import: F) -> Result<T, ImportError>
where
    F: Future<Output = Result<T, ImportError>>,
{
    tokio::select! {
        result = import => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Import cancelled by user");
            Err(ImportError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::Quantity;

    #[test]
    fn test_title_validation() {
        assert_eq!(validate_title("  Gulasch  "), Some("Gulasch".to_string()));
        assert_eq!(validate_title("   "), None);
        let long = "a".repeat(300);
        assert_eq!(validate_title(&long).unwrap().chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_fallback_title_and_servings() {
        let mut imported = ImportedRecipe::new(RecipeSource::Image);
        imported.ingredients = vec!["200 g Mehl".to_string()];
        let recipe = imported.into_new_recipe(2, Some("de"));
        assert_eq!(recipe.title, "OCR Rezept");
        assert_eq!(recipe.base_servings, 2);
        assert_eq!(recipe.ingredients[0].quantity, Some(Quantity::amount(200)));
    }

    #[test]
    fn test_servings_text_is_parsed() {
        let mut imported = ImportedRecipe::new(RecipeSource::Url);
        imported.title = Some("Lasagne".to_string());
        imported.servings = Some("6 Portionen".to_string());
        let recipe = imported.into_new_recipe(2, Some("en"));
        assert_eq!(recipe.base_servings, 6);
        assert_eq!(recipe.title, "Lasagne");
    }

    #[test]
    fn test_from_text() {
        let imported = from_text("Pfannkuchen\nZutaten\n- 200 g Mehl\n- 2 Eier\nZubereitung\nVerrühren.").unwrap();
        assert_eq!(imported.title.as_deref(), Some("Pfannkuchen"));
        assert_eq!(imported.ingredients, vec!["200 g Mehl", "2 Eier"]);
        assert_eq!(imported.steps, vec!["Verrühren."]);
    }

    #[test]
    fn test_empty_text_has_no_content() {
        assert!(matches!(from_text(" \n \n"), Err(ImportError::NoContent)));
    }

    #[tokio::test]
    async fn test_run_cancellable_passes_result_through() {
        let result = run_cancellable(async { Ok::<_, ImportError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
