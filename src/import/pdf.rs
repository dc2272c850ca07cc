//! PDF import: text layer extraction with `pdf-extract`

use std::path::Path;

use log::info;

use super::{from_plain_text, ImportedRecipe};
use crate::errors::ImportError;
use crate::ingredient_model::RecipeSource;

/// Import a recipe from PDF bytes
///
/// Parsing runs on the blocking thread pool. Scanned PDFs without a text
/// layer yield [`ImportError::NoContent`].
pub async fn from_pdf_bytes(bytes: Vec<u8>) -> Result<ImportedRecipe, ImportError> {
    info!("Extracting text from PDF of {} bytes", bytes.len());

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ImportError::Pdf(format!("PDF task failed: {e}")))?
        .map_err(|e| ImportError::Pdf(e.to_string()))?;

    info!("Extracted {} characters from PDF", text.len());
    from_plain_text(&text, RecipeSource::Pdf)
}

/// Import a recipe from a PDF file
pub async fn from_pdf(path: &Path) -> Result<ImportedRecipe, ImportError> {
    let bytes = tokio::fs::read(path).await?;
    from_pdf_bytes(bytes).await
}
