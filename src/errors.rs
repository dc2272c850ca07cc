//! # Error Types Module
//!
//! Typed errors for the scaling core, the importers, OCR and configuration.
//! Application glue (database, CLI) wraps these in `anyhow::Error`.

use thiserror::Error;

/// Errors raised by the scaling engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// Base or target servings are not positive
    #[error("Invalid recipe data: {0}")]
    InvalidRecipeData(String),
}

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    /// File validation errors (unsupported format, too large, empty)
    #[error("Validation error: {0}")]
    Validation(String),
    /// OCR engine initialization errors
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Image loading errors
    #[error("Image load error: {0}")]
    ImageLoad(String),
    /// Text extraction errors
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),
}

/// Errors raised by the recipe importers
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Server answered {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("No recipe content found")]
    NoContent,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import cancelled")]
    Cancelled,
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Could not read rounding policy file: {0}")]
    PolicyFile(#[from] std::io::Error),

    #[error("Invalid rounding policy: {0}")]
    PolicyFormat(#[from] serde_json::Error),
}
