//! # OCR Configuration Module
//!
//! Limits and parameters for reading recipe photos and screenshots.

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "deu+eng";
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for image files
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration structure for OCR processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g., "deu+eng", "eng")
    pub languages: String,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// Maximum allowed image size in bytes
    pub max_file_size: u64,
    /// Upper bound for a single recognition run
    pub timeout_secs: u64,
}

impl OcrConfig {
    pub fn with_languages(mut self, languages: &str) -> Self {
        self.languages = languages.to_string();
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
