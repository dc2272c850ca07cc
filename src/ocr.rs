//! # OCR Module
//!
//! Reads recipe photos and screenshots with Tesseract. Input bytes are checked
//! for a supported format and size, decoded with the `image` crate and handed
//! to Tesseract as PNG, so formats Leptonica cannot read itself (WebP) still
//! work. Recognition runs on the blocking thread pool under a timeout.

use leptess::LepTess;
use log::{debug, info, warn};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use crate::errors::OcrError;
use crate::ocr_config::OcrConfig;

/// Validate image bytes before running OCR
pub fn validate_image_bytes(bytes: &[u8], config: &OcrConfig) -> Result<image::ImageFormat, OcrError> {
    if bytes.len() < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "Image too small to detect format ({} bytes)",
            bytes.len()
        )));
    }
    if bytes.len() as u64 > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "Image too large: {} bytes (limit {} bytes)",
            bytes.len(),
            config.max_file_size
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| OcrError::Validation(format!("Unknown image format: {e}")))?;

    if is_supported_format(format) {
        debug!("Detected supported image format: {:?}", format);
        Ok(format)
    } else {
        Err(OcrError::Validation(format!(
            "Unsupported image format: {format:?}"
        )))
    }
}

/// Formats accepted for OCR
pub fn is_supported_format(format: image::ImageFormat) -> bool {
    matches!(
        format,
        image::ImageFormat::Png
            | image::ImageFormat::Jpeg
            | image::ImageFormat::Bmp
            | image::ImageFormat::Tiff
            | image::ImageFormat::WebP
    )
}

/// Decode any supported format and re-encode it as PNG
fn to_png(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| OcrError::ImageLoad(format!("Failed to decode image: {e}")))?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| OcrError::ImageLoad(format!("Failed to convert image: {e}")))?;
    Ok(png.into_inner())
}

fn run_tesseract(png: &[u8], languages: &str) -> Result<String, OcrError> {
    let mut tess = LepTess::new(None, languages)
        .map_err(|e| OcrError::Initialization(format!("Failed to initialize Tesseract OCR: {e}")))?;

    tess.set_image_from_mem(png)
        .map_err(|e| OcrError::ImageLoad(format!("Failed to load image for OCR: {e}")))?;

    tess.get_utf8_text()
        .map_err(|e| OcrError::Extraction(format!("Failed to extract text from image: {e}")))
}

/// Extract text from image bytes
pub async fn extract_text_from_bytes(bytes: Vec<u8>, config: &OcrConfig) -> Result<String, OcrError> {
    let format = validate_image_bytes(&bytes, config)?;
    info!(
        "Starting OCR ({}) on {:?} image of {} bytes",
        config.languages,
        format,
        bytes.len()
    );

    let languages = config.languages.clone();
    let task = tokio::task::spawn_blocking(move || {
        let png = to_png(&bytes)?;
        run_tesseract(&png, &languages)
    });

    let extracted = match tokio::time::timeout(Duration::from_secs(config.timeout_secs), task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_error)) => {
            return Err(OcrError::Extraction(format!("OCR task failed: {join_error}")))
        }
        Err(_) => {
            warn!("OCR timed out after {} seconds", config.timeout_secs);
            return Err(OcrError::Timeout(format!(
                "OCR did not finish within {} seconds",
                config.timeout_secs
            )));
        }
    };

    // Clean up the extracted text (remove extra whitespace and empty lines)
    let cleaned_text = extracted
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    info!(
        "OCR extraction completed. Extracted {} characters of text",
        cleaned_text.len()
    );
    Ok(cleaned_text)
}

/// Extract text from an image file
pub async fn extract_text_from_image(path: &Path, config: &OcrConfig) -> Result<String, OcrError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        OcrError::Validation(format!("Cannot read image file {}: {e}", path.display()))
    })?;
    extract_text_from_bytes(bytes, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_png_header_is_accepted() {
        let format = validate_image_bytes(PNG_HEADER, &OcrConfig::default()).unwrap();
        assert_eq!(format, image::ImageFormat::Png);
    }

    #[test]
    fn test_too_few_bytes_rejected() {
        let result = validate_image_bytes(&[0x89, 0x50], &OcrConfig::default());
        assert!(matches!(result, Err(OcrError::Validation(_))));
    }

    #[test]
    fn test_size_limit() {
        let config = OcrConfig {
            max_file_size: 10,
            ..OcrConfig::default()
        };
        let result = validate_image_bytes(PNG_HEADER, &config);
        assert!(matches!(result, Err(OcrError::Validation(msg)) if msg.contains("too large")));
    }

    #[test]
    fn test_text_is_not_an_image() {
        let result = validate_image_bytes(b"Zutaten: 200 g Mehl", &OcrConfig::default());
        assert!(matches!(result, Err(OcrError::Validation(_))));
    }

    #[test]
    fn test_gif_is_unsupported() {
        assert!(!is_supported_format(image::ImageFormat::Gif));
        assert!(is_supported_format(image::ImageFormat::WebP));
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_before_tesseract() {
        let result = extract_text_from_bytes(PNG_HEADER.to_vec(), &OcrConfig::default()).await;
        assert!(matches!(result, Err(OcrError::ImageLoad(_))));
    }
}
