// src/acquisition/mod.rs
pub mod document;
pub mod native;
pub mod ocr;

use std::path::Path;

pub use document::Document;
pub use native::{LopdfExtractor, NativeExtractor};
pub use ocr::{PdftoppmRasterizer, Rasterizer, Recognizer, TesseractRecognizer};

use crate::utils::error::AcquisitionError;
use ocr::PageImage;

// Some extractors hand back the raw container instead of decoded text.
const RAW_PDF_MARKER: &str = "%PDF";

/// Best-effort plain text of a document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText(String);

impl AcquiredText {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tunables for the OCR fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub language: String,
    pub dpi: u32,
    pub pdftoppm: String,
    pub tesseract: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 300,
            pdftoppm: "pdftoppm".to_string(),
            tesseract: "tesseract".to_string(),
        }
    }
}

/// Chooses between the native text layer and page-by-page OCR.
pub struct TextAcquisition {
    native: Box<dyn NativeExtractor>,
    rasterizer: Box<dyn Rasterizer>,
    recognizer: Box<dyn Recognizer>,
    language: String,
}

impl TextAcquisition {
    pub fn new(
        native: Box<dyn NativeExtractor>,
        rasterizer: Box<dyn Rasterizer>,
        recognizer: Box<dyn Recognizer>,
        language: &str,
    ) -> Self {
        Self {
            native,
            rasterizer,
            recognizer,
            language: language.to_string(),
        }
    }

    /// lopdf for the text layer, pdftoppm + tesseract for the fallback.
    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(
            Box::new(LopdfExtractor),
            Box::new(PdftoppmRasterizer::new(&config.pdftoppm, config.dpi)),
            Box::new(TesseractRecognizer::new(&config.tesseract)),
            &config.language,
        )
    }

    pub fn acquire(&self, document: &Document) -> Result<AcquiredText, AcquisitionError> {
        let path = document.path();
        let native = self.native.extract_text(path)?;

        if !needs_ocr(&native) {
            tracing::info!("Using native text layer for '{}' ({} bytes)", document.label(), native.len());
            return Ok(AcquiredText::new(native));
        }

        tracing::info!("Native extraction of '{}' yielded no usable text, falling back to OCR", document.label());
        let pages = self.native.page_count(path)?;
        let text = self.ocr_pages(path, pages)?;

        if text.trim().is_empty() {
            return Err(AcquisitionError::NoText);
        }
        tracing::info!("OCR recognized {} bytes across {} pages of '{}'", text.len(), pages, document.label());
        Ok(AcquiredText::new(text))
    }

    /// Pages 1..=pages in order. At most one page image exists on disk at a time.
    fn ocr_pages(&self, path: &Path, pages: u32) -> Result<String, AcquisitionError> {
        let workdir = tempfile::Builder::new().prefix("syllabus-ocr-").tempdir()?;
        let mut text = String::new();

        for page in 1..=pages {
            let image = self
                .rasterizer
                .rasterize(path, page, workdir.path())
                .map(PageImage::new)
                .map_err(|source| AcquisitionError::Rasterize { page, source })?;

            let recognized = self
                .recognizer
                .recognize(image.path(), &self.language)
                .map_err(|source| AcquisitionError::Recognize { page, source })?;
            drop(image);

            tracing::debug!("OCR page {}/{}: {} bytes", page, pages, recognized.len());
            text.push_str(&recognized);
            text.push('\n');
        }

        Ok(text)
    }
}

/// True when the native result is empty or is the raw container header.
fn needs_ocr(native: &str) -> bool {
    let trimmed = native.trim();
    trimmed.is_empty() || trimmed.starts_with(RAW_PDF_MARKER)
}
