// src/acquisition/native.rs
use std::path::Path;

use crate::utils::error::AcquisitionError;

/// Reads a document's embedded text layer without rendering pixels.
pub trait NativeExtractor: Send + Sync {
    /// Number of pages, from the document's own metadata.
    fn page_count(&self, path: &Path) -> Result<u32, AcquisitionError>;

    /// Text of every page, in page order. May be empty for scanned documents.
    fn extract_text(&self, path: &Path) -> Result<String, AcquisitionError>;
}

/// Pure Rust extraction through `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl NativeExtractor for LopdfExtractor {
    fn page_count(&self, path: &Path) -> Result<u32, AcquisitionError> {
        let doc = lopdf::Document::load(path)?;
        Ok(doc.get_pages().len() as u32)
    }

    fn extract_text(&self, path: &Path) -> Result<String, AcquisitionError> {
        let doc = lopdf::Document::load(path)?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Ok(String::new());
        }

        let text = doc.extract_text(&pages)?;
        tracing::debug!("Native extraction read {} bytes from {} pages", text.len(), pages.len());
        Ok(text)
    }
}
