// src/acquisition/ocr.rs
//! Page rasterization and text recognition for image-only documents.
//!
//! Both stages shell out to external tools (poppler's `pdftoppm` and `tesseract`);
//! the traits let the acquisition service run against other engines or fakes.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::utils::error::ToolError;

/// Renders one page (1-based) of a document into an image inside `workdir`.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, document: &Path, page: u32, workdir: &Path) -> Result<PathBuf, ToolError>;
}

/// Recognizes text in an image using the given language model (e.g. "eng").
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &Path, language: &str) -> Result<String, ToolError>;
}

#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(binary: &str, dpi: u32) -> Self {
        Self { binary: binary.to_string(), dpi }
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, document: &Path, page: u32, workdir: &Path) -> Result<PathBuf, ToolError> {
        let prefix = workdir.join(format!("page-{}", page));
        let page_arg = page.to_string();

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-singlefile")
            .arg(document)
            .arg(&prefix)
            .output()
            .map_err(|source| ToolError::Spawn { tool: self.binary.clone(), source })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // -singlefile writes exactly <prefix>.png
        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(ToolError::MissingOutput { tool: self.binary.clone(), path: image });
        }
        Ok(image)
    }
}

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
}

impl TesseractRecognizer {
    pub fn new(binary: &str) -> Self {
        Self { binary: binary.to_string() }
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &Path, language: &str) -> Result<String, ToolError> {
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|source| ToolError::Spawn { tool: self.binary.clone(), source })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// A rendered page image, removed from disk when dropped.
#[derive(Debug)]
pub(crate) struct PageImage {
    path: PathBuf,
}

impl PageImage {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PageImage {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!("Removed page image {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove page image {}: {}", self.path.display(), e),
        }
    }
}
