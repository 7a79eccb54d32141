// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::ExtractionResult;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the extraction result as `<stem>_sections.json`
    pub fn save_result(&self, stem: &str, result: &ExtractionResult) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_sections.json", stem));

        let json = serde_json::to_string_pretty(result)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json)?;

        tracing::info!("Saved sections to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about the run as `<stem>_meta.json`
    pub fn save_metadata(
        &self,
        stem: &str,
        source_name: &str,
        text_length: usize,
        result: &ExtractionResult,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let found: Vec<&str> = result
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(name, _)| name)
            .collect();

        let metadata = serde_json::json!({
            "source": source_name,
            "text_length": text_length,
            "sections_found": found,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves a plain-text debug artifact as `<stem>_<suffix>.txt`
    pub fn save_text(&self, stem: &str, suffix: &str, text: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_{}.txt", stem, suffix));
        fs::write(&file_path, text)?;
        tracing::info!("Saved {} to {}", suffix, file_path.display());
        Ok(file_path)
    }
}
