// src/extractors/orchestrator.rs

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::acquisition::{AcquiredText, Document, TextAcquisition};
use crate::extractors::catalog::SectionCatalog;
use crate::extractors::filter::PostFilter;
use crate::extractors::section::SectionLocator;
use crate::utils::error::{AcquisitionError, CatalogError};

// --- Data Structures ---

/// Section name -> extracted text, in catalog order. Values are never empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    entries: Vec<(String, Option<String>)>,
}

impl ExtractionResult {
    /// The extracted text for `name`; None when absent or not in the catalog.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn found_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }
}

// Flat JSON object, keys in catalog order, null for missing sections.
impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The acquired text alongside what was extracted from it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: AcquiredText,
    pub sections: ExtractionResult,
}

struct CompiledSection {
    name: String,
    locator: SectionLocator,
    filter: Option<PostFilter>,
}

// --- Section Extraction over plain text ---

/// Runs every catalog section through its locator and post-filter.
pub struct SectionExtractor {
    sections: Vec<CompiledSection>,
}

impl SectionExtractor {
    pub fn new(catalog: &SectionCatalog) -> Result<Self, CatalogError> {
        let sections = catalog
            .specs()
            .iter()
            .map(|spec| -> Result<CompiledSection, CatalogError> {
                Ok(CompiledSection {
                    name: spec.name.clone(),
                    locator: SectionLocator::for_spec(spec)?,
                    filter: spec.filter,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sections })
    }

    pub fn extract_sections(&self, text: &str) -> ExtractionResult {
        let entries = self
            .sections
            .iter()
            .map(|section| {
                let located = section.locator.locate(text);
                let value = match (located, section.filter) {
                    (Some(body), Some(filter)) => {
                        let filtered = filter.apply(&body);
                        tracing::debug!("Applied '{}' filter to '{}': {} -> {} bytes", filter.name(), section.name, body.len(), filtered.len());
                        Some(filtered).filter(|f| !f.trim().is_empty())
                    }
                    (located, _) => located,
                };

                if value.is_none() {
                    tracing::info!("Section '{}' not found", section.name);
                }
                (section.name.clone(), value)
            })
            .collect();

        ExtractionResult { entries }
    }
}

// --- Document Pipeline ---

/// Stateless per-request pipeline: document -> text -> sections. Built once per process.
pub struct SyllabusExtractor {
    acquisition: TextAcquisition,
    sections: SectionExtractor,
}

impl SyllabusExtractor {
    pub fn new(catalog: &SectionCatalog, acquisition: TextAcquisition) -> Result<Self, CatalogError> {
        Ok(Self {
            acquisition,
            sections: SectionExtractor::new(catalog)?,
        })
    }

    /// Consumes the document; its temp file is gone when this returns, on success or error.
    pub fn extract(&self, document: Document) -> Result<ExtractionResult, AcquisitionError> {
        self.extract_detailed(document).map(|extraction| extraction.sections)
    }

    pub fn extract_detailed(&self, document: Document) -> Result<Extraction, AcquisitionError> {
        // On error the document is dropped here, which deletes it.
        let text = self.acquisition.acquire(&document)?;
        let sections = self.sections.extract_sections(text.as_str());

        tracing::info!("Extracted {}/{} sections from '{}'", sections.found_count(), sections.entries.len(), document.label());
        document.discard();
        Ok(Extraction { text, sections })
    }
}
