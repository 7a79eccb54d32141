// src/extractors/mod.rs
pub mod catalog;
pub mod filter;
pub mod orchestrator;
pub mod section;

// Re-export key extraction types for convenience
pub use catalog::SectionCatalog;
#[allow(unused_imports)]
pub use orchestrator::{Extraction, ExtractionResult, SectionExtractor, SyllabusExtractor};
