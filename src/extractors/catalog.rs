// src/extractors/catalog.rs

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::extractors::filter::PostFilter;
use crate::utils::error::CatalogError;

/// One target section: headings are tried in order, boundaries terminate the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub headings: Vec<String>,
    #[serde(default)]
    pub boundaries: Vec<String>, // Empty means "use the heading-like line heuristic"
    #[serde(default)]
    pub filter: Option<PostFilter>,
}

impl SectionSpec {
    fn new(name: &str, headings: &[&str], boundaries: &[&str], filter: Option<PostFilter>) -> Self {
        Self {
            name: name.to_string(),
            headings: headings.iter().map(|h| h.to_string()).collect(),
            boundaries: boundaries.iter().map(|b| b.to_string()).collect(),
            filter,
        }
    }
}

/// Ordered, immutable list of sections. Order is the output key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCatalog {
    specs: Vec<SectionSpec>,
}

impl Default for SectionCatalog {
    fn default() -> Self {
        Self {
            specs: vec![
                SectionSpec::new("Late Policy", &["Homework:"], &[], Some(PostFilter::LatePolicy)),
                SectionSpec::new(
                    "Grading Policy",
                    &["Grading Scale:", "Grading Scale"],
                    &["Attendance", "Course Policies"],
                    None,
                ),
                SectionSpec::new(
                    "Grading Weights",
                    &["Grade Evaluation:", "Grade Evaluation", "Graded Work:", "Graded Work"],
                    &["Grading Scale"],
                    None,
                ),
            ],
        }
    }
}

impl SectionCatalog {
    /// Builds a catalog, rejecting configurations that could never extract anything sensible.
    pub fn new(specs: Vec<SectionSpec>) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.headings.iter().all(|h| h.trim().is_empty()) {
                return Err(CatalogError::NoHeadings(spec.name.clone()));
            }
            if spec.boundaries.iter().any(|b| b.trim().is_empty()) {
                return Err(CatalogError::EmptyBoundary(spec.name.clone()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(CatalogError::DuplicateSection(spec.name.clone()));
            }
        }

        Ok(Self { specs })
    }

    /// Parses a JSON array of section specs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let specs: Vec<SectionSpec> = serde_json::from_str(json)?;
        Self::new(specs)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&json)?;
        tracing::info!("Loaded {} section specs from {}", catalog.len(), path.as_ref().display());
        Ok(catalog)
    }

    pub fn specs(&self) -> &[SectionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order_and_contents() {
        let catalog = SectionCatalog::default();
        let names: Vec<&str> = catalog.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Late Policy", "Grading Policy", "Grading Weights"]);

        let late = &catalog.specs()[0];
        assert_eq!(late.headings, ["Homework:"]);
        assert!(late.boundaries.is_empty());
        assert_eq!(late.filter, Some(PostFilter::LatePolicy));

        let weights = &catalog.specs()[2];
        assert_eq!(weights.headings.len(), 4);
        assert_eq!(weights.boundaries, ["Grading Scale"]);
    }

    #[test]
    fn test_json_catalog_with_optional_fields() {
        let json = r#"[
            {"name": "Office Hours", "headings": ["Office Hours:"]},
            {"name": "Late Work", "headings": ["Late Work"], "boundaries": ["Exams"], "filter": "late_policy"}
        ]"#;
        let catalog = SectionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
        assert!(catalog.specs()[0].boundaries.is_empty());
        assert_eq!(catalog.specs()[1].filter, Some(PostFilter::LatePolicy));
    }

    #[test]
    fn test_unknown_filter_is_rejected_at_load() {
        let json = r#"[{"name": "X", "headings": ["X:"], "filter": "shout"}]"#;
        assert!(matches!(SectionCatalog::from_json(json), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_invalid_catalogs() {
        assert!(matches!(SectionCatalog::new(vec![]), Err(CatalogError::Empty)));

        let no_headings = r#"[{"name": "X", "headings": []}]"#;
        assert!(matches!(SectionCatalog::from_json(no_headings), Err(CatalogError::NoHeadings(_))));

        let dup = r#"[{"name": "X", "headings": ["A"]}, {"name": "X", "headings": ["B"]}]"#;
        assert!(matches!(SectionCatalog::from_json(dup), Err(CatalogError::DuplicateSection(_))));

        let blank_boundary = r#"[{"name": "X", "headings": ["X:"], "boundaries": ["Exams", " "]}]"#;
        assert!(matches!(SectionCatalog::from_json(blank_boundary), Err(CatalogError::EmptyBoundary(_))));
    }
}
