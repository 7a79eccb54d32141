// src/utils/text_debug.rs
use regex::Regex;

use crate::extractors::SectionCatalog;
use crate::utils::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Heading,
    Boundary,
}

impl MarkerKind {
    fn label(&self) -> &'static str {
        match self {
            MarkerKind::Heading => "heading",
            MarkerKind::Boundary => "boundary",
        }
    }
}

/// Inserts `[[kind:literal]]` markers at the given byte offsets.
pub fn mark_positions(text: &str, markers: &[(usize, String)]) -> String {
    let mut sorted = markers.to_vec();
    sorted.sort_by_key(|m| m.0); // Stable, so equal offsets keep insertion order

    let mut out = String::with_capacity(text.len() + sorted.len() * 24);
    let mut last_pos = 0;
    for (pos, marker) in sorted {
        if pos < last_pos || pos > text.len() || !text.is_char_boundary(pos) {
            continue;
        }
        out.push_str(&text[last_pos..pos]);
        out.push_str(&marker);
        last_pos = pos;
    }
    out.push_str(&text[last_pos..]);
    out
}

/// Annotates every heading and boundary occurrence the catalog knows about,
/// so a failed extraction can be diagnosed by eye.
pub fn annotate(text: &str, catalog: &SectionCatalog) -> Result<String, CatalogError> {
    let mut literals: Vec<(MarkerKind, &str)> = Vec::new();
    for spec in catalog.specs() {
        literals.extend(spec.headings.iter().map(|h| (MarkerKind::Heading, h.as_str())));
        literals.extend(spec.boundaries.iter().map(|b| (MarkerKind::Boundary, b.as_str())));
    }
    literals.dedup();

    let mut markers = Vec::new();
    for (kind, literal) in literals {
        if literal.trim().is_empty() {
            continue;
        }
        let pattern = match kind {
            MarkerKind::Heading => format!("(?i){}", regex::escape(literal)),
            MarkerKind::Boundary => format!("(?im)^{}", regex::escape(literal)),
        };
        let re = Regex::new(&pattern)?;
        for mat in re.find_iter(text) {
            markers.push((mat.start(), format!("[[{}:{}]]", kind.label(), literal)));
        }
    }

    tracing::debug!("Annotated {} heading/boundary hits", markers.len());
    Ok(mark_positions(text, &markers))
}
