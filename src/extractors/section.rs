// src/extractors/section.rs

// --- Imports ---
use crate::extractors::catalog::SectionSpec;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Fallback terminator when a section lists no boundaries: the next line that
// opens with a capitalized word followed by a lowercase word ("Office hours are ...").
// Case-sensitive on purpose; this is only an approximation of "next heading".
static HEADING_LIKE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[A-Z][a-z]*[ \t]+[a-z]").expect("Failed to compile HEADING_LIKE_LINE_RE")
});

// Colon and whitespace runs between a heading and its body.
const SEPARATOR: &str = r"[:\s]+";

#[derive(Debug, Clone, Copy)]
enum Pass {
    Boundaries,
    Heuristic,
}

/// Locates one section inside unstructured text.
/// Patterns are compiled once, at construction, from the section's literals.
#[derive(Debug)]
pub struct SectionLocator {
    headings: Vec<(String, Regex)>,
    boundary: Option<Regex>, // None when the section lists no boundaries
}

impl SectionLocator {
    pub fn new(headings: &[String], boundaries: &[String]) -> Result<Self, regex::Error> {
        let headings = headings
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| -> Result<(String, Regex), regex::Error> {
                let re = Regex::new(&format!("(?i)({}){}", regex::escape(h), SEPARATOR))?;
                Ok((h.clone(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let boundaries: Vec<&String> = boundaries.iter().filter(|b| !b.trim().is_empty()).collect();
        let boundary = if boundaries.is_empty() {
            None
        } else {
            let alternation = boundaries
                .iter()
                .map(|b| regex::escape(b))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\n(?:{})", alternation))?)
        };

        Ok(Self { headings, boundary })
    }

    pub fn for_spec(spec: &SectionSpec) -> Result<Self, regex::Error> {
        Self::new(&spec.headings, &spec.boundaries)
    }

    /// Returns the trimmed, non-empty body of the section, or None when no heading variant yields one.
    ///
    /// Headings are tried in listed order against the boundary-aware pass first; only when
    /// every heading fails there is the same list retried with the heading-like line heuristic.
    pub fn locate(&self, text: &str) -> Option<String> {
        if let Some(found) = self.run_pass(text, Pass::Boundaries) {
            return Some(found);
        }
        // Without listed boundaries the first pass already used the heuristic.
        if self.boundary.is_some() {
            return self.run_pass(text, Pass::Heuristic);
        }
        None
    }

    fn run_pass(&self, text: &str, pass: Pass) -> Option<String> {
        // Listed boundaries are searched from the heading literal, so a boundary line directly
        // under the heading ends the body at once. The heuristic starts past the separator run,
        // otherwise the newline after a heading on its own line would end every body.
        let (terminator, from_heading): (&Regex, bool) = match (pass, &self.boundary) {
            (Pass::Boundaries, Some(re)) => (re, true),
            _ => (&*HEADING_LIKE_LINE_RE, false),
        };

        for (heading, re) in &self.headings {
            // Earliest occurrence wins; later ones only matter if it has an empty body.
            for caps in re.captures_iter(text) {
                let (Some(m), Some(literal)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let body_start = m.end();
                let search_from = if from_heading { literal.end() } else { body_start };
                let body_end = terminator
                    .find_at(text, search_from)
                    .map(|b| b.start())
                    .unwrap_or(text.len());

                if body_end <= body_start {
                    tracing::trace!("Heading '{}' at {} is immediately terminated", heading, m.start());
                    continue;
                }

                let body = text[body_start..body_end].trim();
                if body.is_empty() {
                    continue;
                }

                tracing::debug!("Matched heading '{}' at offset {} ({:?} pass, {} bytes)", heading, m.start(), pass, body.len());
                return Some(body.to_string());
            }
        }

        None
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn locator(headings: &[&str], boundaries: &[&str]) -> SectionLocator {
        let headings: Vec<String> = headings.iter().map(|s| s.to_string()).collect();
        let boundaries: Vec<String> = boundaries.iter().map(|s| s.to_string()).collect();
        SectionLocator::new(&headings, &boundaries).unwrap()
    }

    #[test]
    fn test_boundary_excludes_boundary_line_and_rest() {
        let text = "Intro\nGrading Scale: A=90-100, B=80-89\nC=70-79\nAttendance: mandatory\nMore text";
        let found = locator(&["Grading Scale:", "Grading Scale"], &["Attendance", "Course Policies"]).locate(text);
        assert_eq!(found.as_deref(), Some("A=90-100, B=80-89\nC=70-79"));
    }

    #[test]
    fn test_earliest_boundary_wins_regardless_of_list_order() {
        let text = "Grading Scale: A=90\nCourse Policies: be nice\nAttendance: required";
        let found = locator(&["Grading Scale"], &["Attendance", "Course Policies"]).locate(text);
        assert_eq!(found.as_deref(), Some("A=90"));
    }

    #[test]
    fn test_missing_heading_returns_none() {
        let text = "Welcome to the course.\nAttendance: mandatory";
        assert_eq!(locator(&["Grade Evaluation:", "Graded Work"], &["Grading Scale"]).locate(text), None);
        assert_eq!(locator(&["Homework:"], &[]).locate(""), None);
    }

    #[test]
    fn test_heading_match_is_case_insensitive() {
        let text = "GRADING SCALE: A=90-100\nATTENDANCE: yes";
        let found = locator(&["Grading Scale"], &["Attendance"]).locate(text);
        assert_eq!(found.as_deref(), Some("A=90-100"));
    }

    #[test]
    fn test_heading_order_beats_document_order() {
        let text = "Graded Work: quizzes 20%\nGrade Evaluation: exams 80%\nGrading Scale: A=90";
        let found = locator(&["Grade Evaluation", "Graded Work"], &["Grading Scale"]).locate(text);
        assert_eq!(found.as_deref(), Some("exams 80%"));
    }

    #[test]
    fn test_default_boundary_stops_at_heading_like_line() {
        let text = "Homework: Late work loses 5% per day\nno exceptions\nOffice hours are on Monday";
        let found = locator(&["Homework:"], &[]).locate(text);
        assert_eq!(found.as_deref(), Some("Late work loses 5% per day\nno exceptions"));
    }

    #[test]
    fn test_body_runs_to_end_without_terminator() {
        let text = "Grading Scale:\n  A=90-100  \n";
        let found = locator(&["Grading Scale"], &["Attendance"]).locate(text);
        assert_eq!(found.as_deref(), Some("A=90-100"));
    }

    #[test]
    fn test_heading_directly_above_boundary_tries_later_occurrence() {
        let text = "Grading Scale\nAttendance: see below\n...\nGrading Scale: A=93+\nAttendance: weekly";
        let found = locator(&["Grading Scale"], &["Attendance"]).locate(text);
        assert_eq!(found.as_deref(), Some("A=93+"));
    }

    #[test]
    fn test_heuristic_pass_runs_when_boundary_pass_finds_nothing() {
        // Boundaries match case-insensitively, so the lowercase line ends the body at once.
        let text = "Grading Scale:\nattendance-weighted curve applies";
        let found = locator(&["Grading Scale"], &["Attendance"]).locate(text);
        assert_eq!(found.as_deref(), Some("attendance-weighted curve applies"));

        let text = "Grading Scale:\nAttendance required";
        let found = locator(&["Grading Scale"], &["Attendance"]).locate(text);
        assert_eq!(found.as_deref(), Some("Attendance required"));

        assert_eq!(locator(&["Grading Scale"], &["Attendance"]).locate("Grading Scale:\n"), None);
    }

    #[test]
    fn test_heading_on_its_own_line_keeps_following_body() {
        let text = "Homework:\nLate submissions incur a 10% penalty per day.";
        let found = locator(&["Homework:"], &[]).locate(text);
        assert_eq!(found.as_deref(), Some("Late submissions incur a 10% penalty per day."));

        let text = "Homework:\n\nLate work loses 5% per day\nno exceptions\nOffice hours are on Monday";
        let found = locator(&["Homework:"], &[]).locate(text);
        assert_eq!(found.as_deref(), Some("Late work loses 5% per day\nno exceptions"));
    }

    #[test]
    fn test_blank_boundaries_are_ignored() {
        let text = "Grading Scale: A=90\nB=80";
        let found = locator(&["Grading Scale"], &["", "  "]).locate(text);
        assert_eq!(found.as_deref(), Some("A=90\nB=80"));
    }

    #[test]
    fn test_literal_headings_are_escaped() {
        let text = "Grade (Final)?: 100 points\nNext section";
        let found = locator(&["Grade (Final)?"], &[]).locate(text);
        assert_eq!(found.as_deref(), Some("100 points"));
    }
}
