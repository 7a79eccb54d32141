// src/extractors/filter.rs

use serde::{Deserialize, Serialize};

/// Named cleanup applied to a located section body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFilter {
    /// Keep only lines mentioning late work or penalties.
    LatePolicy,
}

const LATE_POLICY_KEYWORDS: [&str; 2] = ["late", "penalty"];

impl PostFilter {
    pub fn name(&self) -> &'static str {
        match self {
            PostFilter::LatePolicy => "late_policy",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            PostFilter::LatePolicy => keep_lines_containing(text, &LATE_POLICY_KEYWORDS),
        }
    }
}

fn keep_lines_containing(text: &str, keywords: &[&str]) -> String {
    text.lines()
        .filter(|line| {
            let lowered = line.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
