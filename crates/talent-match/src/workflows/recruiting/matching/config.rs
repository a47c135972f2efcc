use serde::{Deserialize, Serialize};

use super::vocabulary::SkillVocabulary;

/// Markers that earn the seniority boost when found in a CV.
pub const DEFAULT_SENIORITY_MARKERS: [&str; 3] = ["senior", "5+", "ancien"];

/// Inputs the matching engine is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub vocabulary: SkillVocabulary,
    pub seniority_markers: Vec<String>,
    /// Run analysis as soon as an application is submitted.
    pub auto_analyze: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            vocabulary: SkillVocabulary::default(),
            seniority_markers: DEFAULT_SENIORITY_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            auto_analyze: true,
        }
    }
}
