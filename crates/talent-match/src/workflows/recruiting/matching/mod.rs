//! Candidate-to-job matching: skill extraction, scoring and recommendations.

mod config;
mod recommendations;
mod rules;
mod vocabulary;

pub use config::{MatchingConfig, DEFAULT_SENIORITY_MARKERS};
pub use vocabulary::{SkillVocabulary, DEFAULT_SKILLS};

use serde::{Deserialize, Serialize};

use super::domain::{Application, Job, JobId, Seniority};
use super::lifecycle::LifecycleEvent;

/// Stateless engine applying a vocabulary and seniority markers to candidate text.
///
/// None of its operations fail: missing inputs contribute zero.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    vocabulary: SkillVocabulary,
    seniority_markers: Vec<String>,
}

impl MatchingEngine {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            vocabulary: config.vocabulary.clone(),
            seniority_markers: config.seniority_markers.clone(),
        }
    }

    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        self.vocabulary.extract(text)
    }

    /// Full scoring trail for a CV against an optional job.
    pub fn breakdown(
        &self,
        cv_text: &str,
        job: Option<&Job>,
        position: Option<&str>,
    ) -> ScoreBreakdown {
        let extracted = self.extract_skills(cv_text);
        rules::score_breakdown(cv_text, extracted, job, position, &self.seniority_markers)
    }

    pub fn score_application(
        &self,
        cv_text: &str,
        job: Option<&Job>,
        position: Option<&str>,
    ) -> u8 {
        self.breakdown(cv_text, job, position).score
    }

    /// Share of the job's required skills found in the CV; `None` without a job.
    pub fn compatibility_pct(&self, cv_text: &str, job: Option<&Job>) -> Option<u8> {
        job.map(|job| rules::compatibility_pct(&self.extract_skills(cv_text), job))
    }

    pub fn recommendations_for(
        &self,
        application: &Application,
        job: Option<&Job>,
    ) -> Vec<String> {
        let breakdown =
            self.breakdown(&application.cv_text, job, application.position.as_deref());
        recommendations::recommendations(&breakdown)
    }

    /// Recomputes every analysis output from scratch for the application's current text.
    pub fn analyze(&self, application: &Application, job: Option<&Job>) -> AnalysisOutcome {
        let breakdown =
            self.breakdown(&application.cv_text, job, application.position.as_deref());
        let recommendations = recommendations::recommendations(&breakdown);

        AnalysisOutcome {
            skills: breakdown.skills.clone(),
            score: breakdown.score,
            compatibility_pct: breakdown.compatibility_pct,
            recommendations,
            breakdown,
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

/// Per-job part of a score: which requirements were met and how much they weigh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCoverage {
    pub job_id: JobId,
    pub seniority: Seniority,
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub matched_nice_to_have: Vec<String>,
    pub required_coverage: f64,
    pub nice_to_have_coverage: f64,
    pub skill_score: u8,
}

/// Transparent scoring trail so decisions and recommendations can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: Vec<String>,
    pub seniority_boost: u8,
    pub position_boost: u8,
    pub score: u8,
    pub compatibility_pct: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobCoverage>,
}

/// Everything an analysis writes back onto an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub skills: Vec<String>,
    pub score: u8,
    pub compatibility_pct: Option<u8>,
    pub recommendations: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

impl AnalysisOutcome {
    /// Overwrites previous analysis results and advances a new application.
    pub fn apply_to(&self, application: &mut Application) {
        application.skills = self.skills.clone();
        application.score = Some(self.score);
        application.compatibility_pct = self.compatibility_pct;
        application.recommendations = self.recommendations.clone();
        application.status = application.status.apply(LifecycleEvent::Analyzed);
    }
}
