use super::super::domain::Job;
use super::{JobCoverage, ScoreBreakdown};

const REQUIRED_WEIGHT: f64 = 70.0;
const NICE_TO_HAVE_WEIGHT: f64 = 15.0;
/// Nice-to-have coverage is measured against at least this many skills.
const NICE_TO_HAVE_FLOOR: usize = 3;
pub(crate) const SENIORITY_BOOST: u8 = 15;
pub(crate) const POSITION_BOOST: u8 = 10;
pub(crate) const PER_SKILL_POINTS: u32 = 10;
const MAX_SCORE: u32 = 100;

/// Round half away from zero and clamp into `0..=100`.
pub(crate) fn round_pct(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, MAX_SCORE as f64) as u8
}

/// Lower-cased, trimmed skill names in first-seen order without duplicates, each
/// paired with the spelling the job used.
fn normalized(skills: &[String]) -> Vec<(String, &str)> {
    let mut seen: Vec<(String, &str)> = Vec::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lowered = trimmed.to_lowercase();
        if seen.iter().any(|(existing, _)| *existing == lowered) {
            continue;
        }
        seen.push((lowered, trimmed));
    }
    seen
}

pub(crate) fn has_seniority_marker(cv_lower: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .map(|marker| marker.trim().to_lowercase())
        .any(|marker| !marker.is_empty() && cv_lower.contains(&marker))
}

pub(crate) fn mentions_position(cv_lower: &str, position: Option<&str>) -> bool {
    position
        .map(|value| value.trim().to_lowercase())
        .map(|value| !value.is_empty() && cv_lower.contains(&value))
        .unwrap_or(false)
}

pub(crate) fn compatibility_pct(extracted: &[String], job: &Job) -> u8 {
    let required = normalized(&job.required_skills);
    if required.is_empty() {
        return 0;
    }

    let extracted_lower: Vec<String> = extracted.iter().map(|skill| skill.to_lowercase()).collect();
    let matched = required
        .iter()
        .filter(|(lowered, _)| extracted_lower.contains(lowered))
        .count();

    round_pct(100.0 * matched as f64 / required.len() as f64)
}

fn job_coverage(extracted: &[String], job: &Job) -> JobCoverage {
    let extracted_lower: Vec<String> = extracted.iter().map(|skill| skill.to_lowercase()).collect();
    let required = normalized(&job.required_skills);
    let nice = normalized(&job.nice_to_have_skills);

    let mut matched_required = Vec::new();
    let mut missing_required = Vec::new();
    for (lowered, spelling) in &required {
        if extracted_lower.contains(lowered) {
            matched_required.push(spelling.to_string());
        } else {
            missing_required.push(spelling.to_string());
        }
    }

    let matched_nice_to_have: Vec<String> = nice
        .iter()
        .filter(|(lowered, _)| extracted_lower.contains(lowered))
        .map(|(_, spelling)| spelling.to_string())
        .collect();

    let required_coverage = if required.is_empty() {
        0.0
    } else {
        matched_required.len() as f64 / required.len() as f64
    };
    let nice_to_have_coverage = if nice.is_empty() {
        0.0
    } else {
        matched_nice_to_have.len() as f64 / nice.len().max(NICE_TO_HAVE_FLOOR) as f64
    };

    let skill_score = round_pct(
        REQUIRED_WEIGHT * required_coverage + NICE_TO_HAVE_WEIGHT * nice_to_have_coverage.min(1.0),
    );

    JobCoverage {
        job_id: job.id.clone(),
        seniority: job.seniority,
        matched_required,
        missing_required,
        matched_nice_to_have,
        required_coverage,
        nice_to_have_coverage,
        skill_score,
    }
}

pub(crate) fn score_breakdown(
    cv_text: &str,
    extracted: Vec<String>,
    job: Option<&Job>,
    position: Option<&str>,
    seniority_markers: &[String],
) -> ScoreBreakdown {
    let cv_lower = cv_text.to_lowercase();
    let seniority_boost = if has_seniority_marker(&cv_lower, seniority_markers) {
        SENIORITY_BOOST
    } else {
        0
    };

    match job {
        Some(job) => {
            let coverage = job_coverage(&extracted, job);
            let compatibility_pct = compatibility_pct(&extracted, job);
            let total = (coverage.skill_score as u32 + seniority_boost as u32).min(MAX_SCORE);

            ScoreBreakdown {
                skills: extracted,
                seniority_boost,
                position_boost: 0,
                score: total as u8,
                compatibility_pct: Some(compatibility_pct),
                job: Some(coverage),
            }
        }
        None => {
            let position_boost = if mentions_position(&cv_lower, position) {
                POSITION_BOOST
            } else {
                0
            };
            let skill_points = (extracted.len() as u32).saturating_mul(PER_SKILL_POINTS);
            let total = skill_points
                .saturating_add(seniority_boost as u32)
                .saturating_add(position_boost as u32)
                .min(MAX_SCORE);

            ScoreBreakdown {
                skills: extracted,
                seniority_boost,
                position_boost,
                score: total as u8,
                compatibility_pct: None,
                job: None,
            }
        }
    }
}
