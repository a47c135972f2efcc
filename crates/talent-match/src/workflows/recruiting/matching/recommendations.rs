use super::ScoreBreakdown;

pub(crate) const UNLINKED_RECOMMENDATION: &str =
    "Associate this application with a job posting for a precise assessment";

pub(crate) fn recommendations(breakdown: &ScoreBreakdown) -> Vec<String> {
    let Some(coverage) = &breakdown.job else {
        return vec![UNLINKED_RECOMMENDATION.to_string()];
    };

    let mut recommendations: Vec<String> = coverage
        .missing_required
        .iter()
        .map(|skill| format!("Add evidence of {skill} experience"))
        .collect();

    if breakdown.seniority_boost == 0 && coverage.seniority.expects_experience() {
        recommendations.push(format!(
            "Highlight your years of experience for this {} role",
            coverage.seniority.label()
        ));
    }

    recommendations
}
