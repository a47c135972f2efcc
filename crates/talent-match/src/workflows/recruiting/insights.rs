use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::domain::{Application, ApplicationId, Job, JobId, JobStatus, Seniority};
use super::lifecycle::ApplicationStatus;

const HIGH_THRESHOLD: u8 = 80;
const MEDIUM_THRESHOLD: u8 = 60;
const TOP_LIMIT: usize = 5;
const UNSPECIFIED_DEPARTMENT: &str = "unspecified";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketStat {
    pub count: usize,
    /// Share of analyzed applications, one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityDistribution {
    pub high: BucketStat,
    pub medium: BucketStat,
    pub low: BucketStat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopApplication {
    pub application_id: ApplicationId,
    pub candidate: String,
    pub job: Option<String>,
    pub score: u8,
    pub status: &'static str,
}

/// Score statistics over a set of applications. Unanalyzed ones only count toward
/// `total_applications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityStats {
    pub total_applications: usize,
    pub analyzed_applications: usize,
    pub average_score: f64,
    pub distribution: CompatibilityDistribution,
    pub top_applications: Vec<TopApplication>,
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn bucket(count: usize, analyzed: usize) -> BucketStat {
    let percentage = if analyzed == 0 {
        0.0
    } else {
        one_decimal(count as f64 * 100.0 / analyzed as f64)
    };
    BucketStat { count, percentage }
}

pub fn compatibility_stats(applications: &[Application], jobs: &[Job]) -> CompatibilityStats {
    let titles: HashMap<&JobId, &str> = jobs
        .iter()
        .map(|job| (&job.id, job.title.as_str()))
        .collect();

    let mut scored: Vec<(&Application, u8)> = applications
        .iter()
        .filter_map(|application| application.score.map(|score| (application, score)))
        .collect();

    let analyzed = scored.len();
    let high = scored.iter().filter(|(_, score)| *score >= HIGH_THRESHOLD).count();
    let medium = scored
        .iter()
        .filter(|(_, score)| (MEDIUM_THRESHOLD..HIGH_THRESHOLD).contains(score))
        .count();
    let low = analyzed - high - medium;

    let average_score = if analyzed == 0 {
        0.0
    } else {
        let sum: u32 = scored.iter().map(|(_, score)| *score as u32).sum();
        one_decimal(sum as f64 / analyzed as f64)
    };

    // Highest score first; ties keep the newest application first.
    scored.sort_by(|(left, left_score), (right, right_score)| {
        right_score
            .cmp(left_score)
            .then_with(|| right.created_at.cmp(&left.created_at))
    });

    let top_applications = scored
        .iter()
        .take(TOP_LIMIT)
        .map(|(application, score)| TopApplication {
            application_id: application.id.clone(),
            candidate: application.full_name.clone(),
            job: application
                .job_id
                .as_ref()
                .and_then(|id| titles.get(id))
                .map(|title| title.to_string()),
            score: *score,
            status: application.status.label(),
        })
        .collect();

    CompatibilityStats {
        total_applications: applications.len(),
        analyzed_applications: analyzed,
        average_score,
        distribution: CompatibilityDistribution {
            high: bucket(high, analyzed),
            medium: bucket(medium, analyzed),
            low: bucket(low, analyzed),
        },
        top_applications,
    }
}

/// Applications on a recruiter's postings, grouped by job title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationsByJob {
    pub total_applications: usize,
    pub by_job: BTreeMap<String, Vec<Application>>,
}

pub fn group_by_job(applications: Vec<Application>, jobs: &[Job]) -> ApplicationsByJob {
    let titles: HashMap<&JobId, &str> = jobs
        .iter()
        .map(|job| (&job.id, job.title.as_str()))
        .collect();

    let total_applications = applications.len();
    let mut by_job: BTreeMap<String, Vec<Application>> = BTreeMap::new();
    for application in applications {
        let title = application
            .job_id
            .as_ref()
            .and_then(|id| titles.get(id))
            .map(|title| title.to_string())
            .unwrap_or_else(|| "unlinked".to_string());
        by_job.entry(title).or_default().push(application);
    }

    ApplicationsByJob {
        total_applications,
        by_job,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMetrics {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_department: BTreeMap<String, usize>,
    pub by_seniority: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationMetrics {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    /// Share of all applications that were accepted, one decimal.
    pub acceptance_rate: f64,
}

/// System-wide counts for the admin dashboard. Every known status and seniority is
/// listed, with zero when nothing matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemMetrics {
    pub jobs: JobMetrics,
    pub applications: ApplicationMetrics,
}

pub fn system_metrics(jobs: &[Job], applications: &[Application]) -> SystemMetrics {
    let mut job_status: BTreeMap<&'static str, usize> =
        JobStatus::ALL.iter().map(|status| (status.label(), 0)).collect();
    let mut by_seniority: BTreeMap<&'static str, usize> =
        Seniority::ALL.iter().map(|level| (level.label(), 0)).collect();
    let mut by_department: BTreeMap<String, usize> = BTreeMap::new();

    for job in jobs {
        *job_status.entry(job.status.label()).or_default() += 1;
        *by_seniority.entry(job.seniority.label()).or_default() += 1;
        let department = job
            .department
            .as_deref()
            .map(str::trim)
            .filter(|department| !department.is_empty())
            .unwrap_or(UNSPECIFIED_DEPARTMENT);
        *by_department.entry(department.to_string()).or_default() += 1;
    }

    let mut application_status: BTreeMap<&'static str, usize> = ApplicationStatus::ALL
        .iter()
        .map(|status| (status.label(), 0))
        .collect();
    for application in applications {
        *application_status
            .entry(application.status.label())
            .or_default() += 1;
    }

    let accepted = application_status
        .get(ApplicationStatus::Retenue.label())
        .copied()
        .unwrap_or_default();

    SystemMetrics {
        jobs: JobMetrics {
            total: jobs.len(),
            by_status: job_status,
            by_department,
            by_seniority,
        },
        applications: ApplicationMetrics {
            total: applications.len(),
            by_status: application_status,
            acceptance_rate: bucket(accepted, applications.len()).percentage,
        },
    }
}
