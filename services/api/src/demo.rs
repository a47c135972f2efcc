use crate::infra::{
    parse_seniority, InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository,
    LoggingNotifier,
};
use chrono::Utc;
use clap::Args;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use talent_match::config::AppConfig;
use talent_match::error::AppError;
use talent_match::workflows::recruiting::{
    AccountService, Actor, Application, ApplicationDraft, Decision, Job, JobDraft, JobId,
    JobStatus, MatchingEngine, RecruitingService, Role, ScoreBreakdown, Seniority, UserDraft,
    UserId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after analysis instead of recording accept/reject decisions.
    #[arg(long)]
    pub(crate) skip_decisions: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a plain-text CV
    #[arg(long, conflicts_with = "cv")]
    pub(crate) cv_file: Option<PathBuf>,
    /// Inline CV text
    #[arg(long)]
    pub(crate) cv: Option<String>,
    /// Required skills (comma separated). Without them the CV is scored unlinked.
    #[arg(long, value_delimiter = ',')]
    pub(crate) required: Vec<String>,
    /// Nice-to-have skills (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub(crate) nice: Vec<String>,
    /// Seniority of the ad-hoc posting (junior, mid, senior, lead)
    #[arg(long, value_parser = parse_seniority, default_value = "mid")]
    pub(crate) seniority: Seniority,
    /// Target position, only used when no required skills are given
    #[arg(long)]
    pub(crate) position: Option<String>,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = MatchingEngine::new(&config.matching);

    let cv_text = match (&args.cv_file, &args.cv) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(text)) => text.clone(),
        (None, None) => {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "either --cv-file or --cv is required",
            )))
        }
    };

    let job = adhoc_job(&args);
    let breakdown = engine.breakdown(&cv_text, job.as_ref(), args.position.as_deref());

    if args.json {
        let rendered = serde_json::to_string_pretty(&breakdown).map_err(io::Error::from)?;
        println!("{rendered}");
    } else {
        render_breakdown(&breakdown);
    }
    Ok(())
}

fn adhoc_job(args: &ScoreArgs) -> Option<Job> {
    let required: Vec<String> = clean(&args.required);
    if required.is_empty() {
        return None;
    }

    Some(Job {
        id: JobId("adhoc".to_string()),
        title: args
            .position
            .clone()
            .unwrap_or_else(|| "Ad-hoc posting".to_string()),
        required_skills: required,
        nice_to_have_skills: clean(&args.nice),
        description: None,
        posted_by: UserId("cli".to_string()),
        seniority: args.seniority,
        status: JobStatus::Open,
        department: None,
        location: None,
        created_at: Utc::now(),
    })
}

fn clean(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn render_breakdown(breakdown: &ScoreBreakdown) {
    println!("Score: {}/100", breakdown.score);
    match breakdown.compatibility_pct {
        Some(pct) => println!("Compatibility: {pct}%"),
        None => println!("Compatibility: n/a (no job requirements)"),
    }
    if breakdown.skills.is_empty() {
        println!("Extracted skills: none");
    } else {
        println!("Extracted skills: {}", breakdown.skills.join(", "));
    }
    println!(
        "Boosts: seniority +{} | position +{}",
        breakdown.seniority_boost, breakdown.position_boost
    );
    if let Some(coverage) = &breakdown.job {
        println!(
            "Required coverage: {:.0}% (missing: {})",
            coverage.required_coverage * 100.0,
            if coverage.missing_required.is_empty() {
                "none".to_string()
            } else {
                coverage.missing_required.join(", ")
            }
        );
        if !coverage.matched_nice_to_have.is_empty() {
            println!(
                "Nice-to-have matched: {}",
                coverage.matched_nice_to_have.join(", ")
            );
        }
    }
}

struct DemoCandidate {
    name: &'static str,
    email: &'static str,
    job: Option<usize>,
    position: Option<&'static str>,
    cv_text: &'static str,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let notifier = Arc::new(LoggingNotifier::default());
    let service = RecruitingService::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        notifier.clone(),
        config.matching,
    );

    let accounts = AccountService::new(Arc::new(InMemoryUserRepository::default()));

    // Bootstrap admin; everyone else is registered through the account service.
    let admin = Actor::new("admin-1", "Nadia Admin", Role::Admin);
    let register = |name: &str, email: &str, role: Role| {
        accounts
            .create_user(
                &admin,
                UserDraft {
                    name: name.to_string(),
                    email: email.to_string(),
                    role,
                },
            )
            .map(|user| Actor::from(&user))
    };
    let recruiter = register("Romain Recruteur", "romain@example.com", Role::Recruiter)?;
    // Signed up as a candidate, then promoted by the admin.
    let signup = register("Inès Recruteuse", "ines@example.com", Role::Candidate)?;
    let outsider = Actor::from(&accounts.update_user_role(&admin, &signup.id, Role::Recruiter)?);

    println!("Recruiting workflow demo");
    let jobs = vec![
        service.create_job(
            &recruiter,
            JobDraft {
                title: "Senior Frontend Engineer".to_string(),
                required_skills: vec!["React".to_string(), "TypeScript".to_string()],
                nice_to_have_skills: vec!["AWS".to_string(), "Docker".to_string()],
                seniority: Seniority::Senior,
                department: Some("Product".to_string()),
                location: Some("Paris".to_string()),
                ..JobDraft::default()
            },
        )?,
        service.create_job(
            &recruiter,
            JobDraft {
                title: "Backend Engineer".to_string(),
                required_skills: vec![
                    "Python".to_string(),
                    "Django".to_string(),
                    "SQL".to_string(),
                ],
                nice_to_have_skills: vec!["Docker".to_string()],
                department: Some("Platform".to_string()),
                location: Some("Lyon".to_string()),
                ..JobDraft::default()
            },
        )?,
    ];
    for job in &jobs {
        println!(
            "- Posted {} [{}] requiring {}",
            job.title,
            job.id,
            job.required_skills.join(", ")
        );
    }

    let candidates = [
        DemoCandidate {
            name: "Camille Laurent",
            email: "camille@example.com",
            job: Some(0),
            position: None,
            cv_text: "Senior frontend developer, 7 years of React and TypeScript, AWS deployments",
        },
        DemoCandidate {
            name: "Hugo Bernard",
            email: "hugo@example.com",
            job: Some(0),
            position: None,
            cv_text: "JavaScript developer building React widgets",
        },
        DemoCandidate {
            name: "Léa Moreau",
            email: "lea@example.com",
            job: Some(1),
            position: None,
            cv_text: "Python and Django APIs backed by SQL, shipped with Docker",
        },
        DemoCandidate {
            name: "Yanis Robert",
            email: "yanis@example.com",
            job: None,
            position: Some("Data Engineer"),
            cv_text: "Data Engineer with Python, SQL and AWS",
        },
    ];

    println!("\nSubmissions (analyzed on arrival)");
    let mut submitted: Vec<Application> = Vec::new();
    for candidate in &candidates {
        let actor = register(candidate.name, candidate.email, Role::Candidate)?;
        let job_id = candidate.job.and_then(|index| jobs.get(index)).map(|job| job.id.clone());
        let application = service.create_application(
            &actor,
            ApplicationDraft {
                job_id,
                position: candidate.position.map(str::to_string),
                cv_text: candidate.cv_text.to_string(),
                ..ApplicationDraft::default()
            },
        )?;
        print_application(&application, &jobs);
        submitted.push(application);
    }

    if !args.skip_decisions {
        println!("\nDecisions");
        let mut linked: Vec<&Application> = submitted
            .iter()
            .filter(|application| application.job_id.is_some())
            .collect();
        linked.sort_by(|left, right| right.score.cmp(&left.score));

        if let Some(best) = linked.first() {
            let decided = service.decide(&recruiter, &best.id, Decision::Accept)?;
            println!("- {} -> {}", decided.full_name, decided.status.label());
        }
        if let Some(weakest) = linked.last().filter(|_| linked.len() > 1) {
            let decided = service.decide(&recruiter, &weakest.id, Decision::Reject)?;
            println!("- {} -> {}", decided.full_name, decided.status.label());
        }

        if let Some(application) = submitted.first() {
            match service.decide(&outsider, &application.id, Decision::Reject) {
                Ok(_) => println!("- unexpected: foreign recruiter decision accepted"),
                Err(err) => println!("- {} blocked: {}", outsider.name, err),
            }
        }
        println!("- {} decision notices dispatched", notifier.notices().len());
    }

    let stats = service.compatibility_stats(&admin)?;
    println!("\nCompatibility overview");
    println!(
        "- {} applications, {} analyzed, average score {:.1}",
        stats.total_applications, stats.analyzed_applications, stats.average_score
    );
    println!(
        "- high {} ({:.1}%) | medium {} ({:.1}%) | low {} ({:.1}%)",
        stats.distribution.high.count,
        stats.distribution.high.percentage,
        stats.distribution.medium.count,
        stats.distribution.medium.percentage,
        stats.distribution.low.count,
        stats.distribution.low.percentage
    );
    for entry in &stats.top_applications {
        println!(
            "  - {} {} ({}) [{}]",
            entry.score,
            entry.candidate,
            entry.job.as_deref().unwrap_or("no job"),
            entry.status
        );
    }

    let metrics = service.system_metrics(&admin)?;
    println!("\nSystem metrics");
    println!(
        "- {} jobs, {} applications, acceptance rate {:.1}%",
        metrics.jobs.total, metrics.applications.total, metrics.applications.acceptance_rate
    );
    for (status, count) in &metrics.applications.by_status {
        println!("  - {status}: {count}");
    }
    println!("- {} registered users", accounts.list_users(&admin)?.len());

    Ok(())
}

fn print_application(application: &Application, jobs: &[Job]) {
    let job_title = application
        .job_id
        .as_ref()
        .and_then(|id| jobs.iter().find(|job| job.id == *id))
        .map(|job| job.title.as_str())
        .unwrap_or("no linked job");
    let compatibility = application
        .compatibility_pct
        .map(|pct| format!("{pct}%"))
        .unwrap_or_else(|| "n/a".to_string());

    println!(
        "- {} -> {} | score {} | compatibility {} | {}",
        application.full_name,
        job_title,
        application.score.unwrap_or_default(),
        compatibility,
        application.status.label()
    );
    if !application.skills.is_empty() {
        println!("  skills: {}", application.skills.join(", "));
    }
    for recommendation in &application.recommendations {
        println!("  * {recommendation}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_args(required: &[&str]) -> ScoreArgs {
        ScoreArgs {
            cv_file: None,
            cv: Some("React".to_string()),
            required: required.iter().map(|skill| skill.to_string()).collect(),
            nice: vec![" ".to_string(), "AWS".to_string()],
            seniority: Seniority::Lead,
            position: Some("UI Engineer".to_string()),
            json: false,
        }
    }

    #[test]
    fn adhoc_job_needs_required_skills() {
        assert!(adhoc_job(&score_args(&[])).is_none());
        assert!(adhoc_job(&score_args(&[" ", ""])).is_none());

        let job = adhoc_job(&score_args(&["React", " TypeScript "])).expect("job built");
        assert_eq!(job.title, "UI Engineer");
        assert_eq!(job.required_skills, vec!["React", "TypeScript"]);
        assert_eq!(job.nice_to_have_skills, vec!["AWS"]);
        assert_eq!(job.seniority, Seniority::Lead);
    }

    #[test]
    fn adhoc_job_feeds_the_engine() {
        let job = adhoc_job(&score_args(&["React", "TypeScript"]));
        let breakdown = MatchingEngine::default().breakdown("React", job.as_ref(), None);
        assert_eq!(breakdown.score, 35);
        assert_eq!(breakdown.compatibility_pct, Some(50));
    }
}
