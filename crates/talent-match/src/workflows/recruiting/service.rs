use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    Actor, Application, ApplicationDraft, ApplicationId, ApplicationPatch, Job, JobDraft, JobId,
    JobPatch, Role,
};
use super::insights::{self, ApplicationsByJob, CompatibilityStats, SystemMetrics};
use super::lifecycle::{ApplicationStatus, Decision, LifecycleError};
use super::matching::{AnalysisOutcome, MatchingConfig, MatchingEngine, ScoreBreakdown};
use super::policy::{self, Mutation, PolicyDenied, PolicyTarget};
use super::repository::{
    ApplicationRepository, DecisionNotice, DecisionNotifier, JobRepository, NotifierError,
    RepositoryError,
};

/// Service composing the repositories, visibility policy, lifecycle and matching engine.
pub struct RecruitingService<J, R, N> {
    jobs: Arc<J>,
    applications: Arc<R>,
    notifier: Arc<N>,
    engine: Arc<MatchingEngine>,
    auto_analyze: bool,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl<J, R, N> RecruitingService<J, R, N>
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        applications: Arc<R>,
        notifier: Arc<N>,
        config: MatchingConfig,
    ) -> Self {
        let engine = Arc::new(MatchingEngine::new(&config));

        Self {
            jobs,
            applications,
            notifier,
            engine,
            auto_analyze: config.auto_analyze,
        }
    }

    fn load_job(&self, id: &JobId) -> Result<Job, ServiceError> {
        self.jobs.fetch(id)?.ok_or_else(|| ServiceError::NotFound {
            entity: "job",
            id: id.0.clone(),
        })
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        self.applications
            .fetch(id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "application",
                id: id.0.clone(),
            })
    }

    /// The linked job, if the application has one and it still exists.
    fn linked_job(&self, application: &Application) -> Result<Option<Job>, ServiceError> {
        match &application.job_id {
            Some(id) => Ok(self.jobs.fetch(id)?),
            None => Ok(None),
        }
    }

    pub fn list_jobs(&self, actor: &Actor) -> Result<Vec<Job>, ServiceError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .list()?
            .into_iter()
            .filter(|job| policy::can_view(actor, PolicyTarget::Job(job)))
            .collect();
        jobs.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(jobs)
    }

    pub fn get_job(&self, actor: &Actor, id: &JobId) -> Result<Job, ServiceError> {
        let job = self.load_job(id)?;
        policy::ensure_visible(actor, PolicyTarget::Job(&job))?;
        Ok(job)
    }

    /// Publish a posting owned by the acting recruiter or admin.
    pub fn create_job(&self, actor: &Actor, draft: JobDraft) -> Result<Job, ServiceError> {
        require_text("title", &draft.title)?;

        let job = Job {
            id: next_job_id(),
            title: draft.title.trim().to_string(),
            required_skills: draft.required_skills,
            nice_to_have_skills: draft.nice_to_have_skills,
            description: draft.description,
            posted_by: actor.id.clone(),
            seniority: draft.seniority,
            status: draft.status,
            department: draft.department,
            location: draft.location,
            created_at: Utc::now(),
        };
        policy::authorize(actor, PolicyTarget::Job(&job), Mutation::Create)?;

        let stored = self.jobs.insert(job)?;
        info!(job_id = %stored.id, posted_by = %stored.posted_by, "job created");
        Ok(stored)
    }

    pub fn update_job(
        &self,
        actor: &Actor,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<Job, ServiceError> {
        let mut job = self.load_job(id)?;
        policy::authorize(actor, PolicyTarget::Job(&job), Mutation::Edit)?;

        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        patch.apply_to(&mut job);
        self.jobs.update(job.clone())?;
        debug!(job_id = %job.id, "job updated");
        Ok(job)
    }

    /// Delete a posting. Applications linked to it stay, unlinked from any live job.
    pub fn delete_job(&self, actor: &Actor, id: &JobId) -> Result<(), ServiceError> {
        let job = self.load_job(id)?;
        policy::authorize(actor, PolicyTarget::Job(&job), Mutation::Delete)?;
        self.jobs.delete(id)?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    /// Applications visible to the actor, newest first.
    pub fn list_applications(&self, actor: &Actor) -> Result<Vec<Application>, ServiceError> {
        let jobs = self.jobs.list()?;
        let mut visible: Vec<Application> = self
            .applications
            .list()?
            .into_iter()
            .filter(|application| {
                let job = application
                    .job_id
                    .as_ref()
                    .and_then(|id| jobs.iter().find(|job| job.id == *id));
                policy::can_view(actor, PolicyTarget::application(application, job))
            })
            .collect();
        visible.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(visible)
    }

    pub fn get_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
    ) -> Result<Application, ServiceError> {
        let application = self.load_application(id)?;
        let job = self.linked_job(&application)?;
        policy::ensure_visible(actor, PolicyTarget::application(&application, job.as_ref()))?;
        Ok(application)
    }

    /// Submit a new application owned by the acting user, or by `owner_id` when an admin
    /// files it on a candidate's behalf.
    ///
    /// The application starts as `nouvelle`; when auto analysis is enabled it is scored
    /// immediately and stored as `analysée`.
    pub fn create_application(
        &self,
        actor: &Actor,
        draft: ApplicationDraft,
    ) -> Result<Application, ServiceError> {
        require_text("cv_text", &draft.cv_text)?;

        let (owner, full_name) = match draft.owner_id {
            Some(owner) if owner != actor.id => {
                if !actor.is_admin() {
                    return Err(ServiceError::Forbidden(PolicyDenied {
                        role: actor.role.label(),
                        action: "file for another user",
                        target: "application",
                    }));
                }
                let full_name = draft.full_name.unwrap_or_default();
                require_text("full_name", &full_name)?;
                (owner, full_name.trim().to_string())
            }
            _ => (actor.id.clone(), actor.name.clone()),
        };

        // Candidates may only apply to postings they can see on the job board.
        let job = match &draft.job_id {
            Some(id) => Some(self.get_job(actor, id)?),
            None => None,
        };

        let mut application = Application {
            id: next_application_id(),
            full_name,
            user_id: Some(owner),
            job_id: draft.job_id,
            position: draft.position,
            cv_text: draft.cv_text,
            cover_letter: draft.cover_letter,
            score: None,
            compatibility_pct: None,
            status: ApplicationStatus::Nouvelle,
            skills: Vec::new(),
            recommendations: Vec::new(),
            created_at: Utc::now(),
        };
        policy::authorize(
            actor,
            PolicyTarget::application(&application, job.as_ref()),
            Mutation::Create,
        )?;

        if self.auto_analyze {
            self.engine
                .analyze(&application, job.as_ref())
                .apply_to(&mut application);
        }

        let stored = self.applications.insert(application)?;
        info!(
            application_id = %stored.id,
            status = stored.status.label(),
            score = ?stored.score,
            "application submitted"
        );
        Ok(stored)
    }

    /// Apply a partial update. Field edits need edit rights; a `status` entry is treated
    /// as a decision and must target `retenue` or `rejetée`.
    pub fn update_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, ServiceError> {
        let mut application = self.load_application(id)?;
        let job = self.linked_job(&application)?;
        let target = PolicyTarget::application(&application, job.as_ref());
        policy::ensure_visible(actor, target)?;

        if patch.edits_fields() {
            policy::authorize(actor, target, Mutation::Edit)?;
        }
        if patch.status.is_some() {
            policy::authorize(actor, target, Mutation::Decide)?;
        }

        let decision = patch
            .status
            .map(ApplicationStatus::requested_decision)
            .transpose()?;

        if let Some(cv_text) = &patch.cv_text {
            require_text("cv_text", cv_text)?;
        }
        let relinked = match &patch.job_id {
            Some(job_id) => Some(self.load_job(job_id)?),
            None => None,
        };
        // An existing analysis is redone whenever its scoring inputs change.
        let rescore = application.is_analyzed()
            && (relinked.is_some() || patch.position.is_some() || patch.cv_text.is_some());

        let ApplicationPatch {
            full_name,
            job_id,
            position,
            cv_text,
            cover_letter,
            status: _,
        } = patch;
        if let Some(full_name) = full_name {
            application.full_name = full_name;
        }
        if let Some(job_id) = job_id {
            application.job_id = Some(job_id);
        }
        if let Some(position) = position {
            application.position = Some(position);
        }
        if let Some(cv_text) = cv_text {
            application.cv_text = cv_text;
        }
        if let Some(cover_letter) = cover_letter {
            application.cover_letter = Some(cover_letter);
        }

        if rescore {
            let job = relinked.as_ref().or(job.as_ref());
            self.engine.analyze(&application, job).apply_to(&mut application);
            debug!(
                application_id = %application.id,
                score = ?application.score,
                "analysis refreshed after edit"
            );
        }

        match decision {
            Some(decision) => self.record_decision(application, decision),
            None => {
                self.applications.update(application.clone())?;
                debug!(application_id = %application.id, "application updated");
                Ok(application)
            }
        }
    }

    pub fn delete_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
    ) -> Result<(), ServiceError> {
        let application = self.load_application(id)?;
        let job = self.linked_job(&application)?;
        policy::authorize(
            actor,
            PolicyTarget::application(&application, job.as_ref()),
            Mutation::Delete,
        )?;
        self.applications.delete(id)?;
        info!(application_id = %id, "application deleted");
        Ok(())
    }

    /// Run extraction, scoring and recommendations and persist the results.
    pub fn analyze_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
    ) -> Result<(Application, AnalysisOutcome), ServiceError> {
        let mut application = self.load_application(id)?;
        let job = self.linked_job(&application)?;
        policy::authorize(
            actor,
            PolicyTarget::application(&application, job.as_ref()),
            Mutation::Analyze,
        )?;

        if application.job_id.is_some() && job.is_none() {
            warn!(
                application_id = %application.id,
                "linked job no longer exists; scoring without it"
            );
        }

        let outcome = self.engine.analyze(&application, job.as_ref());
        outcome.apply_to(&mut application);
        self.applications.update(application.clone())?;

        info!(
            application_id = %application.id,
            score = outcome.score,
            compatibility_pct = ?outcome.compatibility_pct,
            "application analyzed"
        );
        Ok((application, outcome))
    }

    /// Accept or reject an application. Decided applications may be decided again.
    pub fn decide(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        decision: Decision,
    ) -> Result<Application, ServiceError> {
        let application = self.load_application(id)?;
        let job = self.linked_job(&application)?;
        policy::authorize(
            actor,
            PolicyTarget::application(&application, job.as_ref()),
            Mutation::Decide,
        )?;
        self.record_decision(application, decision)
    }

    fn record_decision(
        &self,
        mut application: Application,
        decision: Decision,
    ) -> Result<Application, ServiceError> {
        let previous = application.status;
        application.status = previous.apply(decision.event());
        self.applications.update(application.clone())?;

        if previous.is_terminal() {
            warn!(
                application_id = %application.id,
                from = previous.label(),
                to = application.status.label(),
                "decision overwritten"
            );
        }

        let mut details = BTreeMap::new();
        details.insert("previous_status".to_string(), previous.label().to_string());
        if let Some(score) = application.score {
            details.insert("score".to_string(), score.to_string());
        }
        self.notifier.publish(DecisionNotice {
            application_id: application.id.clone(),
            candidate: application.full_name.clone(),
            decision,
            status: application.status,
            details,
        })?;

        info!(
            application_id = %application.id,
            status = application.status.label(),
            "decision recorded"
        );
        Ok(application)
    }

    /// Score distribution over the applications the actor can see.
    pub fn compatibility_stats(&self, actor: &Actor) -> Result<CompatibilityStats, ServiceError> {
        let applications = self.list_applications(actor)?;
        let jobs = self.jobs.list()?;
        Ok(insights::compatibility_stats(&applications, &jobs))
    }

    /// Recruiter view of applications on their postings, grouped by job title.
    pub fn applications_by_job(&self, actor: &Actor) -> Result<ApplicationsByJob, ServiceError> {
        if actor.role != Role::Recruiter {
            return Err(ServiceError::Forbidden(PolicyDenied {
                role: actor.role.label(),
                action: "group",
                target: "applications",
            }));
        }

        let applications = self.list_applications(actor)?;
        let jobs = self.jobs.list()?;
        Ok(insights::group_by_job(applications, &jobs))
    }

    /// Job and application counts across the whole system. Candidates are refused.
    pub fn system_metrics(&self, actor: &Actor) -> Result<SystemMetrics, ServiceError> {
        if actor.role == Role::Candidate {
            return Err(ServiceError::Forbidden(PolicyDenied {
                role: actor.role.label(),
                action: "view",
                target: "metrics",
            }));
        }

        let jobs = self.jobs.list()?;
        let applications = self.applications.list()?;
        Ok(insights::system_metrics(&jobs, &applications))
    }

    /// Score a CV without persisting anything.
    pub fn preview_score(
        &self,
        actor: &Actor,
        cv_text: &str,
        job_id: Option<&JobId>,
        position: Option<&str>,
    ) -> Result<ScoreBreakdown, ServiceError> {
        let job = match job_id {
            Some(id) => Some(self.get_job(actor, id)?),
            None => None,
        };
        Ok(self.engine.breakdown(cv_text, job.as_ref(), position))
    }
}

/// Error raised by the recruiting service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("forbidden: {0}")]
    Forbidden(#[from] PolicyDenied),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notifier(#[from] NotifierError),
}

impl From<LifecycleError> for ServiceError {
    fn from(value: LifecycleError) -> Self {
        Self::Validation(value.to_string())
    }
}
