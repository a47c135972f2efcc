use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::recruiting::accounts::AccountService;
use crate::workflows::recruiting::domain::{
    Actor, Application, ApplicationId, Job, JobId, JobStatus, Role, Seniority, User, UserId,
};
use crate::workflows::recruiting::lifecycle::ApplicationStatus;
use crate::workflows::recruiting::matching::MatchingConfig;
use crate::workflows::recruiting::repository::{
    ApplicationRepository, DecisionNotice, DecisionNotifier, JobRepository, NotifierError,
    RepositoryError, UserRepository,
};
use crate::workflows::recruiting::router::{
    accounts_router, recruiting_router, ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLE_HEADER,
};
use crate::workflows::recruiting::service::RecruitingService;

pub(super) type TestService =
    RecruitingService<MemoryJobRepository, MemoryApplicationRepository, MemoryNotifier>;

pub(super) fn admin() -> Actor {
    Actor::new("admin-1", "Ada Admin", Role::Admin)
}

pub(super) fn recruiter() -> Actor {
    Actor::new("rec-1", "Rita Recruiter", Role::Recruiter)
}

pub(super) fn other_recruiter() -> Actor {
    Actor::new("rec-2", "Omar Recruiter", Role::Recruiter)
}

pub(super) fn candidate() -> Actor {
    Actor::new("cand-1", "Alice Martin", Role::Candidate)
}

pub(super) fn other_candidate() -> Actor {
    Actor::new("cand-2", "Bruno Petit", Role::Candidate)
}

pub(super) fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn skills(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn job(id: &str, posted_by: &Actor, required: &[&str], nice: &[&str]) -> Job {
    Job {
        id: JobId(id.to_string()),
        title: format!("Posting {id}"),
        required_skills: skills(required),
        nice_to_have_skills: skills(nice),
        description: None,
        posted_by: posted_by.id.clone(),
        seniority: Seniority::Mid,
        status: JobStatus::Open,
        department: None,
        location: None,
        created_at: at(1),
    }
}

pub(super) fn application(
    id: &str,
    owner: &Actor,
    job_id: Option<&str>,
    cv_text: &str,
) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        full_name: owner.name.clone(),
        user_id: Some(owner.id.clone()),
        job_id: job_id.map(|id| JobId(id.to_string())),
        position: None,
        cv_text: cv_text.to_string(),
        cover_letter: None,
        score: None,
        compatibility_pct: None,
        status: ApplicationStatus::Nouvelle,
        skills: Vec::new(),
        recommendations: Vec::new(),
        created_at: at(2),
    }
}

pub(super) fn user(actor: &Actor, email: &str, day: u32) -> User {
    User {
        id: actor.id.clone(),
        name: actor.name.clone(),
        email: email.to_string(),
        role: actor.role,
        created_at: at(day),
    }
}

/// Account service over a store seeded with the fixture admin, recruiter and candidate.
pub(super) fn accounts() -> (AccountService<MemoryUserRepository>, Arc<MemoryUserRepository>) {
    let users = Arc::new(MemoryUserRepository::default());
    for record in [
        user(&admin(), "ada@example.com", 1),
        user(&recruiter(), "rita@example.com", 2),
        user(&candidate(), "alice@example.com", 3),
    ] {
        users.insert(record).expect("user seeded");
    }
    (AccountService::new(users.clone()), users)
}

pub(super) fn accounts_app() -> axum::Router {
    let (service, _) = accounts();
    accounts_router(Arc::new(service))
}

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) jobs: Arc<MemoryJobRepository>,
    pub(super) applications: Arc<MemoryApplicationRepository>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn harness() -> Harness {
    harness_with(MatchingConfig::default())
}

pub(super) fn harness_with(config: MatchingConfig) -> Harness {
    let jobs = Arc::new(MemoryJobRepository::default());
    let applications = Arc::new(MemoryApplicationRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = RecruitingService::new(
        jobs.clone(),
        applications.clone(),
        notifier.clone(),
        config,
    );
    Harness {
        service,
        jobs,
        applications,
        notifier,
    }
}

impl Harness {
    pub(super) fn seed_job(&self, job: Job) -> Job {
        self.jobs.insert(job).expect("job seeded")
    }

    pub(super) fn seed_application(&self, application: Application) -> Application {
        self.applications
            .insert(application)
            .expect("application seeded")
    }

    pub(super) fn stored(&self, id: &ApplicationId) -> Application {
        self.applications
            .fetch(id)
            .expect("fetch succeeds")
            .expect("application stored")
    }

    pub(super) fn into_router(self) -> axum::Router {
        recruiting_router(Arc::new(self.service))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryJobRepository {
    records: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRepository for MemoryJobRepository {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(job.id.clone(), job);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for MemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryUserRepository {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MemoryUserRepository {
    pub(super) fn stored(&self, id: &UserId) -> User {
        self.fetch(id).expect("fetch succeeds").expect("user stored")
    }
}

impl UserRepository for MemoryUserRepository {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&user.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<DecisionNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<DecisionNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl DecisionNotifier for MemoryNotifier {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifierError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn request_as(
    actor: &Actor,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, actor.id.0.as_str())
        .header(ACTOR_ROLE_HEADER, actor.role.label())
        .header(ACTOR_NAME_HEADER, actor.name.as_str());

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
