use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId, Job, JobId, User, UserId};
use super::lifecycle::{ApplicationStatus, Decision};

/// Storage abstraction for postings, standing in for the remote CRUD service.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list(&self) -> Result<Vec<Job>, RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for applications, standing in for the remote CRUD service.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for user accounts.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for decision notices (e-mail, in-app toasts, ...).
pub trait DecisionNotifier: Send + Sync {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifierError>;
}

/// Payload emitted whenever an application is accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNotice {
    pub application_id: ApplicationId,
    pub candidate: String,
    pub decision: Decision,
    pub status: ApplicationStatus,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_pct: Option<u8>,
    pub recommendations: Vec<String>,
}

impl From<&Application> for ApplicationStatusView {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.id.clone(),
            status: application.status.label(),
            score: application.score,
            compatibility_pct: application.compatibility_pct,
            recommendations: application.recommendations.clone(),
        }
    }
}
