use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use talent_match::workflows::recruiting::{
    Application, ApplicationId, ApplicationRepository, DecisionNotice, DecisionNotifier, Job,
    JobId, JobRepository, NotifierError, RepositoryError, Seniority, User, UserId,
    UserRepository,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobRepository {
    records: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&job.id) {
            guard.insert(job.id.clone(), job);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        lock(&self.records)?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        lock(&self.records)?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserRepository {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&user.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&user.id) {
            guard.insert(user.id.clone(), user);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }
}

/// Logs every decision notice and keeps it for later inspection.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotifier {
    notices: Arc<Mutex<Vec<DecisionNotice>>>,
}

impl DecisionNotifier for LoggingNotifier {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifierError> {
        info!(
            application_id = %notice.application_id,
            candidate = %notice.candidate,
            status = notice.status.label(),
            "decision notice dispatched"
        );
        let mut guard = self
            .notices
            .lock()
            .map_err(|_| NotifierError::Transport("notice log poisoned".to_string()))?;
        guard.push(notice);
        Ok(())
    }
}

impl LoggingNotifier {
    pub(crate) fn notices(&self) -> Vec<DecisionNotice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_seniority(raw: &str) -> Result<Seniority, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "junior" => Ok(Seniority::Junior),
        "mid" | "intermediate" => Ok(Seniority::Mid),
        "senior" => Ok(Seniority::Senior),
        "lead" => Ok(Seniority::Lead),
        other => Err(format!(
            "unknown seniority '{other}' (expected junior, mid, senior or lead)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use talent_match::workflows::recruiting::{JobStatus, Role};

    fn job(id: &str) -> Job {
        Job {
            id: JobId(id.to_string()),
            title: "QA Engineer".to_string(),
            required_skills: vec!["Python".to_string()],
            nice_to_have_skills: Vec::new(),
            description: None,
            posted_by: UserId("rec-1".to_string()),
            seniority: Seniority::Mid,
            status: JobStatus::Open,
            department: None,
            location: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn job_store_rejects_duplicates_and_unknown_updates() {
        let repository = InMemoryJobRepository::default();
        repository.insert(job("job-1")).expect("first insert");
        assert!(matches!(
            repository.insert(job("job-1")),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repository.update(job("job-2")),
            Err(RepositoryError::NotFound)
        ));
        repository
            .delete(&JobId("job-1".to_string()))
            .expect("delete existing");
        assert!(repository.list().expect("list").is_empty());
    }

    #[test]
    fn user_store_updates_only_known_users() {
        let repository = InMemoryUserRepository::default();
        let mut user = User {
            id: UserId("user-1".to_string()),
            name: "Nadia Admin".to_string(),
            email: "nadia@example.com".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        assert!(matches!(
            repository.update(user.clone()),
            Err(RepositoryError::NotFound)
        ));
        repository.insert(user.clone()).expect("insert");
        user.role = Role::Recruiter;
        repository.update(user.clone()).expect("update");
        assert_eq!(
            repository.fetch(&user.id).expect("fetch").map(|user| user.role),
            Some(Role::Recruiter)
        );
    }

    #[test]
    fn seniority_labels_parse() {
        assert_eq!(parse_seniority(" Senior "), Ok(Seniority::Senior));
        assert_eq!(parse_seniority("intermediate"), Ok(Seniority::Mid));
        assert!(parse_seniority("principal").is_err());
    }
}
