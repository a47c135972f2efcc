use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use talent_match::workflows::recruiting::{
    Actor, Application, ApplicationDraft, ApplicationId, ApplicationRepository, ApplicationStatus,
    Decision, DecisionNotice, DecisionNotifier, Job, JobDraft, JobId, JobRepository,
    MatchingConfig, NotifierError, RecruitingService, RepositoryError, Role, Seniority,
    ServiceError,
};

#[derive(Default)]
struct Jobs(Mutex<HashMap<JobId, Job>>);

impl JobRepository for Jobs {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        self.0
            .lock()
            .expect("jobs mutex poisoned")
            .insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        self.insert(job).map(|_| ())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.0.lock().expect("jobs mutex poisoned").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("jobs mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.0.lock().expect("jobs mutex poisoned").remove(id);
        Ok(())
    }
}

#[derive(Default)]
struct Applications(Mutex<HashMap<ApplicationId, Application>>);

impl ApplicationRepository for Applications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.0
            .lock()
            .expect("applications mutex poisoned")
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        self.insert(application).map(|_| ())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("applications mutex poisoned")
            .get(id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("applications mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        self.0.lock().expect("applications mutex poisoned").remove(id);
        Ok(())
    }
}

#[derive(Default)]
struct Outbox(Mutex<Vec<DecisionNotice>>);

impl DecisionNotifier for Outbox {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifierError> {
        self.0.lock().expect("outbox mutex poisoned").push(notice);
        Ok(())
    }
}

fn service() -> (RecruitingService<Jobs, Applications, Outbox>, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::default());
    let service = RecruitingService::new(
        Arc::new(Jobs::default()),
        Arc::new(Applications::default()),
        outbox.clone(),
        MatchingConfig::default(),
    );
    (service, outbox)
}

#[test]
fn posting_to_decision_round_trip() {
    let (service, outbox) = service();
    let recruiter = Actor::new("rec-9", "Rita", Role::Recruiter);
    let candidate = Actor::new("cand-9", "Chloé Durand", Role::Candidate);

    let job = service
        .create_job(
            &recruiter,
            JobDraft {
                title: "Senior Frontend Engineer".to_string(),
                required_skills: vec!["React".to_string(), "TypeScript".to_string()],
                nice_to_have_skills: vec!["AWS".to_string()],
                seniority: Seniority::Senior,
                ..JobDraft::default()
            },
        )
        .expect("job posted");

    let application = service
        .create_application(
            &candidate,
            ApplicationDraft {
                job_id: Some(job.id.clone()),
                position: None,
                cv_text: "React and TypeScript on AWS".to_string(),
                cover_letter: Some("Hello".to_string()),
                ..ApplicationDraft::default()
            },
        )
        .expect("application submitted");

    // 70 for required coverage plus 15 * 1/3 of the nice-to-have floor.
    assert_eq!(application.score, Some(75));
    assert_eq!(application.compatibility_pct, Some(100));
    assert_eq!(
        application.recommendations,
        vec!["Highlight your years of experience for this senior role".to_string()]
    );

    let visible = service
        .list_applications(&recruiter)
        .expect("recruiter listing");
    assert_eq!(visible.len(), 1);

    let decided = service
        .decide(&recruiter, &application.id, Decision::Accept)
        .expect("decision recorded");
    assert_eq!(decided.status, ApplicationStatus::Retenue);
    assert_eq!(decided.score, application.score);

    let notices = outbox.0.lock().expect("outbox mutex poisoned");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].candidate, "Chloé Durand");
}

#[test]
fn strangers_see_nothing() {
    let (service, _) = service();
    let recruiter = Actor::new("rec-9", "Rita", Role::Recruiter);
    let candidate = Actor::new("cand-9", "Chloé Durand", Role::Candidate);
    let stranger = Actor::new("cand-10", "Sam", Role::Candidate);

    let application = service
        .create_application(
            &candidate,
            ApplicationDraft {
                cv_text: "Docker".to_string(),
                ..ApplicationDraft::default()
            },
        )
        .expect("application submitted");

    assert!(service
        .list_applications(&stranger)
        .expect("listing")
        .is_empty());
    assert!(service
        .list_applications(&recruiter)
        .expect("listing")
        .is_empty());
    assert!(matches!(
        service.get_application(&stranger, &application.id),
        Err(ServiceError::Forbidden(_))
    ));
}
