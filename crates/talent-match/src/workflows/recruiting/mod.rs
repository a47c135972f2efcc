//! Recruiting workflow: job postings, candidate applications, compatibility scoring and
//! the role-based rules deciding who sees and changes what.

pub mod accounts;
pub mod domain;
pub mod insights;
pub mod lifecycle;
pub mod matching;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use accounts::AccountService;
pub use domain::{
    Actor, Application, ApplicationDraft, ApplicationId, ApplicationPatch, Job, JobDraft, JobId,
    JobPatch, JobStatus, Role, Seniority, User, UserDraft, UserId,
};
pub use insights::{ApplicationsByJob, CompatibilityStats, SystemMetrics};
pub use lifecycle::{ApplicationStatus, Decision, LifecycleEvent};
pub use matching::{
    AnalysisOutcome, MatchingConfig, MatchingEngine, ScoreBreakdown, SkillVocabulary,
};
pub use policy::{can_mutate, can_view, Mutation, PolicyDenied, PolicyTarget};
pub use repository::{
    ApplicationRepository, ApplicationStatusView, DecisionNotice, DecisionNotifier,
    JobRepository, NotifierError, RepositoryError, UserRepository,
};
pub use router::{accounts_router, recruiting_router};
pub use service::{RecruitingService, ServiceError};
