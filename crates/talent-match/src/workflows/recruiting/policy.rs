//! Role-based visibility and mutation rules.
//!
//! Every check is a pure function of the acting user and the ownership fields of the
//! target, so callers thread the actor explicitly instead of consulting session state.

use serde::Serialize;

use super::domain::{Actor, Application, Job, Role, User};

/// Entity a policy question is asked about.
///
/// Applications carry their linked job (when it still exists) because recruiter access
/// is derived from who posted that job.
#[derive(Debug, Clone, Copy)]
pub enum PolicyTarget<'a> {
    Job(&'a Job),
    Application {
        application: &'a Application,
        job: Option<&'a Job>,
    },
    User(&'a User),
}

impl<'a> PolicyTarget<'a> {
    pub fn application(application: &'a Application, job: Option<&'a Job>) -> Self {
        PolicyTarget::Application { application, job }
    }

    fn kind(&self) -> &'static str {
        match self {
            PolicyTarget::Job(_) => "job",
            PolicyTarget::Application { .. } => "application",
            PolicyTarget::User(_) => "user",
        }
    }
}

/// Mutations gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Create,
    Edit,
    Delete,
    /// Run the matching pipeline (applications only).
    Analyze,
    /// Accept or reject (applications only).
    Decide,
}

impl Mutation {
    pub const fn label(self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Edit => "edit",
            Mutation::Delete => "delete",
            Mutation::Analyze => "analyze",
            Mutation::Decide => "decide",
        }
    }
}

/// Denial raised when the policy refuses an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} may not {action} this {target}")]
pub struct PolicyDenied {
    pub role: &'static str,
    pub action: &'static str,
    pub target: &'static str,
}

/// Candidates own an application through `user_id`, or through their display name on
/// legacy records that predate owner ids.
pub fn owns_application(actor: &Actor, application: &Application) -> bool {
    match &application.user_id {
        Some(owner) => *owner == actor.id,
        None => application.full_name == actor.name,
    }
}

pub fn posted_job(actor: &Actor, job: &Job) -> bool {
    job.posted_by == actor.id
}

pub fn can_view(actor: &Actor, target: PolicyTarget<'_>) -> bool {
    match (actor.role, target) {
        (Role::Admin, _) => true,
        (_, PolicyTarget::User(user)) => user.id == actor.id,
        (Role::Recruiter, PolicyTarget::Job(_)) => true,
        (Role::Recruiter, PolicyTarget::Application { job, .. }) => {
            job.map(|job| posted_job(actor, job)).unwrap_or(false)
        }
        (Role::Candidate, PolicyTarget::Job(job)) => job.is_open(),
        (Role::Candidate, PolicyTarget::Application { application, .. }) => {
            owns_application(actor, application)
        }
    }
}

pub fn can_mutate(actor: &Actor, target: PolicyTarget<'_>, mutation: Mutation) -> bool {
    match (actor.role, target) {
        (Role::Admin, _) => true,
        // Accounts and roles are administered by admins only.
        (_, PolicyTarget::User(_)) => false,
        (Role::Recruiter, PolicyTarget::Job(job)) => match mutation {
            Mutation::Create | Mutation::Edit | Mutation::Delete => posted_job(actor, job),
            Mutation::Analyze | Mutation::Decide => false,
        },
        (Role::Recruiter, PolicyTarget::Application { job, .. }) => match mutation {
            Mutation::Decide => job.map(|job| posted_job(actor, job)).unwrap_or(false),
            Mutation::Create | Mutation::Edit | Mutation::Delete | Mutation::Analyze => false,
        },
        (Role::Candidate, PolicyTarget::Job(_)) => false,
        (Role::Candidate, PolicyTarget::Application { application, .. }) => match mutation {
            Mutation::Create | Mutation::Analyze => owns_application(actor, application),
            Mutation::Edit | Mutation::Delete | Mutation::Decide => false,
        },
    }
}

pub fn ensure_visible(actor: &Actor, target: PolicyTarget<'_>) -> Result<(), PolicyDenied> {
    if can_view(actor, target) {
        Ok(())
    } else {
        Err(PolicyDenied {
            role: actor.role.label(),
            action: "view",
            target: target.kind(),
        })
    }
}

pub fn authorize(
    actor: &Actor,
    target: PolicyTarget<'_>,
    mutation: Mutation,
) -> Result<(), PolicyDenied> {
    if can_mutate(actor, target, mutation) {
        Ok(())
    } else {
        Err(PolicyDenied {
            role: actor.role.label(),
            action: mutation.label(),
            target: target.kind(),
        })
    }
}
