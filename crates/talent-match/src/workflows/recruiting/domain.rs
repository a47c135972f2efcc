use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lifecycle::ApplicationStatus;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for users acting on the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role assigned to a user. Only an admin may change it after assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    Candidate,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Candidate => "candidate",
        }
    }

    /// Parses role labels, including the French spellings used by older clients.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "recruiter" | "recruteur" => Some(Role::Recruiter),
            "candidate" | "candidat" => Some(Role::Candidate),
            _ => None,
        }
    }
}

/// Registered user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Payload an admin uses to register a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The identity every policy and lifecycle call is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId(id.into()),
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Experience tier a posting is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
}

impl Seniority {
    pub const ALL: [Seniority; 4] = [
        Seniority::Junior,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Lead,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
        }
    }

    /// Senior and lead postings expect candidates to surface their experience.
    pub const fn expects_experience(self) -> bool {
        matches!(self, Seniority::Senior | Seniority::Lead)
    }
}

/// Publication state of a posting. Candidates only see open postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
    Draft,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [JobStatus::Open, JobStatus::Closed, JobStatus::Draft];

    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

/// Job posting with the skill requirements scoring runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub posted_by: UserId,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }
}

/// Payload used to publish a new posting. The poster is always the acting user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Keeps "absent" (`None`) apart from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of a posting; absent fields are left untouched and optional text
/// fields sent as `null` are cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub nice_to_have_skills: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub seniority: Option<Seniority>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub department: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
}

impl JobPatch {
    pub(crate) fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(required) = self.required_skills {
            job.required_skills = required;
        }
        if let Some(nice) = self.nice_to_have_skills {
            job.nice_to_have_skills = nice;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(seniority) = self.seniority {
            job.seniority = seniority;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(department) = self.department {
            job.department = department;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
    }
}

/// Candidate application and the results of its latest analysis.
///
/// `score` is set by every analysis; `compatibility_pct` only when the application was
/// linked to a job at analysis time. Both stay empty until the first analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub full_name: String,
    /// Owner. Legacy records may lack it and are matched on `full_name` instead.
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub job_id: Option<JobId>,
    /// Free-text target position, used when no job is linked.
    #[serde(default)]
    pub position: Option<String>,
    pub cv_text: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub compatibility_pct: Option<u8>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub fn is_analyzed(&self) -> bool {
        self.score.is_some()
    }
}

/// Candidate submission payload. Owner and display name come from the acting user,
/// unless an admin files the application on a candidate's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    /// Admin only: the candidate the application is filed for.
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Display name stored with an application filed on someone else's behalf.
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub position: Option<String>,
    pub cv_text: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Partial update of an application. `status` is routed through the lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub cv_text: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationPatch {
    /// True when the patch touches anything besides the status.
    pub fn edits_fields(&self) -> bool {
        self.full_name.is_some()
            || self.job_id.is_some()
            || self.position.is_some()
            || self.cv_text.is_some()
            || self.cover_letter.is_some()
    }
}
