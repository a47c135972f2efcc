use serde::{Deserialize, Serialize};

/// Stage of an application. Serialized with the labels stored by existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "nouvelle")]
    Nouvelle,
    #[serde(rename = "analysée")]
    Analysee,
    #[serde(rename = "retenue")]
    Retenue,
    #[serde(rename = "rejetée")]
    Rejetee,
}

/// Something that happened to an application and may move its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Analyzed,
    Accepted,
    Rejected,
}

/// Decision a recruiter or admin records against an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn event(self) -> LifecycleEvent {
        match self {
            Decision::Accept => LifecycleEvent::Accepted,
            Decision::Reject => LifecycleEvent::Rejected,
        }
    }
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Nouvelle,
        ApplicationStatus::Analysee,
        ApplicationStatus::Retenue,
        ApplicationStatus::Rejetee,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Nouvelle => "nouvelle",
            ApplicationStatus::Analysee => "analysée",
            ApplicationStatus::Retenue => "retenue",
            ApplicationStatus::Rejetee => "rejetée",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Retenue | ApplicationStatus::Rejetee)
    }

    /// Transition table. Analysis never moves a status backwards and decisions may be
    /// re-recorded on already decided applications.
    pub const fn apply(self, event: LifecycleEvent) -> ApplicationStatus {
        use ApplicationStatus::*;
        use LifecycleEvent::*;

        match (self, event) {
            (Nouvelle, Analyzed) => Analysee,
            (Analysee, Analyzed) => Analysee,
            (Retenue, Analyzed) => Retenue,
            (Rejetee, Analyzed) => Rejetee,
            (_, Accepted) => Retenue,
            (_, Rejected) => Rejetee,
        }
    }

    /// Maps a requested target status onto the decision that produces it.
    ///
    /// `nouvelle` and `analysée` cannot be requested directly; only the analysis
    /// pipeline produces `analysée`.
    pub fn requested_decision(target: ApplicationStatus) -> Result<Decision, LifecycleError> {
        match target {
            ApplicationStatus::Retenue => Ok(Decision::Accept),
            ApplicationStatus::Rejetee => Ok(Decision::Reject),
            other => Err(LifecycleError::NotRequestable(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("status '{}' cannot be requested directly", .0.label())]
    NotRequestable(ApplicationStatus),
}
