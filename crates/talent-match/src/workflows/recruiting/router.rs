use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::accounts::AccountService;
use super::domain::{
    Actor, Application, ApplicationDraft, ApplicationId, ApplicationPatch, JobDraft, JobId,
    JobPatch, Role, UserDraft, UserId,
};
use super::lifecycle::Decision;
use super::matching::AnalysisOutcome;
use super::repository::{
    ApplicationRepository, ApplicationStatusView, DecisionNotifier, JobRepository,
    RepositoryError, UserRepository,
};
use super::service::{RecruitingService, ServiceError};

/// Headers the upstream authentication layer uses to identify the caller.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

type SharedService<J, R, N> = Arc<RecruitingService<J, R, N>>;
type SharedAccounts<U> = Arc<AccountService<U>>;

/// Router builder exposing the recruiting CRUD boundary and scoring endpoints.
pub fn recruiting_router<J, R, N>(service: SharedService<J, R, N>) -> Router
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<J, R, N>).post(create_job_handler::<J, R, N>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_job_handler::<J, R, N>)
                .patch(update_job_handler::<J, R, N>)
                .delete(delete_job_handler::<J, R, N>),
        )
        .route(
            "/api/v1/applications",
            get(list_applications_handler::<J, R, N>)
                .post(create_application_handler::<J, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_application_handler::<J, R, N>)
                .patch(update_application_handler::<J, R, N>)
                .delete(delete_application_handler::<J, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/analyze",
            post(analyze_handler::<J, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(decision_handler::<J, R, N>),
        )
        .route(
            "/api/v1/insights/compatibility",
            get(compatibility_stats_handler::<J, R, N>),
        )
        .route(
            "/api/v1/insights/recruiter",
            get(recruiter_applications_handler::<J, R, N>),
        )
        .route(
            "/api/v1/insights/metrics",
            get(system_metrics_handler::<J, R, N>),
        )
        .route("/api/v1/score", post(score_preview_handler::<J, R, N>))
        .with_state(service)
}

/// Router builder for user administration.
pub fn accounts_router<U>(service: SharedAccounts<U>) -> Router
where
    U: UserRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/users",
            get(list_users_handler::<U>).post(create_user_handler::<U>),
        )
        .route("/api/v1/users/:user_id", get(get_user_handler::<U>))
        .route("/api/v1/users/:user_id/role", patch(update_role_handler::<U>))
        .with_state(service)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolve the acting user from trusted upstream headers. The display name defaults to
/// the id when the header is absent.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let unauthorized = |message: &str| {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    };

    let id = header_value(headers, ACTOR_ID_HEADER)
        .ok_or_else(|| unauthorized("missing actor id"))?;
    let role = header_value(headers, ACTOR_ROLE_HEADER)
        .and_then(Role::parse)
        .ok_or_else(|| unauthorized("missing or unknown actor role"))?;
    let name = header_value(headers, ACTOR_NAME_HEADER).unwrap_or(id);

    Ok(Actor::new(id, name, role))
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Unavailable(_))
        | ServiceError::Notifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn respond_empty(result: Result<(), ServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

macro_rules! actor_or_reject {
    ($headers:expr) => {
        match actor_from_headers(&$headers) {
            Ok(actor) => actor,
            Err(response) => return response,
        }
    };
}

pub(crate) async fn list_jobs_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.list_jobs(&actor))
}

pub(crate) async fn create_job_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::CREATED, service.create_job(&actor, draft))
}

pub(crate) async fn get_job_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.get_job(&actor, &JobId(job_id)))
}

pub(crate) async fn update_job_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.update_job(&actor, &JobId(job_id), patch),
    )
}

pub(crate) async fn delete_job_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond_empty(service.delete_job(&actor, &JobId(job_id)))
}

pub(crate) async fn list_applications_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.list_applications(&actor))
}

pub(crate) async fn create_application_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Json(draft): Json<ApplicationDraft>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(
        StatusCode::CREATED,
        service.create_application(&actor, draft),
    )
}

pub(crate) async fn get_application_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.get_application(&actor, &ApplicationId(application_id)),
    )
}

pub(crate) async fn update_application_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(patch): Json<ApplicationPatch>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.update_application(&actor, &ApplicationId(application_id), patch),
    )
}

pub(crate) async fn delete_application_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond_empty(service.delete_application(&actor, &ApplicationId(application_id)))
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalysisResponse {
    pub(crate) application: Application,
    pub(crate) analysis: AnalysisOutcome,
}

pub(crate) async fn analyze_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    let result = service
        .analyze_application(&actor, &ApplicationId(application_id))
        .map(|(application, analysis)| AnalysisResponse {
            application,
            analysis,
        });
    respond(StatusCode::OK, result)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub(crate) decision: Decision,
}

pub(crate) async fn decision_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    let result = service
        .decide(&actor, &ApplicationId(application_id), request.decision)
        .map(|application| ApplicationStatusView::from(&application));
    respond(StatusCode::OK, result)
}

pub(crate) async fn compatibility_stats_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.compatibility_stats(&actor))
}

pub(crate) async fn recruiter_applications_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.applications_by_job(&actor))
}

pub(crate) async fn system_metrics_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.system_metrics(&actor))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScorePreviewRequest {
    pub(crate) cv_text: String,
    #[serde(default)]
    pub(crate) job_id: Option<JobId>,
    #[serde(default)]
    pub(crate) position: Option<String>,
}

pub(crate) async fn score_preview_handler<J, R, N>(
    State(service): State<SharedService<J, R, N>>,
    headers: HeaderMap,
    Json(request): Json<ScorePreviewRequest>,
) -> Response
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
{
    let actor = actor_or_reject!(headers);
    let result = service.preview_score(
        &actor,
        &request.cv_text,
        request.job_id.as_ref(),
        request.position.as_deref(),
    );
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_users_handler<U>(
    State(service): State<SharedAccounts<U>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.list_users(&actor))
}

pub(crate) async fn create_user_handler<U>(
    State(service): State<SharedAccounts<U>>,
    headers: HeaderMap,
    Json(draft): Json<UserDraft>,
) -> Response
where
    U: UserRepository + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::CREATED, service.create_user(&actor, draft))
}

pub(crate) async fn get_user_handler<U>(
    State(service): State<SharedAccounts<U>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(StatusCode::OK, service.get_user(&actor, &UserId(user_id)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleChangeRequest {
    pub(crate) role: Role,
}

pub(crate) async fn update_role_handler<U>(
    State(service): State<SharedAccounts<U>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<RoleChangeRequest>,
) -> Response
where
    U: UserRepository + 'static,
{
    let actor = actor_or_reject!(headers);
    respond(
        StatusCode::OK,
        service.update_user_role(&actor, &UserId(user_id), request.role),
    )
}
