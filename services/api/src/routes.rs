use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use talent_match::workflows::recruiting::{
    accounts_router, recruiting_router, AccountService, ApplicationRepository, DecisionNotifier,
    JobRepository, RecruitingService, UserRepository,
};

pub(crate) fn with_recruiting_routes<J, R, N, U>(
    service: Arc<RecruitingService<J, R, N>>,
    accounts: Arc<AccountService<U>>,
) -> axum::Router
where
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    N: DecisionNotifier + 'static,
    U: UserRepository + 'static,
{
    recruiting_router(service)
        .merge(accounts_router(accounts))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
